//! Pawn and obstacle data

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// Stable pawn identity, assigned by the board at spawn time
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PawnId(pub u32);

impl std::fmt::Display for PawnId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pawn color. `None` is the pre-game sentinel for players that have not picked a side yet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PawnColor {
    #[default]
    None,
    Black,
    White,
}

impl PawnColor {
    /// The other side. `None` has no opponent.
    pub fn opponent(self) -> PawnColor {
        match self {
            PawnColor::Black => PawnColor::White,
            PawnColor::White => PawnColor::Black,
            PawnColor::None => PawnColor::None,
        }
    }

    pub fn is_resolved(self) -> bool {
        self != PawnColor::None
    }

    /// Parse from config/test strings ("black", "white")
    pub fn from_str(s: &str) -> Option<PawnColor> {
        match s.trim().to_lowercase().as_str() {
            "black" => Some(PawnColor::Black),
            "white" => Some(PawnColor::White),
            "none" => Some(PawnColor::None),
            _ => None,
        }
    }
}

impl std::fmt::Display for PawnColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PawnColor::None => write!(f, "none"),
            PawnColor::Black => write!(f, "black"),
            PawnColor::White => write!(f, "white"),
        }
    }
}

/// A game piece on the board
#[derive(Clone, Debug, PartialEq)]
pub struct Pawn {
    pub id: PawnId,
    pub color: PawnColor,
    /// World position of the pawn center
    pub position: Vec3,
    /// Facing direction, used to bias shots when nothing is worth aiming at
    pub forward: Vec3,
    /// Collider radius for ray and overlap queries
    pub radius: f32,
    pub min_force: f32,
    pub max_force: f32,
    /// Whether a human may currently pick this pawn
    pub interactable: bool,
    /// False once the pawn has been knocked off or removed
    pub active: bool,
}

impl Pawn {
    pub fn new(id: PawnId, color: PawnColor, position: Vec3) -> Self {
        Self {
            id,
            color,
            position,
            forward: PAWN_FORWARD,
            radius: PAWN_RADIUS,
            min_force: PAWN_MIN_FORCE,
            max_force: PAWN_MAX_FORCE,
            interactable: false,
            active: true,
        }
    }

    pub fn with_forward(mut self, forward: Vec3) -> Self {
        self.forward = forward;
        self
    }

    pub fn with_force_range(mut self, min_force: f32, max_force: f32) -> Self {
        // Keep min <= max so lerps stay inside the range
        self.max_force = max_force;
        self.min_force = min_force.min(max_force);
        self
    }

    /// Valid for targeting and selection
    pub fn is_valid(&self) -> bool {
        self.active && self.position.is_finite()
    }
}

/// Static collider that blocks lines of fire but is never a target
#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub position: Vec3,
    pub radius: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opponent_color() {
        assert_eq!(PawnColor::Black.opponent(), PawnColor::White);
        assert_eq!(PawnColor::White.opponent(), PawnColor::Black);
        assert_eq!(PawnColor::None.opponent(), PawnColor::None);
    }

    #[test]
    fn test_force_range_keeps_order() {
        let pawn = Pawn::new(PawnId(1), PawnColor::White, Vec3::ZERO).with_force_range(50.0, 10.0);
        assert_eq!(pawn.min_force, 10.0);
        assert_eq!(pawn.max_force, 10.0);
    }

    #[test]
    fn test_invalid_when_inactive_or_nan() {
        let mut pawn = Pawn::new(PawnId(1), PawnColor::White, Vec3::ZERO);
        assert!(pawn.is_valid());
        pawn.position.x = f32::NAN;
        assert!(!pawn.is_valid());
        pawn.position.x = 0.0;
        pawn.active = false;
        assert!(!pawn.is_valid());
    }
}
