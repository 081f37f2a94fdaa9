//! Aim feedback for an external renderer

use bevy::prelude::*;

use crate::board::PawnId;
use crate::constants::{AIM_LINE_MAX_LENGTH, AIM_LINE_Y_OFFSET};

/// Receives the AI's current aim while it is animating. Drawing is up to the implementor.
pub trait AimVisual {
    fn update_aim(&mut self, pawn: PawnId, force: f32, direction: Vec3);

    /// The aim for `pawn` is gone (shot taken or turn cancelled)
    fn clear_aim(&mut self, _pawn: PawnId) {}
}

/// Keeps every update, used by tests and the scenario runner
#[derive(Default, Debug)]
pub struct RecordingVisual {
    pub updates: Vec<(PawnId, f32, Vec3)>,
    pub cleared: Vec<PawnId>,
}

impl AimVisual for RecordingVisual {
    fn update_aim(&mut self, pawn: PawnId, force: f32, direction: Vec3) {
        self.updates.push((pawn, force, direction));
    }

    fn clear_aim(&mut self, pawn: PawnId) {
        self.cleared.push(pawn);
    }
}

/// Line segment a renderer can draw for an aim update
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimLine {
    pub start: Vec3,
    pub end: Vec3,
}

impl AimLine {
    /// Length grows with force up to `AIM_LINE_MAX_LENGTH` at the pawn's max force
    pub fn from_aim(origin: Vec3, direction: Vec3, force: f32, max_force: f32) -> Self {
        let ratio = if max_force > 0.0 {
            (force / max_force).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let start = origin + Vec3::Y * AIM_LINE_Y_OFFSET;
        let direction = direction.normalize_or_zero();
        Self {
            start,
            end: start + direction * ratio * AIM_LINE_MAX_LENGTH,
        }
    }

    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_scales_with_force() {
        let half = AimLine::from_aim(Vec3::ZERO, Vec3::Z, 175.0, 350.0);
        assert!((half.length() - AIM_LINE_MAX_LENGTH * 0.5).abs() < 1e-5);
        assert_eq!(half.start.y, AIM_LINE_Y_OFFSET);
        let over = AimLine::from_aim(Vec3::ZERO, Vec3::Z, 900.0, 350.0);
        assert!((over.length() - AIM_LINE_MAX_LENGTH).abs() < 1e-5);
    }

    #[test]
    fn test_line_with_bad_direction_is_a_point() {
        let line = AimLine::from_aim(Vec3::ZERO, Vec3::ZERO, 100.0, 350.0);
        assert_eq!(line.length(), 0.0);
    }
}
