//! Player data

use serde::{Deserialize, Serialize};

use crate::ai::AiSettings;
use crate::board::PawnColor;

/// Who drives a player's turns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    #[default]
    Human,
    Ai,
}

/// Seat index within a game (0 or 1)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "P{}", self.0 + 1)
    }
}

/// One of the two players in a game
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    color: PawnColor,
    /// Colors can change until the first shot of the game is taken
    color_locked: bool,
    /// AI behavior; None means "use defaults" when this player is AI-driven
    pub ai_settings: Option<AiSettings>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, kind: PlayerKind) -> Self {
        Self {
            id,
            name: name.to_string(),
            kind,
            color: PawnColor::None,
            color_locked: false,
            ai_settings: None,
        }
    }

    pub fn with_color(mut self, color: PawnColor) -> Self {
        self.color = color;
        self
    }

    pub fn with_ai_settings(mut self, settings: AiSettings) -> Self {
        self.ai_settings = Some(settings);
        self
    }

    pub fn color(&self) -> PawnColor {
        self.color
    }

    pub fn is_ai(&self) -> bool {
        self.kind == PlayerKind::Ai
    }

    pub fn color_locked(&self) -> bool {
        self.color_locked
    }

    /// Change color. Returns false (and leaves the color alone) once colors are locked.
    pub fn assign_color(&mut self, color: PawnColor) -> bool {
        if self.color_locked {
            return false;
        }
        self.color = color;
        true
    }

    /// Freeze the current color for the rest of the game
    pub fn lock_color(&mut self) {
        if self.color.is_resolved() {
            self.color_locked = true;
        }
    }

    /// Back to the pre-game state
    pub fn reset_color(&mut self) {
        self.color = PawnColor::None;
        self.color_locked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_assignment_until_locked() {
        let mut player = Player::new(PlayerId(0), "Alice", PlayerKind::Human);
        assert_eq!(player.color(), PawnColor::None);
        assert!(player.assign_color(PawnColor::Black));
        player.lock_color();
        assert!(!player.assign_color(PawnColor::White));
        assert_eq!(player.color(), PawnColor::Black);
    }

    #[test]
    fn test_unresolved_color_does_not_lock() {
        let mut player = Player::new(PlayerId(1), "Bot", PlayerKind::Ai);
        player.lock_color();
        assert!(!player.color_locked());
        assert!(player.assign_color(PawnColor::White));
    }

    #[test]
    fn test_reset_unlocks() {
        let mut player = Player::new(PlayerId(0), "Alice", PlayerKind::Human).with_color(PawnColor::White);
        player.lock_color();
        player.reset_color();
        assert!(!player.color_locked());
        assert_eq!(player.color(), PawnColor::None);
    }
}
