//! Event type definitions for turn telemetry

use serde::{Deserialize, Serialize};

use crate::board::{PawnColor, PawnId};
use crate::player::PlayerKind;

/// Everything observable about a game, in the order it happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TurnEvent {
    // === Game Events ===
    GameStarted {
        session_id: String, // UUID v4
        timestamp: String,  // RFC 3339
        seed: u64,
        first_player: String,
    },
    /// A player's color was resolved on the first turn
    ColorAssigned {
        player: String,
        color: PawnColor,
    },
    GameOver {
        winner: Option<String>,
        turns: u32,
    },

    // === Turn Events ===
    TurnStarted {
        turn: u32,
        player: String,
        kind: PlayerKind,
        color: PawnColor,
    },
    PawnSelected {
        player: String,
        pawn: PawnId,
    },
    /// Per-frame aim while the AI is animating
    AimUpdated {
        pawn: PawnId,
        force: f32,
        direction: [f32; 3],
    },
    ImpulseApplied {
        pawn: PawnId,
        impulse: [f32; 3],
    },
    /// Cancellation is a normal outcome, not a failure
    TurnCancelled {
        player: String,
    },
    TurnFailed {
        player: String,
        reason: String,
    },
    /// Pawns found off the board at the end of a turn
    PawnsRemoved {
        pawns: Vec<PawnId>,
    },
    TurnEnded {
        turn: u32,
    },
}

impl TurnEvent {
    /// Short name for logs and summaries
    pub fn kind(&self) -> &'static str {
        match self {
            TurnEvent::GameStarted { .. } => "GameStarted",
            TurnEvent::ColorAssigned { .. } => "ColorAssigned",
            TurnEvent::GameOver { .. } => "GameOver",
            TurnEvent::TurnStarted { .. } => "TurnStarted",
            TurnEvent::PawnSelected { .. } => "PawnSelected",
            TurnEvent::AimUpdated { .. } => "AimUpdated",
            TurnEvent::ImpulseApplied { .. } => "ImpulseApplied",
            TurnEvent::TurnCancelled { .. } => "TurnCancelled",
            TurnEvent::TurnFailed { .. } => "TurnFailed",
            TurnEvent::PawnsRemoved { .. } => "PawnsRemoved",
            TurnEvent::TurnEnded { .. } => "TurnEnded",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_serialize_tagged() {
        let event = TurnEvent::ImpulseApplied {
            pawn: PawnId(4),
            impulse: [0.0, 0.0, 120.0],
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"ImpulseApplied\""), "got {}", json);
        let back: TurnEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_color_serializes_lowercase() {
        let event = TurnEvent::ColorAssigned {
            player: "Bot".to_string(),
            color: PawnColor::Black,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"color\":\"black\""), "got {}", json);
    }
}
