//! Error types for pawn_strike

use thiserror::Error;

use crate::board::{PawnColor, PawnId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AiError {
    #[error("Player '{player}' has no resolved pawn color")]
    UnresolvedColor { player: String },

    #[error("No movable {color} pawn on the board")]
    NoSelectablePawn { color: PawnColor },

    #[error("Invalid AI settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid board geometry: {0}")]
    InvalidBoard(String),

    #[error("Non-finite position {0}")]
    NonFinitePosition(String),

    #[error("Pawn not found: {0}")]
    UnknownPawn(PawnId),

    #[error("Invalid shot: {0}")]
    InvalidShot(String),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AiError>;
