//! Pawn Strike - AI opponent for a pawn-flicking board game, built on Bevy
//!
//! This crate provides the board model, the AI turn pipeline (pawn selection,
//! targeting, force, aim animation), the turn lifecycle and a headless Bevy plugin.

// Core modules
pub mod config_watcher;
pub mod constants;
pub mod error;
pub mod events;
pub mod helpers;
pub mod testing;

// Game logic modules
pub mod ai;
pub mod board;
pub mod game;
pub mod player;

// Re-export commonly used types for convenience
pub use ai::{
    AI_PROFILES_FILE, AiController, AiProfile, AiProfileDatabase, AiSettings, AimLine, AimPlan,
    AimShot, AimSimulator, AimVisual, CameraRig, FixedCamera, HitPolicy, HitPrediction,
    ScoreBreakdown, ScoringContext, ShotSolution, TargetSource, TieBreak, TurnOutcome, TurnStep,
    calculate_force, calculate_optimal_direction, find_optimal_target, predict_hits,
    select_optimal_pawn,
};
pub use board::{
    Board, BoardProvider, ImpulseSink, LayerMask, Obstacle, Pawn, PawnColor, PawnId, PhysicsQuery,
    RayHit,
};
pub use config_watcher::ConfigWatcher;
pub use constants::*;
pub use error::{AiError, Result};
pub use events::{BusEvent, EventBus, TurnEvent};
pub use game::{CancelToken, Game, GameSession, PawnStrikePlugin, SeatProfiles, TurnPhase};
pub use helpers::*;
pub use player::{Player, PlayerId, PlayerKind};
