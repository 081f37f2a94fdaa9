//! Turn telemetry events
//!
//! Replaces global per-pawn delegates with a queue owned by the game session.

mod bus;
mod types;

pub use bus::{BusEvent, EventBus};
pub use types::TurnEvent;
