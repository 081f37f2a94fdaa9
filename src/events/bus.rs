//! Event Bus - the game session's message queue
//!
//! The bus is owned by a `GameSession` and passed by reference to whatever
//! produces events; consumers drain it once per frame. A new game starts a
//! new bus, so nothing subscribed to one game can see the next.
//!
//! The bus also serves as the AI's aim visual, turning every aim update into
//! an `AimUpdated` event for the renderer.

use bevy::prelude::*;

use super::types::TurnEvent;
use crate::ai::AimVisual;
use crate::board::PawnId;

/// Timestamped event for the event bus
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// Time in milliseconds since the session started
    pub time_ms: u32,
    /// The event data
    pub event: TurnEvent,
}

/// Session-scoped event queue
#[derive(Debug, Default)]
pub struct EventBus {
    /// Events emitted since the last drain
    pending: Vec<BusEvent>,

    /// Events that have been drained (for summaries)
    processed: Vec<BusEvent>,

    /// Current elapsed time in milliseconds (for timestamping)
    elapsed_ms: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the elapsed time (called each frame)
    pub fn update_time(&mut self, elapsed_secs: f32) {
        self.elapsed_ms = (elapsed_secs * 1000.0) as u32;
    }

    /// Emit an event to the bus
    pub fn emit(&mut self, event: TurnEvent) {
        self.pending.push(BusEvent {
            time_ms: self.elapsed_ms,
            event,
        });
    }

    /// Drain pending events, moving them to processed
    pub fn drain(&mut self) -> Vec<BusEvent> {
        let events = std::mem::take(&mut self.pending);
        self.processed.extend(events.clone());
        events
    }

    /// Get all processed events
    pub fn processed(&self) -> &[BusEvent] {
        &self.processed
    }

    /// Pending and processed events, oldest first
    pub fn history(&self) -> impl Iterator<Item = &BusEvent> {
        self.processed.iter().chain(self.pending.iter())
    }

    /// Get the number of pending events
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if the bus has any pending events
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Get current elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }
}

impl AimVisual for EventBus {
    fn update_aim(&mut self, pawn: PawnId, force: f32, direction: Vec3) {
        self.emit(TurnEvent::AimUpdated {
            pawn,
            force,
            direction: direction.to_array(),
        });
    }
}
