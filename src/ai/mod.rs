//! AI module - pawn selection, targeting, and the aiming turn
//!
//! Leaf-first: prediction -> targeting -> scoring -> selection -> aim -> controller.
//! Everything below `controller` is a pure query over the board except the
//! aim simulator, which only drives a visual callback.

mod aim;
mod controller;
mod force;
mod prediction;
mod profiles;
mod scoring;
mod selection;
mod settings;
mod targeting;
mod visual;

pub use aim::*;
pub use controller::*;
pub use force::*;
pub use prediction::*;
pub use profiles::*;
pub use scoring::*;
pub use selection::*;
pub use settings::*;
pub use targeting::*;
pub use visual::*;
