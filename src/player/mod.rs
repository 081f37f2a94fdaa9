//! Player module - seats, kinds, and color ownership

mod components;

pub use components::*;
