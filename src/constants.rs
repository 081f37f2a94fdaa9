//! Tunable constants for pawn_strike
//!
//! Board geometry, pawn physics defaults and AI timing values live here.

use bevy::prelude::*;

// =============================================================================
// BOARD GEOMETRY
// =============================================================================

pub const DEFAULT_BOARD_SIZE: u32 = 8; // Cells per side
pub const MIN_BOARD_SIZE: u32 = 4;
pub const MAX_BOARD_SIZE: u32 = 12;
pub const DEFAULT_CELL_SIZE: f32 = 0.9; // World units per cell
pub const BOARD_SURFACE_HALF_HEIGHT: f32 = 0.5; // Vertical half extent of the membership box

// =============================================================================
// PAWN DEFAULTS
// =============================================================================

pub const PAWN_RADIUS: f32 = 0.4;
pub const PAWN_MIN_FORCE: f32 = 5.0;
pub const PAWN_MAX_FORCE: f32 = 350.0;
pub const PAWN_FORWARD: Vec3 = Vec3::Z;

// =============================================================================
// TARGETING
// =============================================================================

/// Targets closer than this to the shooter are treated as "no target"
pub const SAME_POSITION_EPSILON: f32 = 0.1;
/// Distance ahead of the shooter used when no enemy is left to aim at
pub const FALLBACK_TARGET_DISTANCE: f32 = 2.0;
/// Lateral range of the fallback deviation before normalization
pub const FALLBACK_LATERAL_RANGE: f32 = 0.3;
/// Forward range of the fallback deviation before normalization
pub const FALLBACK_FORWARD_MIN: f32 = 0.5;
pub const FALLBACK_FORWARD_MAX: f32 = 1.0;
/// Upper bound on |x| of a fallback direction for a +Z facing pawn
pub const FALLBACK_MAX_LATERAL: f32 = 0.27;
/// Capacity of the neighbor overlap query
pub const NEIGHBOR_QUERY_CAPACITY: usize = 16;

// =============================================================================
// FORCE
// =============================================================================

/// A line predicting more hits than this gets a near-maximum shot
pub const MULTI_HIT_THRESHOLD: i32 = 1;
pub const MULTI_HIT_FORCE_MIN: f32 = 0.75;
pub const MULTI_HIT_FORCE_MAX: f32 = 1.0;

// =============================================================================
// AIMING
// =============================================================================

/// Seconds reserved at the end of the aiming budget for the final lock tween
pub const FINAL_LOCK_SECS: f32 = 0.5;
/// Oscillation count is drawn from [MIN, MAX)
pub const OSCILLATION_COUNT_MIN: usize = 2;
pub const OSCILLATION_COUNT_MAX: usize = 6;
/// Radius of the random perturbation applied to the starting aim direction
pub const INITIAL_AIM_DEVIATION: f32 = 0.5;
/// Radius of the random perturbation applied to each oscillation target
pub const OSCILLATION_DEVIATION: f32 = 0.2;

// =============================================================================
// AIM LINE (renderer hint)
// =============================================================================

pub const AIM_LINE_MAX_LENGTH: f32 = 3.0;
pub const AIM_LINE_Y_OFFSET: f32 = 0.1;

// =============================================================================
// TURN FLOW
// =============================================================================

/// Default camera move duration when no camera collaborator overrides it (seconds)
pub const DEFAULT_CAMERA_MOVE_SECS: f32 = 1.0;
/// Delay after a shot before the turn ends, so pawns can fly off (seconds)
pub const TURN_END_DELAY_SECS: f32 = 1.5;
