//! AI tuning record - timing, scoring weights, and targeting policies
//!
//! Every field has a serde default so profile files only need to list what
//! they change.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{AiError, Result};

/// Default spread for per-player personality jitter (±20%)
pub const PERSONALITY_TOLERANCE: f32 = 0.2;

/// How the hit predictor treats things in front of the target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HitPolicy {
    /// Count every enemy on the line, whatever stands between
    #[default]
    Unobstructed,
    /// Stop counting at the first collider that is not an enemy pawn
    StopAtObstacle,
}

/// Which of two equally good targets wins
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    PreferCloser,
    PreferFarther,
}

fn default_min_decision_delay_ms() -> u32 {
    1000
}
fn default_max_decision_delay_ms() -> u32 {
    4000
}
fn default_aiming_time_ms() -> u32 {
    2000
}
fn default_neighbor_radius() -> f32 {
    2.0
}
fn default_friendly_group_weight() -> f32 {
    0.7
}
fn default_enemy_proximity_weight() -> f32 {
    1.2
}
fn default_line_of_fire_weight() -> f32 {
    2.0
}
fn default_line_of_friendly_fire_weight() -> f32 {
    1.0
}
fn default_board_center_weight() -> f32 {
    0.5
}
fn default_edge_penalty_weight() -> f32 {
    0.3
}
fn default_penalize_friendly_fire() -> bool {
    true
}
fn default_friendly_fire_threshold() -> i32 {
    2
}
fn default_camera_settle_buffer_ms() -> u32 {
    500
}

/// Tunable AI parameters. Bound to a turn by value, so a turn never sees edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiSettings {
    /// Lower bound of the "thinking" pause before acting (milliseconds)
    #[serde(default = "default_min_decision_delay_ms")]
    pub min_decision_delay_ms: u32,
    /// Upper bound of the "thinking" pause (milliseconds)
    #[serde(default = "default_max_decision_delay_ms")]
    pub max_decision_delay_ms: u32,
    /// Total aiming animation budget, final lock included (milliseconds)
    #[serde(default = "default_aiming_time_ms")]
    pub aiming_time_ms: u32,
    /// Search radius for neighbor counting
    #[serde(default = "default_neighbor_radius")]
    pub neighbor_radius: f32,
    #[serde(default = "default_friendly_group_weight")]
    pub friendly_group_weight: f32,
    #[serde(default = "default_enemy_proximity_weight")]
    pub enemy_proximity_weight: f32,
    #[serde(default = "default_line_of_fire_weight")]
    pub line_of_fire_weight: f32,
    #[serde(default = "default_line_of_friendly_fire_weight")]
    pub line_of_friendly_fire_weight: f32,
    #[serde(default = "default_board_center_weight")]
    pub board_center_weight: f32,
    #[serde(default = "default_edge_penalty_weight")]
    pub edge_penalty_weight: f32,
    #[serde(default)]
    pub hit_policy: HitPolicy,
    #[serde(default)]
    pub tie_break: TieBreak,
    /// Subtract friendly pawns on a line from its hit count when above the threshold
    #[serde(default = "default_penalize_friendly_fire")]
    pub penalize_friendly_fire: bool,
    #[serde(default = "default_friendly_fire_threshold")]
    pub friendly_fire_threshold: i32,
    /// Added to the camera's move duration before aiming starts (milliseconds)
    #[serde(default = "default_camera_settle_buffer_ms")]
    pub camera_settle_buffer_ms: u32,
}

impl Default for AiSettings {
    fn default() -> Self {
        Self {
            min_decision_delay_ms: default_min_decision_delay_ms(),
            max_decision_delay_ms: default_max_decision_delay_ms(),
            aiming_time_ms: default_aiming_time_ms(),
            neighbor_radius: default_neighbor_radius(),
            friendly_group_weight: default_friendly_group_weight(),
            enemy_proximity_weight: default_enemy_proximity_weight(),
            line_of_fire_weight: default_line_of_fire_weight(),
            line_of_friendly_fire_weight: default_line_of_friendly_fire_weight(),
            board_center_weight: default_board_center_weight(),
            edge_penalty_weight: default_edge_penalty_weight(),
            hit_policy: HitPolicy::default(),
            tie_break: TieBreak::default(),
            penalize_friendly_fire: default_penalize_friendly_fire(),
            friendly_fire_threshold: default_friendly_fire_threshold(),
            camera_settle_buffer_ms: default_camera_settle_buffer_ms(),
        }
    }
}

impl AiSettings {
    /// Reject settings that would make timing or scoring meaningless
    pub fn validate(&self) -> Result<()> {
        if self.min_decision_delay_ms > self.max_decision_delay_ms {
            return Err(AiError::InvalidSettings(format!(
                "min_decision_delay_ms {} > max_decision_delay_ms {}",
                self.min_decision_delay_ms, self.max_decision_delay_ms
            )));
        }
        if !self.neighbor_radius.is_finite() || self.neighbor_radius < 0.0 {
            return Err(AiError::InvalidSettings(format!(
                "neighbor_radius {}",
                self.neighbor_radius
            )));
        }
        let weights = [
            ("friendly_group_weight", self.friendly_group_weight),
            ("enemy_proximity_weight", self.enemy_proximity_weight),
            ("line_of_fire_weight", self.line_of_fire_weight),
            ("line_of_friendly_fire_weight", self.line_of_friendly_fire_weight),
            ("board_center_weight", self.board_center_weight),
            ("edge_penalty_weight", self.edge_penalty_weight),
        ];
        if let Some((name, value)) = weights.iter().find(|(_, v)| !v.is_finite()) {
            return Err(AiError::InvalidSettings(format!("{} is {}", name, value)));
        }
        Ok(())
    }

    /// Draw a thinking delay in seconds from [min, max]
    pub fn sample_decision_delay_secs(&self, rng: &mut impl Rng) -> f32 {
        let min = self.min_decision_delay_ms.min(self.max_decision_delay_ms);
        let max = self.max_decision_delay_ms.max(self.min_decision_delay_ms);
        rng.gen_range(min..=max) as f32 / 1000.0
    }

    pub fn aiming_secs(&self) -> f32 {
        self.aiming_time_ms as f32 / 1000.0
    }

    pub fn camera_settle_buffer_secs(&self) -> f32 {
        self.camera_settle_buffer_ms as f32 / 1000.0
    }

    /// Same settings with every weight, the radius and the timings scaled by an
    /// independent factor in [1 - tolerance, 1 + tolerance]. Pure in `seed`.
    /// A non-finite tolerance leaves the settings unjittered.
    pub fn with_personality(&self, seed: u64, tolerance: f32) -> Self {
        let tolerance = if tolerance.is_finite() {
            tolerance.clamp(0.0, 0.9)
        } else {
            warn!("Personality tolerance {} is not finite, using 0", tolerance);
            0.0
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let mut jitter = |value: f32| value * rng.gen_range(1.0 - tolerance..=1.0 + tolerance);

        let mut out = self.clone();
        out.neighbor_radius = jitter(self.neighbor_radius);
        out.friendly_group_weight = jitter(self.friendly_group_weight);
        out.enemy_proximity_weight = jitter(self.enemy_proximity_weight);
        out.line_of_fire_weight = jitter(self.line_of_fire_weight);
        out.line_of_friendly_fire_weight = jitter(self.line_of_friendly_fire_weight);
        out.board_center_weight = jitter(self.board_center_weight);
        out.edge_penalty_weight = jitter(self.edge_penalty_weight);

        let min_delay = jitter(self.min_decision_delay_ms as f32).round() as u32;
        let max_delay = jitter(self.max_decision_delay_ms as f32).round() as u32;
        out.min_decision_delay_ms = min_delay.min(max_delay);
        out.max_decision_delay_ms = max_delay.max(min_delay);
        out.aiming_time_ms = jitter(self.aiming_time_ms as f32).round() as u32;

        debug!(
            "Personality seed {}: line_of_fire {:.2}, center {:.2}, aiming {}ms",
            seed, out.line_of_fire_weight, out.board_center_weight, out.aiming_time_ms
        );
        out
    }
}
