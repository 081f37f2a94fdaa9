//! Target selection - which enemy to aim at and in which direction

use bevy::prelude::*;
use rand::Rng;
use rand::seq::SliceRandom;

use super::{AiSettings, HitPrediction, TieBreak, predict_hits};
use crate::board::{Pawn, PhysicsQuery};
use crate::constants::*;
use crate::helpers::horizontal_unit;

/// The winning candidate of one selection pass
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetChoice {
    pub position: Vec3,
    /// Unit horizontal direction from the shooter to `position`
    pub direction: Vec3,
    pub distance: f32,
    pub prediction: HitPrediction,
    /// Enemy hits minus the friendly-fire penalty, the value compared across candidates
    pub score: i32,
}

impl TargetChoice {
    pub fn hit_count(&self) -> usize {
        self.prediction.enemy
    }
}

/// Where the final direction came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetSource {
    /// Best line-of-fire enemy
    Optimal,
    /// Random enemy after a degenerate selection
    RandomEnemy,
    /// Straight ahead, no usable enemy
    Forward,
}

/// Direction, target and hit count threaded into force calculation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShotSolution {
    pub direction: Vec3,
    pub target: Vec3,
    pub hit_count: usize,
    pub source: TargetSource,
}

fn candidate_score(prediction: HitPrediction, settings: &AiSettings) -> i32 {
    let enemy = prediction.enemy as i32;
    let friendly = prediction.friendly as i32;
    if settings.penalize_friendly_fire && friendly > settings.friendly_fire_threshold {
        enemy - friendly
    } else {
        enemy
    }
}

fn beats(candidate: &TargetChoice, best: &TargetChoice, tie_break: TieBreak) -> bool {
    if candidate.score != best.score {
        return candidate.score > best.score;
    }
    match tie_break {
        TieBreak::PreferCloser => candidate.distance < best.distance,
        TieBreak::PreferFarther => candidate.distance > best.distance,
    }
}

/// Evaluate every enemy as an aim point and return the best line of fire.
///
/// Enemies within `SAME_POSITION_EPSILON` of the shooter, or with no horizontal
/// offset, are skipped. Equal scores go to the configured tie-break; exact
/// distance ties keep the earlier enemy. None when no enemy is usable.
pub fn find_optimal_target<P: PhysicsQuery + ?Sized>(
    physics: &P,
    shooter: Vec3,
    friendly: &[Pawn],
    enemies: &[Pawn],
    max_distance: f32,
    settings: &AiSettings,
) -> Option<TargetChoice> {
    let mut best: Option<TargetChoice> = None;

    for enemy in enemies.iter().filter(|p| p.is_valid()) {
        let distance = enemy.position.distance(shooter);
        if !distance.is_finite() || distance < SAME_POSITION_EPSILON {
            continue;
        }
        let Some(direction) = horizontal_unit(enemy.position - shooter) else {
            continue;
        };

        let prediction = predict_hits(
            physics,
            shooter,
            direction,
            max_distance,
            friendly,
            enemies,
            settings.hit_policy,
        );
        let candidate = TargetChoice {
            position: enemy.position,
            direction,
            distance,
            prediction,
            score: candidate_score(prediction, settings),
        };

        if best.is_none_or(|b| beats(&candidate, &b, settings.tie_break)) {
            best = Some(candidate);
        }
    }

    best
}

/// Forward-biased direction with a small random lateral deviation, y = 0.
/// For a +Z pawn |x| stays under `FALLBACK_MAX_LATERAL`.
pub fn fallback_direction(forward: Vec3, rng: &mut impl Rng) -> Vec3 {
    let forward = horizontal_unit(forward).unwrap_or(PAWN_FORWARD);
    let right = Vec3::Y.cross(forward);
    let lateral = rng.gen_range(-FALLBACK_LATERAL_RANGE..=FALLBACK_LATERAL_RANGE);
    let ahead = rng.gen_range(FALLBACK_FORWARD_MIN..=FALLBACK_FORWARD_MAX);
    let deviation = (right * lateral + forward * ahead).normalize_or(forward);
    horizontal_unit(forward + deviation).unwrap_or(forward)
}

/// Replacement target when selection produced nothing usable:
/// a random enemy, or a point straight ahead of the shooter
pub fn fallback_target(shooter: &Pawn, enemies: &[Pawn], rng: &mut impl Rng) -> Vec3 {
    let valid: Vec<&Pawn> = enemies.iter().filter(|p| p.is_valid()).collect();
    match valid.choose(rng) {
        Some(enemy) => enemy.position,
        None => shooter.position + shooter.forward * FALLBACK_TARGET_DISTANCE,
    }
}

/// Best shot for a pawn. Always returns a unit horizontal direction.
pub fn calculate_optimal_direction<P: PhysicsQuery + ?Sized>(
    physics: &P,
    shooter: &Pawn,
    friendly: &[Pawn],
    enemies: &[Pawn],
    max_distance: f32,
    settings: &AiSettings,
    rng: &mut impl Rng,
) -> ShotSolution {
    let has_enemies = enemies.iter().any(|p| p.is_valid());
    if !has_enemies {
        warn!("No enemy pawns for {}, aiming forward", shooter.id);
        return ShotSolution {
            direction: fallback_direction(shooter.forward, rng),
            target: shooter.position + shooter.forward * FALLBACK_TARGET_DISTANCE,
            hit_count: 0,
            source: TargetSource::Forward,
        };
    }

    if let Some(choice) = find_optimal_target(physics, shooter.position, friendly, enemies, max_distance, settings) {
        return ShotSolution {
            direction: choice.direction,
            target: choice.position,
            hit_count: choice.hit_count(),
            source: TargetSource::Optimal,
        };
    }

    warn!("Target for {} coincides with the shooter, picking a fallback", shooter.id);
    let target = fallback_target(shooter, enemies, rng);
    match horizontal_unit(target - shooter.position) {
        Some(direction) if target.distance(shooter.position) >= SAME_POSITION_EPSILON => ShotSolution {
            direction,
            target,
            hit_count: 0,
            source: TargetSource::RandomEnemy,
        },
        _ => ShotSolution {
            direction: fallback_direction(shooter.forward, rng),
            target: shooter.position + shooter.forward * FALLBACK_TARGET_DISTANCE,
            hit_count: 0,
            source: TargetSource::Forward,
        },
    }
}
