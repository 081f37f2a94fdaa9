//! Shot strength

use bevy::prelude::*;
use rand::Rng;

use crate::board::Pawn;
use crate::constants::*;
use crate::helpers::clamp01;

/// Impulse magnitude for a shot at `target`.
///
/// Scales linearly from the pawn's min to max force with distance over the
/// board size. A line predicting several hits is shot near full strength.
/// Returns 0 (with a warning) if the inputs do not produce a finite force.
pub fn calculate_force(
    shooter: &Pawn,
    target: Vec3,
    hit_count: usize,
    board_size: f32,
    rng: &mut impl Rng,
) -> f32 {
    let force = if hit_count as i32 > MULTI_HIT_THRESHOLD {
        shooter.max_force * rng.gen_range(MULTI_HIT_FORCE_MIN..=MULTI_HIT_FORCE_MAX)
    } else {
        let distance = shooter.position.distance(target);
        let t = if board_size > 0.0 {
            clamp01(distance / board_size)
        } else {
            1.0
        };
        shooter.min_force + (shooter.max_force - shooter.min_force) * t
    };

    if force.is_finite() {
        force.clamp(shooter.min_force, shooter.max_force)
    } else {
        warn!("Non-finite force for {}, using zero", shooter.id);
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PawnColor, PawnId};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn shooter() -> Pawn {
        Pawn::new(PawnId(0), PawnColor::White, Vec3::ZERO)
    }

    #[test]
    fn test_force_scales_with_distance() {
        let mut rng = StdRng::seed_from_u64(0);
        let near = calculate_force(&shooter(), Vec3::new(0.0, 0.0, 1.0), 1, 8.0, &mut rng);
        let far = calculate_force(&shooter(), Vec3::new(0.0, 0.0, 6.0), 1, 8.0, &mut rng);
        assert!(far > near, "far {} should exceed near {}", far, near);
        let expected = PAWN_MIN_FORCE + (PAWN_MAX_FORCE - PAWN_MIN_FORCE) * 0.125;
        assert!((near - expected).abs() < 1e-3, "expected {}, got {}", expected, near);
    }

    #[test]
    fn test_force_clamped_beyond_board() {
        let mut rng = StdRng::seed_from_u64(0);
        let force = calculate_force(&shooter(), Vec3::new(0.0, 0.0, 40.0), 0, 8.0, &mut rng);
        assert_eq!(force, PAWN_MAX_FORCE);
    }

    #[test]
    fn test_multi_hit_shoots_hard() {
        let mut rng = StdRng::seed_from_u64(4);
        for _ in 0..50 {
            let force = calculate_force(&shooter(), Vec3::new(0.0, 0.0, 0.5), 3, 8.0, &mut rng);
            assert!(force >= PAWN_MAX_FORCE * 0.75 && force <= PAWN_MAX_FORCE, "force {}", force);
        }
    }

    #[test]
    fn test_non_finite_target_gives_zero() {
        let mut rng = StdRng::seed_from_u64(0);
        let force = calculate_force(&shooter(), Vec3::splat(f32::NAN), 0, 8.0, &mut rng);
        assert_eq!(force, 0.0);
    }
}
