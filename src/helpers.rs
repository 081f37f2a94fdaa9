//! Utility functions for pawn_strike

use bevy::prelude::*;
use rand::Rng;

/// Clamp a value into [0, 1]
pub fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

/// Quadratic ease-in-out over t in [0, 1]
pub fn ease_in_out_quad(t: f32) -> f32 {
    let t = clamp01(t);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Drop the vertical component and renormalize. None if nothing horizontal is left.
pub fn horizontal_unit(v: Vec3) -> Option<Vec3> {
    v.with_y(0.0).try_normalize()
}

/// Uniform random point inside the unit sphere (rejection sampling)
pub fn random_inside_unit_sphere(rng: &mut impl Rng) -> Vec3 {
    loop {
        let candidate = Vec3::new(
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
            rng.gen_range(-1.0..=1.0),
        );
        if candidate.length_squared() <= 1.0 {
            return candidate;
        }
    }
}

/// Perturb a direction by a random offset of at most `radius`, flattened to the board plane.
/// Falls back to the flattened base direction when the perturbation cancels it out.
pub fn perturb_horizontal(base: Vec3, radius: f32, rng: &mut impl Rng) -> Vec3 {
    let perturbed = base + random_inside_unit_sphere(rng) * radius;
    horizontal_unit(perturbed)
        .or_else(|| horizontal_unit(base))
        .unwrap_or(Vec3::Z)
}
