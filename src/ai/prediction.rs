//! Hit prediction along a line of fire

use bevy::prelude::*;

use super::HitPolicy;
use crate::board::{ColliderRef, LayerMask, Pawn, PhysicsQuery};

/// Pawns a shot along a line would run into
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HitPrediction {
    pub enemy: usize,
    pub friendly: usize,
}

/// Count enemy and friendly pawns along a ray, nearest first, up to `max_distance`.
///
/// Hits are classified against the given pawn lists; anything else the ray meets
/// (obstacles, pawns in neither list) is an obstacle. With `StopAtObstacle`
/// counting ends at the first hit that is not an enemy, and that hit still counts
/// if it is friendly. Pure query: nothing is mutated.
pub fn predict_hits<P: PhysicsQuery + ?Sized>(
    physics: &P,
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    friendly: &[Pawn],
    enemies: &[Pawn],
    policy: HitPolicy,
) -> HitPrediction {
    let layers = match policy {
        HitPolicy::Unobstructed => LayerMask::PAWN,
        HitPolicy::StopAtObstacle => LayerMask::ALL,
    };

    let mut prediction = HitPrediction::default();
    for hit in physics.cast_ray(origin, direction, max_distance, layers) {
        let id = match hit.collider {
            ColliderRef::Pawn(id) => Some(id),
            ColliderRef::Obstacle(_) => None,
        };
        let is_enemy = id.is_some_and(|id| enemies.iter().any(|p| p.id == id));
        let is_friendly = id.is_some_and(|id| friendly.iter().any(|p| p.id == id));

        if is_enemy {
            prediction.enemy += 1;
            continue;
        }
        if is_friendly {
            prediction.friendly += 1;
        }
        if policy == HitPolicy::StopAtObstacle {
            break;
        }
    }
    prediction
}
