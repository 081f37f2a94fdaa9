//! Physics collaborator interfaces and the sphere-collider queries behind them.
//!
//! The AI never integrates motion. It only asks "what lies along this line" and
//! "what is near this point", then issues a single impulse at the end of a turn.

use bevy::prelude::*;

use super::{Obstacle, Pawn, PawnColor, PawnId};
use crate::error::Result;

/// Which collider groups a query should see
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayerMask(pub u8);

impl LayerMask {
    pub const PAWN: LayerMask = LayerMask(0b01);
    pub const OBSTACLE: LayerMask = LayerMask(0b10);
    pub const ALL: LayerMask = LayerMask(0b11);

    pub fn contains(self, other: LayerMask) -> bool {
        self.0 & other.0 == other.0
    }
}

/// What a ray ran into
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColliderRef {
    Pawn(PawnId),
    /// Index into the board's obstacle list
    Obstacle(usize),
}

/// A single ray intersection
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub collider: ColliderRef,
    /// Distance from the ray origin to the collider surface
    pub distance: f32,
}

/// Read-only spatial queries against the physics world
pub trait PhysicsQuery {
    /// All colliders along the ray within `max_distance`, nearest first.
    /// Colliders containing the origin are not reported.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit>;

    /// Pawns whose collider touches the sphere, nearest first, at most `capacity` results
    fn overlap_sphere(&self, center: Vec3, radius: f32, capacity: usize) -> Vec<PawnId>;
}

/// Board geometry and membership as seen by the AI
pub trait BoardProvider {
    /// Snapshot of active pawns of one color currently on the board
    fn pawns_on_board(&self, color: PawnColor) -> Vec<Pawn>;
    fn center_position(&self) -> Vec3;
    /// Board size in world units, also the maximum prediction distance
    fn board_size(&self) -> f32;
}

/// The one mutating physics call the AI makes
pub trait ImpulseSink {
    fn apply_impulse(&mut self, pawn: PawnId, impulse: Vec3) -> Result<()>;
}

/// Distance along a unit ray to the first intersection with a sphere.
/// Returns None when the ray misses, points away, or starts inside the sphere.
pub fn ray_sphere_entry(origin: Vec3, direction: Vec3, center: Vec3, radius: f32) -> Option<f32> {
    let oc = origin - center;
    let c = oc.length_squared() - radius * radius;
    if c <= 0.0 {
        return None;
    }
    let b = oc.dot(direction);
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return None;
    }
    let t = -b - discriminant.sqrt();
    (t >= 0.0).then_some(t)
}

/// Ray cast over pawn and obstacle spheres
pub fn cast_ray_spheres(
    pawns: &[Pawn],
    obstacles: &[Obstacle],
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    layers: LayerMask,
) -> Vec<RayHit> {
    let Some(direction) = direction.try_normalize() else {
        return Vec::new();
    };
    if !origin.is_finite() || max_distance.is_nan() || max_distance <= 0.0 {
        return Vec::new();
    }

    let mut hits = Vec::new();

    if layers.contains(LayerMask::PAWN) {
        for pawn in pawns.iter().filter(|p| p.is_valid()) {
            if let Some(distance) = ray_sphere_entry(origin, direction, pawn.position, pawn.radius)
                && distance <= max_distance
            {
                hits.push(RayHit {
                    collider: ColliderRef::Pawn(pawn.id),
                    distance,
                });
            }
        }
    }

    if layers.contains(LayerMask::OBSTACLE) {
        for (index, obstacle) in obstacles.iter().enumerate() {
            if let Some(distance) =
                ray_sphere_entry(origin, direction, obstacle.position, obstacle.radius)
                && distance <= max_distance
            {
                hits.push(RayHit {
                    collider: ColliderRef::Obstacle(index),
                    distance,
                });
            }
        }
    }

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Sphere overlap over pawn colliders
pub fn overlap_pawn_spheres(pawns: &[Pawn], center: Vec3, radius: f32, capacity: usize) -> Vec<PawnId> {
    let mut found: Vec<(f32, PawnId)> = pawns
        .iter()
        .filter(|p| p.is_valid())
        .map(|p| (p.position.distance(center), p))
        .filter(|(distance, p)| *distance <= radius + p.radius)
        .map(|(distance, p)| (distance, p.id))
        .collect();

    found.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    found.truncate(capacity);
    found.into_iter().map(|(_, id)| id).collect()
}
