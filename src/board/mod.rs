//! Board module - pawn ownership, layout, and physics queries
//!
//! The board is centered on `center`. Cell (0, 0) is the White corner; Black
//! starts on the far row. Membership is rebuilt from a box query at turn
//! boundaries because pawns can leave the surface during physics resolution.

mod components;
mod physics;

pub use components::*;
pub use physics::*;

use bevy::prelude::*;

use crate::constants::*;
use crate::error::{AiError, Result};

/// Authoritative list of pawns in play plus board geometry
#[derive(Resource, Clone, Debug)]
pub struct Board {
    size: u32,
    cell_size: f32,
    center: Vec3,
    pawns: Vec<Pawn>,
    obstacles: Vec<Obstacle>,
    next_id: u32,
    /// Impulses issued since the physics engine last drained them
    pending_impulses: Vec<(PawnId, Vec3)>,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            size: DEFAULT_BOARD_SIZE,
            cell_size: DEFAULT_CELL_SIZE,
            center: Vec3::ZERO,
            pawns: Vec::new(),
            obstacles: Vec::new(),
            next_id: 0,
            pending_impulses: Vec::new(),
        }
    }
}

impl Board {
    /// Create an empty board. Size is in cells (4-12), cell size in world units (>= 0.1).
    pub fn new(size: u32, cell_size: f32, center: Vec3) -> Result<Self> {
        if !(MIN_BOARD_SIZE..=MAX_BOARD_SIZE).contains(&size) {
            return Err(AiError::InvalidBoard(format!(
                "size {} outside {}..={}",
                size, MIN_BOARD_SIZE, MAX_BOARD_SIZE
            )));
        }
        if !cell_size.is_finite() || cell_size < 0.1 {
            return Err(AiError::InvalidBoard(format!("cell size {}", cell_size)));
        }
        if !center.is_finite() {
            return Err(AiError::NonFinitePosition(format!("{:?}", center)));
        }
        Ok(Self {
            size,
            cell_size,
            center,
            ..default()
        })
    }

    /// Default 8x8 board with the standard starting rows
    pub fn standard() -> Self {
        let mut board = Self::default();
        board.setup_standard_position();
        board
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn pawns(&self) -> &[Pawn] {
        &self.pawns
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn pawn(&self, id: PawnId) -> Option<&Pawn> {
        self.pawns.iter().find(|p| p.id == id)
    }

    fn pawn_mut(&mut self, id: PawnId) -> Result<&mut Pawn> {
        self.pawns
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(AiError::UnknownPawn(id))
    }

    /// Number of active pawns of a color
    pub fn count(&self, color: PawnColor) -> usize {
        self.pawns
            .iter()
            .filter(|p| p.is_valid() && p.color == color)
            .count()
    }

    /// World position of a cell center
    pub fn cell_position(&self, column: u32, row: u32) -> Vec3 {
        let half_board = (self.size as f32 - 1.0) * 0.5;
        self.center
            + Vec3::new(
                (column as f32 - half_board) * self.cell_size,
                0.0,
                (row as f32 - half_board) * self.cell_size,
            )
    }

    /// Remove every pawn and pending impulse
    pub fn clear(&mut self) {
        self.pawns.clear();
        self.pending_impulses.clear();
    }

    /// Clear and place one row of White pawns on row 0 and one row of Black on the last row
    pub fn setup_standard_position(&mut self) {
        self.clear();
        self.spawn_row(PawnColor::White, 0, Vec3::Z);
        self.spawn_row(PawnColor::Black, self.size - 1, Vec3::NEG_Z);
    }

    fn spawn_row(&mut self, color: PawnColor, row: u32, forward: Vec3) {
        for column in 0..self.size {
            let position = self.cell_position(column, row);
            let id = self.spawn_pawn_at(color, position);
            if let Ok(pawn) = self.pawn_mut(id) {
                pawn.forward = forward;
            }
        }
    }

    /// Spawn a pawn at an arbitrary world position
    pub fn spawn_pawn_at(&mut self, color: PawnColor, position: Vec3) -> PawnId {
        let id = PawnId(self.next_id);
        self.next_id += 1;
        self.pawns.push(Pawn::new(id, color, position));
        id
    }

    /// Insert a fully configured pawn, replacing any pawn with the same id
    pub fn insert_pawn(&mut self, pawn: Pawn) {
        self.next_id = self.next_id.max(pawn.id.0 + 1);
        self.pawns.retain(|p| p.id != pawn.id);
        self.pawns.push(pawn);
    }

    pub fn add_obstacle(&mut self, position: Vec3, radius: f32) {
        self.obstacles.push(Obstacle { position, radius });
    }

    /// Physics engine writes back resolved positions through this
    pub fn set_pawn_position(&mut self, id: PawnId, position: Vec3) -> Result<()> {
        if !position.is_finite() {
            return Err(AiError::NonFinitePosition(format!("{:?}", position)));
        }
        self.pawn_mut(id)?.position = position;
        Ok(())
    }

    /// Disable a pawn that was knocked off
    pub fn remove_pawn(&mut self, id: PawnId) -> Result<()> {
        let pawn = self.pawn_mut(id)?;
        pawn.active = false;
        pawn.interactable = false;
        Ok(())
    }

    pub fn set_interactable(&mut self, color: PawnColor, interactable: bool) {
        for pawn in self.pawns.iter_mut().filter(|p| p.color == color) {
            pawn.interactable = interactable && pawn.active;
        }
    }

    pub fn set_all_interactable(&mut self, interactable: bool) {
        for pawn in &mut self.pawns {
            pawn.interactable = interactable && pawn.active;
        }
    }

    /// Whether a world point lies inside the membership box above the surface
    pub fn in_play_area(&self, position: Vec3) -> bool {
        let half = self.board_size() * 0.5;
        let offset = position - self.center;
        offset.x.abs() <= half
            && offset.z.abs() <= half
            && offset.y >= -BOARD_SURFACE_HALF_HEIGHT
            && offset.y <= half + BOARD_SURFACE_HALF_HEIGHT
    }

    /// Rebuild membership from the box query. Returns the pawns that dropped out.
    pub fn refresh_membership(&mut self) -> Vec<PawnId> {
        let (kept, dropped): (Vec<Pawn>, Vec<Pawn>) = std::mem::take(&mut self.pawns)
            .into_iter()
            .partition(|p| p.is_valid() && self.in_play_area(p.position));
        self.pawns = kept;
        dropped.into_iter().map(|p| p.id).collect()
    }

    /// Drain impulses for the physics engine
    pub fn take_impulses(&mut self) -> Vec<(PawnId, Vec3)> {
        std::mem::take(&mut self.pending_impulses)
    }

    pub fn pending_impulses(&self) -> &[(PawnId, Vec3)] {
        &self.pending_impulses
    }
}

impl BoardProvider for Board {
    fn pawns_on_board(&self, color: PawnColor) -> Vec<Pawn> {
        self.pawns
            .iter()
            .filter(|p| p.is_valid() && p.color == color)
            .cloned()
            .collect()
    }

    fn center_position(&self) -> Vec3 {
        self.center
    }

    fn board_size(&self) -> f32 {
        self.size as f32
    }
}

impl PhysicsQuery for Board {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        layers: LayerMask,
    ) -> Vec<RayHit> {
        cast_ray_spheres(
            &self.pawns,
            &self.obstacles,
            origin,
            direction,
            max_distance,
            layers,
        )
    }

    fn overlap_sphere(&self, center: Vec3, radius: f32, capacity: usize) -> Vec<PawnId> {
        overlap_pawn_spheres(&self.pawns, center, radius, capacity)
    }
}

impl ImpulseSink for Board {
    fn apply_impulse(&mut self, pawn: PawnId, impulse: Vec3) -> Result<()> {
        if !impulse.is_finite() {
            return Err(AiError::InvalidShot(format!("non-finite impulse {:?}", impulse)));
        }
        let target = self.pawn_mut(pawn)?;
        if !target.active {
            return Err(AiError::InvalidShot(format!("pawn {} is off the board", pawn)));
        }
        self.pending_impulses.push((pawn, impulse));
        Ok(())
    }
}
