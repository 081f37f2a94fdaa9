//! Position scoring - how good a pawn's spot is to shoot from
//!
//! Five weighted terms, each exposed separately:
//! - friendly clustering (bonus)
//! - enemy proximity (bonus)
//! - line of fire: enemy hits minus friendly hits along the best line
//! - board center proximity (bonus)
//! - board edge proximity (penalty)

use bevy::prelude::*;

use super::{AiSettings, find_optimal_target};
use crate::board::{Pawn, PawnId, PhysicsQuery};
use crate::constants::NEIGHBOR_QUERY_CAPACITY;
use crate::error::{AiError, Result};
use crate::helpers::clamp01;

/// Per-term contributions, already weighted. `edge` is stored as a positive penalty.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreBreakdown {
    pub friendly_group: f32,
    pub enemy_proximity: f32,
    pub line_of_fire: f32,
    pub center: f32,
    pub edge: f32,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f32 {
        self.friendly_group + self.enemy_proximity + self.line_of_fire + self.center - self.edge
    }
}

/// Everything a score needs, borrowed for one turn
pub struct ScoringContext<'a, P: PhysicsQuery + ?Sized> {
    pub physics: &'a P,
    pub friendly: &'a [Pawn],
    pub enemies: &'a [Pawn],
    pub settings: &'a AiSettings,
    pub board_center: Vec3,
    /// Board size in world units; also the line-of-fire range
    pub board_size: f32,
}

impl<'a, P: PhysicsQuery + ?Sized> ScoringContext<'a, P> {
    pub fn new(
        physics: &'a P,
        friendly: &'a [Pawn],
        enemies: &'a [Pawn],
        settings: &'a AiSettings,
        board_center: Vec3,
        board_size: f32,
    ) -> Self {
        Self {
            physics,
            friendly,
            enemies,
            settings,
            board_center,
            board_size,
        }
    }

    fn count_neighbors(&self, position: Vec3, group: &[Pawn]) -> usize {
        self.physics
            .overlap_sphere(position, self.settings.neighbor_radius, NEIGHBOR_QUERY_CAPACITY)
            .into_iter()
            .filter(|id| contains(group, *id))
            .count()
    }

    /// Friendly pawns within the neighbor radius, the candidate itself included
    pub fn friendly_clustering(&self, position: Vec3) -> f32 {
        self.count_neighbors(position, self.friendly) as f32 * self.settings.friendly_group_weight
    }

    pub fn enemy_proximity(&self, position: Vec3) -> f32 {
        self.count_neighbors(position, self.enemies) as f32 * self.settings.enemy_proximity_weight
    }

    /// Enemy hits along the best line times the line-of-fire weight, minus friendly hits
    /// on that line times the friendly-fire weight. Zero when there is no line.
    pub fn line_of_fire(&self, position: Vec3) -> f32 {
        let Some(choice) = find_optimal_target(
            self.physics,
            position,
            self.friendly,
            self.enemies,
            self.board_size,
            self.settings,
        ) else {
            return 0.0;
        };

        let hits = choice.prediction;
        hits.enemy as f32 * self.settings.line_of_fire_weight
            - hits.friendly as f32 * self.settings.line_of_friendly_fire_weight
    }

    /// 0 at the center, 1 at half the board size or beyond
    fn edge_factor(&self, position: Vec3) -> f32 {
        clamp01(position.distance(self.board_center) / (self.board_size * 0.5))
    }

    pub fn center_bonus(&self, position: Vec3) -> f32 {
        (1.0 - self.edge_factor(position)) * self.settings.board_center_weight
    }

    /// Returned positive; subtracted by `total()`
    pub fn edge_penalty(&self, position: Vec3) -> f32 {
        self.edge_factor(position) * self.settings.edge_penalty_weight
    }

    /// Score a candidate position. Deterministic for fixed pawns and settings.
    pub fn score(&self, position: Vec3) -> Result<ScoreBreakdown> {
        if !position.is_finite() {
            return Err(AiError::NonFinitePosition(format!("candidate {:?}", position)));
        }
        if !self.board_center.is_finite() {
            return Err(AiError::NonFinitePosition(format!("board center {:?}", self.board_center)));
        }
        if !self.board_size.is_finite() || self.board_size <= 0.0 {
            return Err(AiError::InvalidBoard(format!("board size {}", self.board_size)));
        }

        Ok(ScoreBreakdown {
            friendly_group: self.friendly_clustering(position),
            enemy_proximity: self.enemy_proximity(position),
            line_of_fire: self.line_of_fire(position),
            center: self.center_bonus(position),
            edge: self.edge_penalty(position),
        })
    }
}

fn contains(group: &[Pawn], id: PawnId) -> bool {
    group.iter().any(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, BoardProvider, PawnColor};

    fn equal_weights() -> AiSettings {
        AiSettings {
            friendly_group_weight: 1.0,
            enemy_proximity_weight: 1.0,
            line_of_fire_weight: 1.0,
            line_of_friendly_fire_weight: 1.0,
            board_center_weight: 1.0,
            edge_penalty_weight: 1.0,
            ..default()
        }
    }

    #[test]
    fn test_closer_to_center_scores_higher() {
        let mut board = Board::new(8, 0.9, Vec3::ZERO).unwrap();
        board.spawn_pawn_at(PawnColor::White, Vec3::new(0.5, 0.0, 0.0));
        board.spawn_pawn_at(PawnColor::White, Vec3::new(-3.5, 0.0, 0.0));
        let friendly = board.pawns_on_board(PawnColor::White);
        let settings = equal_weights();
        let ctx = ScoringContext::new(&board, &friendly, &[], &settings, Vec3::ZERO, 8.0);

        let inner = ctx.score(friendly[0].position).unwrap();
        let outer = ctx.score(friendly[1].position).unwrap();
        assert_eq!(inner.friendly_group, outer.friendly_group);
        assert!(inner.total() > outer.total(), "inner {:?} outer {:?}", inner, outer);
    }

    #[test]
    fn test_center_and_edge_terms() {
        let board = Board::new(8, 0.9, Vec3::ZERO).unwrap();
        let settings = equal_weights();
        let ctx = ScoringContext::new(&board, &[], &[], &settings, Vec3::ZERO, 8.0);
        assert_eq!(ctx.center_bonus(Vec3::ZERO), 1.0);
        assert_eq!(ctx.edge_penalty(Vec3::ZERO), 0.0);
        assert_eq!(ctx.center_bonus(Vec3::new(2.0, 0.0, 0.0)), 0.5);
        assert_eq!(ctx.edge_penalty(Vec3::new(10.0, 0.0, 0.0)), 1.0);
    }

    #[test]
    fn test_clustering_counts_neighbors_only() {
        let mut board = Board::new(8, 0.9, Vec3::ZERO).unwrap();
        board.spawn_pawn_at(PawnColor::White, Vec3::ZERO);
        board.spawn_pawn_at(PawnColor::White, Vec3::new(1.0, 0.0, 0.0));
        board.spawn_pawn_at(PawnColor::White, Vec3::new(3.5, 0.0, 3.5));
        board.spawn_pawn_at(PawnColor::Black, Vec3::new(0.0, 0.0, 1.5));
        let friendly = board.pawns_on_board(PawnColor::White);
        let enemies = board.pawns_on_board(PawnColor::Black);
        let settings = equal_weights();
        let ctx = ScoringContext::new(&board, &friendly, &enemies, &settings, Vec3::ZERO, 8.0);

        // Self plus the neighbor at x = 1
        assert_eq!(ctx.friendly_clustering(Vec3::ZERO), 2.0);
        assert_eq!(ctx.enemy_proximity(Vec3::ZERO), 1.0);
    }

    #[test]
    fn test_line_of_fire_penalizes_friends_in_line() {
        let mut board = Board::new(8, 1.0, Vec3::ZERO).unwrap();
        board.spawn_pawn_at(PawnColor::White, Vec3::ZERO);
        board.spawn_pawn_at(PawnColor::White, Vec3::new(0.0, 0.0, 1.0));
        board.spawn_pawn_at(PawnColor::Black, Vec3::new(0.0, 0.0, 2.0));
        let friendly = board.pawns_on_board(PawnColor::White);
        let enemies = board.pawns_on_board(PawnColor::Black);
        let settings = AiSettings {
            line_of_fire_weight: 2.0,
            line_of_friendly_fire_weight: 0.5,
            ..default()
        };
        let ctx = ScoringContext::new(&board, &friendly, &enemies, &settings, Vec3::ZERO, 8.0);
        assert!((ctx.line_of_fire(Vec3::ZERO) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_score_is_deterministic() {
        let board = Board::standard();
        let friendly = board.pawns_on_board(PawnColor::White);
        let enemies = board.pawns_on_board(PawnColor::Black);
        let settings = AiSettings::default();
        let ctx = ScoringContext::new(&board, &friendly, &enemies, &settings, Vec3::ZERO, 8.0);
        for pawn in &friendly {
            assert_eq!(ctx.score(pawn.position).unwrap(), ctx.score(pawn.position).unwrap());
        }
    }

    #[test]
    fn test_invalid_inputs_are_errors() {
        let board = Board::standard();
        let settings = AiSettings::default();
        let ctx = ScoringContext::new(&board, &[], &[], &settings, Vec3::ZERO, 8.0);
        assert!(matches!(
            ctx.score(Vec3::new(f32::NAN, 0.0, 0.0)),
            Err(AiError::NonFinitePosition(_))
        ));
        let flat = ScoringContext::new(&board, &[], &[], &settings, Vec3::ZERO, 0.0);
        assert!(matches!(flat.score(Vec3::ZERO), Err(AiError::InvalidBoard(_))));
    }
}
