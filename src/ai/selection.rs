//! Pawn selection - argmax of position scores

use super::{ScoreBreakdown, ScoringContext};
use crate::board::{Pawn, PhysicsQuery};
use crate::error::Result;

/// The pawn chosen to move and why
#[derive(Clone, Debug, PartialEq)]
pub struct PawnChoice {
    pub pawn: Pawn,
    pub breakdown: ScoreBreakdown,
}

impl PawnChoice {
    pub fn score(&self) -> f32 {
        self.breakdown.total()
    }
}

/// Highest-scoring valid pawn, or None if there is none. Earlier pawns win ties.
/// Scoring errors are returned to the caller.
pub fn select_optimal_pawn<P: PhysicsQuery + ?Sized>(
    ctx: &ScoringContext<'_, P>,
    candidates: &[Pawn],
) -> Result<Option<PawnChoice>> {
    let mut best: Option<PawnChoice> = None;

    for pawn in candidates.iter().filter(|p| p.is_valid()) {
        let breakdown = ctx.score(pawn.position)?;
        if best.as_ref().is_none_or(|b| breakdown.total() > b.score()) {
            best = Some(PawnChoice {
                pawn: pawn.clone(),
                breakdown,
            });
        }
    }

    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::AiSettings;
    use crate::board::{Board, BoardProvider, PawnColor};
    use bevy::prelude::*;

    #[test]
    fn test_sole_pawn_is_selected() {
        let mut board = Board::new(8, 0.9, Vec3::ZERO).unwrap();
        let id = board.spawn_pawn_at(PawnColor::White, Vec3::ZERO);
        board.spawn_pawn_at(PawnColor::Black, Vec3::new(0.0, 0.0, 3.0));
        let friendly = board.pawns_on_board(PawnColor::White);
        let enemies = board.pawns_on_board(PawnColor::Black);
        let settings = AiSettings::default();
        let ctx = ScoringContext::new(&board, &friendly, &enemies, &settings, Vec3::ZERO, 8.0);

        let choice = select_optimal_pawn(&ctx, &friendly).unwrap().unwrap();
        assert_eq!(choice.pawn.id, id);
    }

    #[test]
    fn test_empty_or_invalid_gives_none() {
        let board = Board::standard();
        let settings = AiSettings::default();
        let ctx = ScoringContext::new(&board, &[], &[], &settings, Vec3::ZERO, 8.0);
        assert!(select_optimal_pawn(&ctx, &[]).unwrap().is_none());

        let mut removed = board.pawns()[0].clone();
        removed.active = false;
        assert!(select_optimal_pawn(&ctx, &[removed]).unwrap().is_none());
    }

    #[test]
    fn test_best_line_of_fire_wins() {
        let mut board = Board::new(8, 1.0, Vec3::ZERO).unwrap();
        // Left pawn sees two enemies in a row, right pawn sees one
        board.spawn_pawn_at(PawnColor::White, Vec3::new(2.0, 0.0, -3.0));
        let left = board.spawn_pawn_at(PawnColor::White, Vec3::new(-1.0, 0.0, -3.0));
        board.spawn_pawn_at(PawnColor::Black, Vec3::new(-1.0, 0.0, 0.0));
        board.spawn_pawn_at(PawnColor::Black, Vec3::new(-1.0, 0.0, 1.0));
        let friendly = board.pawns_on_board(PawnColor::White);
        let enemies = board.pawns_on_board(PawnColor::Black);
        let settings = AiSettings {
            line_of_fire_weight: 5.0,
            ..default()
        };
        let ctx = ScoringContext::new(&board, &friendly, &enemies, &settings, Vec3::ZERO, 8.0);

        let choice = select_optimal_pawn(&ctx, &friendly).unwrap().unwrap();
        assert_eq!(choice.pawn.id, left);
    }

    #[test]
    fn test_scoring_error_propagates() {
        let board = Board::standard();
        let settings = AiSettings::default();
        let ctx = ScoringContext::new(&board, &[], &[], &settings, Vec3::ZERO, -1.0);
        assert!(select_optimal_pawn(&ctx, board.pawns()).is_err());
    }
}
