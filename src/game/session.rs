//! Game session - one game's board, players, AI seats and events
//!
//! Everything a game touches is owned here and passed down by reference, so a
//! new session never shares subscribers or timers with the previous one.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::{Game, TurnPhase};
use crate::ai::{AiController, AiSettings, FixedCamera, TurnOutcome};
use crate::board::{Board, ImpulseSink, PawnColor, PawnId};
use crate::error::{AiError, Result};
use crate::events::{EventBus, TurnEvent};
use crate::helpers::horizontal_unit;
use crate::player::{Player, PlayerId};

/// Headless game host. Advance it with `update(dt)`.
#[derive(Resource)]
pub struct GameSession {
    pub game: Game,
    pub board: Board,
    pub events: EventBus,
    controllers: [AiController; 2],
    camera: FixedCamera,
    session_id: String,
    seed: u64,
    rng: StdRng,
    elapsed: f32,
}

impl GameSession {
    pub fn new(first: Player, second: Player, board: Board, seed: u64) -> Self {
        Self {
            game: Game::new(first, second),
            board,
            events: EventBus::new(),
            controllers: [
                AiController::new(seed.wrapping_mul(2).wrapping_add(1)),
                AiController::new(seed.wrapping_mul(2).wrapping_add(2)),
            ],
            camera: FixedCamera::default(),
            session_id: uuid::Uuid::new_v4().to_string(),
            seed,
            rng: StdRng::seed_from_u64(seed),
            elapsed: 0.0,
        }
    }

    /// Jitter every AI seat's settings, seeded from the session seed and seat
    pub fn with_personality(mut self, tolerance: f32) -> Self {
        for id in [PlayerId(0), PlayerId(1)] {
            let seed = self.seed ^ (0x9E37_79B9 + id.0 as u64);
            let player = self.game.player_mut(id);
            if player.is_ai() {
                let base = player.ai_settings.clone().unwrap_or_default();
                player.ai_settings = Some(base.with_personality(seed, tolerance));
            }
        }
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn controller(&self, id: PlayerId) -> &AiController {
        &self.controllers[id.0 % 2]
    }

    /// Replace a seat's AI settings; applies from that seat's next turn
    pub fn set_ai_settings(&mut self, id: PlayerId, settings: AiSettings) {
        self.game.player_mut(id).ai_settings = Some(settings);
    }

    /// Start a new game, cancelling any AI turn in flight. Random first player if None.
    pub fn start_new_game(&mut self, first: Option<PlayerId>) {
        for controller in &mut self.controllers {
            controller.abort();
        }
        self.events = EventBus::new();
        self.events.update_time(self.elapsed);

        let first = first.unwrap_or_else(|| Game::random_first_player(&mut self.rng));
        self.game.new_game(first);
        self.board.setup_standard_position();
        self.board.set_all_interactable(false);

        info!(
            "New game {} (seed {}), {} moves first",
            self.session_id,
            self.seed,
            self.game.current_player().name
        );
        self.events.emit(TurnEvent::GameStarted {
            session_id: self.session_id.clone(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            seed: self.seed,
            first_player: self.game.current_player().name.clone(),
        });
        self.begin_turn();
    }

    /// Human interrupt: cancel the current turn. An AI turn stops on its next tick
    /// and the game waits for `resume_turn`.
    pub fn cancel_current_turn(&mut self) {
        if self.game.phase() != TurnPhase::AwaitingShot {
            return;
        }
        self.game.turn_cancel().cancel();
        if !self.game.current_player().is_ai() {
            let player = self.game.current_player().name.clone();
            self.board.set_all_interactable(false);
            self.events.emit(TurnEvent::TurnCancelled { player });
            self.game.suspend();
        }
    }

    /// Replay the current turn with a fresh cancel token after a cancellation
    pub fn resume_turn(&mut self) -> Result<()> {
        if self.game.phase() != TurnPhase::Suspended {
            return Err(AiError::InvalidShot("no suspended turn to resume".to_string()));
        }
        self.game.restart_turn();
        self.begin_turn();
        Ok(())
    }

    fn begin_turn(&mut self) {
        let player = self.game.current_player().clone();
        self.events.emit(TurnEvent::TurnStarted {
            turn: self.game.turn(),
            player: player.name.clone(),
            kind: player.kind,
            color: player.color(),
        });

        if !player.is_ai() {
            // Before colors are known a human may pick any pawn
            if player.color().is_resolved() {
                self.board.set_all_interactable(false);
                self.board.set_interactable(player.color(), true);
            } else {
                self.board.set_all_interactable(true);
            }
            return;
        }

        self.board.set_all_interactable(false);
        if !player.color().is_resolved() {
            let color = self.game.assign_random_colors(&mut self.rng);
            self.emit_color_assignments(color);
        }

        // Re-read: colors may have just been assigned
        let player = self.game.current_player().clone();
        let seat = self.game.current_id().0 % 2;
        let result = self.controllers[seat].make_move(
            &player,
            &self.board,
            &mut self.camera,
            self.game.turn_cancel(),
        );
        match result {
            Ok(pawn) => self.events.emit(TurnEvent::PawnSelected {
                player: player.name.clone(),
                pawn,
            }),
            Err(e) => self.fail_turn(&e),
        }
    }

    fn emit_color_assignments(&mut self, color: PawnColor) {
        let current = self.game.current_player().name.clone();
        let opponent = self.game.opponent().name.clone();
        info!("{} plays {}, {} plays {}", current, color, opponent, color.opponent());
        self.events.emit(TurnEvent::ColorAssigned {
            player: current,
            color,
        });
        self.events.emit(TurnEvent::ColorAssigned {
            player: opponent,
            color: color.opponent(),
        });
    }

    /// The turn cannot be played; it is released so the game moves on
    fn fail_turn(&mut self, error: &AiError) {
        let player = self.game.current_player().name.clone();
        warn!("Turn {} for {} failed: {}", self.game.turn(), player, error);
        self.events.emit(TurnEvent::TurnFailed {
            player,
            reason: error.to_string(),
        });
        self.game.begin_resolution();
    }

    /// A human flicks `pawn`. Only valid while that human is to move.
    pub fn apply_human_shot(&mut self, pawn: PawnId, direction: Vec3, force: f32) -> Result<()> {
        if self.game.phase() != TurnPhase::AwaitingShot {
            return Err(AiError::InvalidShot("not waiting for a shot".to_string()));
        }
        let player = self.game.current_player().clone();
        if player.is_ai() {
            return Err(AiError::InvalidShot(format!("it is {}'s turn", player.name)));
        }
        let target = self.board.pawn(pawn).cloned().ok_or(AiError::UnknownPawn(pawn))?;
        if !target.interactable {
            return Err(AiError::InvalidShot(format!("pawn {} is not interactable", pawn)));
        }
        if player.color().is_resolved() && target.color != player.color() {
            return Err(AiError::InvalidShot(format!("pawn {} belongs to the opponent", pawn)));
        }
        let direction = horizontal_unit(direction)
            .ok_or_else(|| AiError::InvalidShot(format!("direction {:?} has no horizontal part", direction)))?;
        if !force.is_finite() {
            return Err(AiError::InvalidShot(format!("force {}", force)));
        }

        if !player.color().is_resolved() {
            self.game.assign_colors(target.color);
            self.emit_color_assignments(target.color);
        }

        let impulse = direction * force.clamp(target.min_force, target.max_force);
        self.board.apply_impulse(pawn, impulse)?;
        self.events.emit(TurnEvent::ImpulseApplied {
            pawn,
            impulse: impulse.to_array(),
        });
        self.board.set_all_interactable(false);
        self.game.begin_resolution();
        Ok(())
    }

    /// Advance by one frame
    pub fn update(&mut self, dt: f32) {
        self.elapsed += dt;
        self.events.update_time(self.elapsed);

        match self.game.phase() {
            TurnPhase::Idle | TurnPhase::Suspended | TurnPhase::GameOver { .. } => {}
            TurnPhase::AwaitingShot => self.tick_ai(dt),
            TurnPhase::Resolving { .. } => {
                if self.game.advance_resolution(dt) {
                    self.end_turn();
                }
            }
        }
    }

    fn tick_ai(&mut self, dt: f32) {
        if !self.game.current_player().is_ai() {
            return;
        }
        let seat = self.game.current_id().0 % 2;
        let Some(outcome) = self.controllers[seat].tick(dt, &mut self.board, &mut self.events) else {
            return;
        };

        let player = self.game.current_player().name.clone();
        match outcome {
            TurnOutcome::Applied { pawn, impulse } => {
                self.events.emit(TurnEvent::ImpulseApplied {
                    pawn,
                    impulse: impulse.to_array(),
                });
                self.game.begin_resolution();
            }
            TurnOutcome::Cancelled => {
                info!("Turn {} for {} cancelled, game suspended", self.game.turn(), player);
                self.events.emit(TurnEvent::TurnCancelled { player });
                self.game.suspend();
            }
            TurnOutcome::Failed(e) => self.fail_turn(&e),
        }
    }

    fn end_turn(&mut self) {
        let removed = self.board.refresh_membership();
        if !removed.is_empty() {
            info!("{} pawns left the board", removed.len());
            self.events.emit(TurnEvent::PawnsRemoved { pawns: removed });
        }
        self.events.emit(TurnEvent::TurnEnded {
            turn: self.game.turn(),
        });

        if let Some(winner) = self.check_game_over() {
            let turns = self.game.turn();
            let winner_name = winner.map(|id| self.game.player(id).name.clone());
            info!("Game over after {} turns, winner {:?}", turns, winner_name);
            self.game.finish(winner);
            self.board.set_all_interactable(false);
            self.events.emit(TurnEvent::GameOver {
                winner: winner_name,
                turns,
            });
            return;
        }

        self.game.switch_player();
        self.begin_turn();
    }

    /// Some(winner) when a color has run out of pawns; Some(None) for a draw
    fn check_game_over(&self) -> Option<Option<PlayerId>> {
        let white = self.board.count(PawnColor::White);
        let black = self.board.count(PawnColor::Black);
        match (white, black) {
            (0, 0) => Some(None),
            (0, _) => Some(self.game.player_with_color(PawnColor::Black)),
            (_, 0) => Some(self.game.player_with_color(PawnColor::White)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::PlayerKind;

    const DT: f32 = 0.05;

    fn fast_settings() -> AiSettings {
        AiSettings {
            min_decision_delay_ms: 100,
            max_decision_delay_ms: 100,
            aiming_time_ms: 600,
            camera_settle_buffer_ms: 0,
            ..default()
        }
    }

    fn bot(name: &str) -> Player {
        Player::new(PlayerId(0), name, PlayerKind::Ai).with_ai_settings(fast_settings())
    }

    fn human(name: &str) -> Player {
        Player::new(PlayerId(0), name, PlayerKind::Human)
    }

    fn has_event(session: &GameSession, kind: &str) -> bool {
        session.events.history().any(|e| e.event.kind() == kind)
    }

    fn white_pawn(session: &GameSession) -> PawnId {
        session
            .board
            .pawns()
            .iter()
            .find(|p| p.color == PawnColor::White)
            .map(|p| p.id)
            .unwrap()
    }

    #[test]
    fn test_ai_vs_ai_turn_passes_after_shot() {
        let mut session = GameSession::new(bot("Red"), bot("Blue"), Board::default(), 5);
        session.start_new_game(Some(PlayerId(0)));
        match session.events.history().next().map(|e| &e.event) {
            Some(TurnEvent::GameStarted {
                session_id,
                timestamp,
                seed,
                ..
            }) => {
                assert_eq!(session_id, session.session_id());
                assert!(
                    chrono::DateTime::parse_from_rfc3339(timestamp).is_ok(),
                    "timestamp {} is RFC 3339",
                    timestamp
                );
                assert_eq!(*seed, 5);
            }
            other => panic!("first event should be GameStarted, got {:?}", other),
        }
        assert!(has_event(&session, "ColorAssigned"), "AI moving first picks a color");

        let mut frames = 0;
        while session.game.turn() == 1 && frames < 200 {
            session.update(DT);
            frames += 1;
        }
        assert_eq!(session.game.turn(), 2, "turn passed after {} frames", frames);
        assert_eq!(session.game.current_id(), PlayerId(1));
        assert_eq!(session.board.pending_impulses().len(), 1);
        assert!(has_event(&session, "PawnSelected"));
        assert!(has_event(&session, "ImpulseApplied"));
        assert!(has_event(&session, "TurnEnded"));
        assert_ne!(
            session.game.player(PlayerId(0)).color(),
            session.game.player(PlayerId(1)).color()
        );
    }

    #[test]
    fn test_human_shot_validation() {
        let mut session = GameSession::new(human("Ann"), bot("Bot"), Board::default(), 1);
        session.start_new_game(Some(PlayerId(0)));

        assert_eq!(
            session.apply_human_shot(PawnId(999), Vec3::Z, 50.0),
            Err(AiError::UnknownPawn(PawnId(999)))
        );
        let pawn = white_pawn(&session);
        assert!(session.apply_human_shot(pawn, Vec3::Y, 50.0).is_err(), "vertical shot");
        assert!(session.apply_human_shot(pawn, Vec3::Z, f32::NAN).is_err());
        assert_eq!(session.game.phase(), TurnPhase::AwaitingShot, "rejected shots change nothing");

        session.apply_human_shot(pawn, Vec3::new(0.0, 2.0, 3.0), 1000.0).unwrap();
        let (id, impulse) = session.board.pending_impulses()[0];
        assert_eq!(id, pawn);
        assert!((impulse.length() - 350.0).abs() < 1e-3, "force clamped, got {}", impulse.length());
        assert_eq!(impulse.y, 0.0);
        assert_eq!(session.game.player(PlayerId(0)).color(), PawnColor::White);
        assert_eq!(session.game.player(PlayerId(1)).color(), PawnColor::Black);
        assert!(matches!(session.game.phase(), TurnPhase::Resolving { .. }));

        assert!(session.apply_human_shot(pawn, Vec3::Z, 50.0).is_err(), "one shot per turn");
    }

    #[test]
    fn test_human_cannot_shoot_on_ai_turn() {
        let mut session = GameSession::new(human("Ann"), bot("Bot"), Board::default(), 1);
        session.start_new_game(Some(PlayerId(1)));
        let pawn = white_pawn(&session);
        assert!(session.apply_human_shot(pawn, Vec3::Z, 50.0).is_err());
    }

    #[test]
    fn test_cancel_suspends_until_resumed() {
        let mut session = GameSession::new(bot("Red"), bot("Blue"), Board::default(), 9);
        session.start_new_game(Some(PlayerId(0)));
        session.update(DT);

        session.cancel_current_turn();
        for _ in 0..100 {
            session.update(DT);
        }
        assert_eq!(session.game.phase(), TurnPhase::Suspended);
        assert!(session.board.pending_impulses().is_empty(), "cancelled turn applies nothing");
        assert!(has_event(&session, "TurnCancelled"));
        assert!(!has_event(&session, "TurnFailed"), "cancellation is not a failure");

        session.resume_turn().unwrap();
        assert_eq!(session.game.phase(), TurnPhase::AwaitingShot);
        assert_eq!(session.game.turn(), 1);
        assert!(session.controller(PlayerId(0)).is_busy());
        assert!(session.resume_turn().is_err(), "nothing left to resume");
    }

    #[test]
    fn test_new_game_cancels_running_turn() {
        let mut session = GameSession::new(bot("Red"), bot("Blue"), Board::default(), 2);
        session.start_new_game(Some(PlayerId(0)));
        session.update(DT);
        let token = session.game.turn_cancel();

        session.start_new_game(Some(PlayerId(1)));
        assert!(token.is_cancelled());
        assert_eq!(session.game.turn(), 1);
        assert_eq!(session.game.current_id(), PlayerId(1));
        assert_eq!(
            session.events.history().next().map(|e| e.event.kind()),
            Some("GameStarted"),
            "the new game has its own bus"
        );
    }

    #[test]
    fn test_game_over_when_color_runs_out() {
        let mut session = GameSession::new(human("Ann"), bot("Bot"), Board::default(), 4);
        session.start_new_game(Some(PlayerId(0)));
        let pawn = white_pawn(&session);
        session.apply_human_shot(pawn, Vec3::Z, 100.0).unwrap();

        let black: Vec<PawnId> = session
            .board
            .pawns()
            .iter()
            .filter(|p| p.color == PawnColor::Black)
            .map(|p| p.id)
            .collect();
        for id in black {
            session.board.remove_pawn(id).unwrap();
        }
        for _ in 0..40 {
            session.update(DT);
        }

        assert_eq!(
            session.game.phase(),
            TurnPhase::GameOver {
                winner: Some(PlayerId(0))
            }
        );
        assert!(session.events.history().any(|e| matches!(
            &e.event,
            TurnEvent::GameOver { winner: Some(name), turns: 1 } if name == "Ann"
        )));
    }
}
