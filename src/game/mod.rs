//! Game module - turn lifecycle, the session resource and the Bevy plugin
//!
//! `Game` is the turn state machine over two players. `GameSession` owns a
//! game together with its board, AI controllers and event bus, and is what
//! the plugin advances every frame.

mod cancel;
mod plugin;
mod session;

pub use cancel::CancelToken;
pub use plugin::*;
pub use session::*;

use rand::Rng;

use crate::board::PawnColor;
use crate::constants::TURN_END_DELAY_SECS;
use crate::player::{Player, PlayerId};

/// Where the game is between frames
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnPhase {
    /// No game running
    Idle,
    /// The current player has to shoot
    AwaitingShot,
    /// The current turn was cancelled and has not been resumed
    Suspended,
    /// A shot was taken; pawns are still flying
    Resolving { remaining: f32 },
    /// Final state. None is a draw.
    GameOver { winner: Option<PlayerId> },
}

/// Two players taking turns
#[derive(Clone, Debug)]
pub struct Game {
    players: [Player; 2],
    current: PlayerId,
    phase: TurnPhase,
    turn: u32,
    /// Cancel signal for the current turn; replaced at every turn boundary
    turn_cancel: CancelToken,
}

impl Game {
    pub fn new(first: Player, second: Player) -> Self {
        let mut first = first;
        let mut second = second;
        first.id = PlayerId(0);
        second.id = PlayerId(1);
        Self {
            players: [first, second],
            current: PlayerId(0),
            phase: TurnPhase::Idle,
            turn: 0,
            turn_cancel: CancelToken::new(),
        }
    }

    pub fn players(&self) -> &[Player; 2] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> &Player {
        &self.players[id.0 % 2]
    }

    pub fn player_mut(&mut self, id: PlayerId) -> &mut Player {
        &mut self.players[id.0 % 2]
    }

    pub fn current_id(&self) -> PlayerId {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        self.player(self.current)
    }

    pub fn opponent_id(&self) -> PlayerId {
        PlayerId((self.current.0 + 1) % 2)
    }

    pub fn opponent(&self) -> &Player {
        self.player(self.opponent_id())
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn is_first_turn(&self) -> bool {
        self.turn == 1
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::GameOver { .. })
    }

    /// Token handed to the current turn's AI
    pub fn turn_cancel(&self) -> CancelToken {
        self.turn_cancel.clone()
    }

    /// Player holding `color`, once colors are resolved
    pub fn player_with_color(&self, color: PawnColor) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| color.is_resolved() && p.color() == color)
            .map(|p| p.id)
    }

    /// Cancel whatever is running and reset both players for a fresh game
    pub fn new_game(&mut self, first: PlayerId) {
        self.turn_cancel.cancel();
        self.turn_cancel = CancelToken::new();
        for player in &mut self.players {
            player.reset_color();
        }
        self.current = PlayerId(first.0 % 2);
        self.turn = 1;
        self.phase = TurnPhase::AwaitingShot;
    }

    /// Pick who moves first
    pub fn random_first_player(rng: &mut impl Rng) -> PlayerId {
        PlayerId(rng.gen_range(0..2))
    }

    /// Give the current player `color` and the opponent the other one.
    /// Returns false when colors are already locked to something else.
    pub fn assign_colors(&mut self, color: PawnColor) -> bool {
        if !color.is_resolved() {
            return false;
        }
        let current = self.current;
        let opponent = self.opponent_id();
        if self.player(current).color_locked() {
            return self.player(current).color() == color;
        }
        self.player_mut(current).assign_color(color) && self.player_mut(opponent).assign_color(color.opponent())
    }

    /// First-turn AI color: random, opponent gets the opposite
    pub fn assign_random_colors(&mut self, rng: &mut impl Rng) -> PawnColor {
        let color = if rng.r#gen::<bool>() {
            PawnColor::Black
        } else {
            PawnColor::White
        };
        self.assign_colors(color);
        color
    }

    /// A shot was taken: colors are final and the turn ends after the delay
    pub fn begin_resolution(&mut self) {
        for player in &mut self.players {
            player.lock_color();
        }
        self.phase = TurnPhase::Resolving {
            remaining: TURN_END_DELAY_SECS,
        };
    }

    /// Count down the post-shot delay. Returns true once it has elapsed.
    pub fn advance_resolution(&mut self, dt: f32) -> bool {
        let TurnPhase::Resolving { remaining } = self.phase else {
            return false;
        };
        let remaining = remaining - dt;
        if remaining > 0.0 {
            self.phase = TurnPhase::Resolving { remaining };
            false
        } else {
            true
        }
    }

    /// Hand the turn to the other player with a fresh cancel token
    pub fn switch_player(&mut self) {
        self.turn_cancel.cancel();
        self.turn_cancel = CancelToken::new();
        self.current = self.opponent_id();
        self.turn += 1;
        self.phase = TurnPhase::AwaitingShot;
    }

    /// Stop the current turn without passing it on
    pub fn suspend(&mut self) {
        self.turn_cancel.cancel();
        self.phase = TurnPhase::Suspended;
    }

    /// Same player, same turn number, fresh cancel token
    pub fn restart_turn(&mut self) {
        self.turn_cancel = CancelToken::new();
        self.phase = TurnPhase::AwaitingShot;
    }

    pub fn finish(&mut self, winner: Option<PlayerId>) {
        self.turn_cancel.cancel();
        self.phase = TurnPhase::GameOver { winner };
    }
}
