//! Bevy integration: the session resource, profile seats and the frame system

use bevy::prelude::*;

use super::GameSession;
use crate::ai::AiProfileDatabase;
use crate::board::Board;
use crate::config_watcher::{ConfigWatcher, check_config_changes};
use crate::player::{Player, PlayerId};

/// Which named profile drives each AI seat. Re-applied whenever profiles reload.
#[derive(Resource, Clone, Debug, Default)]
pub struct SeatProfiles(pub [Option<String>; 2]);

impl SeatProfiles {
    /// Copy each named profile's settings onto its seat. Unknown names are skipped.
    pub fn apply(&self, db: &AiProfileDatabase, session: &mut GameSession) {
        for (seat, name) in self.0.iter().enumerate() {
            let Some(name) = name else {
                continue;
            };
            match db.find(name) {
                Some(profile) => {
                    session.set_ai_settings(PlayerId(seat), profile.settings.clone());
                    info!("Seat {} uses AI profile {}", PlayerId(seat), profile.name);
                }
                None => warn!("Unknown AI profile '{}' for seat {}", name, PlayerId(seat)),
            }
        }
    }
}

/// Plays one game of pawn strike inside a Bevy app
#[derive(Clone)]
pub struct PawnStrikePlugin {
    pub players: [Player; 2],
    pub board: Board,
    pub seed: u64,
    /// Personality tolerance applied to AI seats after profiles
    pub personality: Option<f32>,
    pub profiles: SeatProfiles,
    /// None picks the first player at random
    pub first: Option<PlayerId>,
}

impl PawnStrikePlugin {
    pub fn new(first: Player, second: Player, seed: u64) -> Self {
        Self {
            players: [first, second],
            board: Board::default(),
            seed,
            personality: None,
            profiles: SeatProfiles::default(),
            first: None,
        }
    }

    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self
    }

    pub fn with_personality(mut self, tolerance: f32) -> Self {
        self.personality = Some(tolerance);
        self
    }

    pub fn with_profile(mut self, seat: PlayerId, name: &str) -> Self {
        self.profiles.0[seat.0 % 2] = Some(name.to_string());
        self
    }

    pub fn with_first_player(mut self, first: PlayerId) -> Self {
        self.first = Some(first);
        self
    }
}

/// First player chosen for the game started at Startup
#[derive(Resource, Clone, Copy)]
struct FirstPlayer(Option<PlayerId>);

impl Plugin for PawnStrikePlugin {
    fn build(&self, app: &mut App) {
        let [first, second] = self.players.clone();
        let mut session = GameSession::new(first, second, self.board.clone(), self.seed);

        // init_resource keeps a database the caller inserted earlier
        app.init_resource::<AiProfileDatabase>();
        let db = app.world().resource::<AiProfileDatabase>().clone();
        self.profiles.apply(&db, &mut session);
        if let Some(tolerance) = self.personality {
            session = session.with_personality(tolerance);
        }

        app.insert_resource(session)
            .insert_resource(self.profiles.clone())
            .insert_resource(FirstPlayer(self.first))
            .init_resource::<ConfigWatcher>()
            .add_systems(Startup, start_game)
            .add_systems(Update, (check_config_changes, tick_game_session).chain());
    }
}

fn start_game(first: Res<FirstPlayer>, mut session: ResMut<GameSession>) {
    session.start_new_game(first.0);
}

/// Advance the session by the frame delta
pub fn tick_game_session(time: Res<Time>, mut session: ResMut<GameSession>) {
    session.update(time.delta_secs());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{AiProfile, AiSettings};
    use crate::game::TurnPhase;
    use crate::player::PlayerKind;
    use bevy::time::TimeUpdateStrategy;
    use std::time::Duration;

    fn fast_settings() -> AiSettings {
        AiSettings {
            min_decision_delay_ms: 100,
            max_decision_delay_ms: 100,
            aiming_time_ms: 600,
            camera_settle_buffer_ms: 0,
            ..default()
        }
    }

    fn app(plugin: PawnStrikePlugin) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)))
            .insert_resource(AiProfileDatabase::builtin())
            .add_plugins(plugin);
        app
    }

    fn bots() -> PawnStrikePlugin {
        PawnStrikePlugin::new(
            Player::new(PlayerId(0), "Red", PlayerKind::Ai).with_ai_settings(fast_settings()),
            Player::new(PlayerId(1), "Blue", PlayerKind::Ai).with_ai_settings(fast_settings()),
            11,
        )
        .with_first_player(PlayerId(0))
    }

    #[test]
    fn test_startup_begins_first_turn() {
        let mut app = app(bots());
        app.update();
        let session = app.world().resource::<GameSession>();
        assert_eq!(session.game.turn(), 1);
        assert_eq!(session.game.current_id(), PlayerId(0));
        assert!(session.controller(PlayerId(0)).is_busy());
    }

    #[test]
    fn test_frames_drive_ai_to_impulse() {
        let mut app = app(bots());
        // 100 ms delay + 1 s camera + 600 ms aim, at 50 ms per frame
        for _ in 0..60 {
            app.update();
        }
        let session = app.world().resource::<GameSession>();
        assert_eq!(
            session.board.pending_impulses().len(),
            1,
            "exactly one impulse after the first turn, phase {:?}",
            session.game.phase()
        );
        assert!(!matches!(session.game.phase(), TurnPhase::Idle));
    }

    #[test]
    fn test_seat_profiles_override_settings() {
        let mut db = AiProfileDatabase::builtin();
        db.push(AiProfile {
            name: "Sniper".to_string(),
            settings: AiSettings {
                line_of_fire_weight: 4.0,
                ..fast_settings()
            },
        });
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(db)
            .add_plugins(bots().with_profile(PlayerId(1), "sniper"));
        let session = app.world().resource::<GameSession>();
        let seat = session.game.player(PlayerId(1));
        assert_eq!(seat.ai_settings.as_ref().map(|s| s.line_of_fire_weight), Some(4.0));
        let other = session.game.player(PlayerId(0));
        assert_eq!(other.ai_settings.as_ref().map(|s| s.line_of_fire_weight), Some(2.0));
    }
}
