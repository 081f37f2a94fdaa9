//! Pawn Strike - headless AI vs AI match
//!
//! Usage:
//!   cargo run -- --seed 42 --turns 30
//!   cargo run -- --p1 Sniper --p2 Turtle --personality 0.2
//!   cargo run -- --json > match.json

use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use pawn_strike::board::ColliderRef;
use pawn_strike::{
    BoardProvider, GameSession, LayerMask, PawnColor, PawnStrikePlugin, PhysicsQuery, Player,
    PlayerId, PlayerKind, TurnEvent, TurnPhase, game::tick_game_session,
};

/// Frames per simulated second
const FPS: f32 = 60.0;

/// Command line options
#[derive(Debug, Clone)]
struct MatchConfig {
    seed: u64,
    max_turns: u32,
    first_profile: Option<String>,
    second_profile: Option<String>,
    personality: Option<f32>,
    json: bool,
    quiet: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: rand::random(),
            max_turns: 40,
            first_profile: None,
            second_profile: None,
            personality: None,
            json: false,
            quiet: false,
        }
    }
}

impl MatchConfig {
    fn from_args() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut config = Self::default();

        let mut i = 1;
        while i < args.len() {
            let value = args.get(i + 1);
            match args[i].as_str() {
                "--seed" => {
                    if let Some(seed) = value.and_then(|v| v.parse().ok()) {
                        config.seed = seed;
                    }
                    i += 1;
                }
                "--turns" => {
                    if let Some(turns) = value.and_then(|v| v.parse().ok()) {
                        config.max_turns = turns;
                    }
                    i += 1;
                }
                "--p1" => {
                    config.first_profile = value.cloned();
                    i += 1;
                }
                "--p2" => {
                    config.second_profile = value.cloned();
                    i += 1;
                }
                "--personality" => {
                    config.personality = value.and_then(|v| v.parse().ok());
                    i += 1;
                }
                "--json" => config.json = true,
                "--quiet" | "-q" => config.quiet = true,
                "--help" | "-h" => {
                    println!("Usage: pawn_strike [--seed N] [--turns N] [--p1 PROFILE] [--p2 PROFILE]");
                    println!("                   [--personality TOLERANCE] [--json] [--quiet]");
                    std::process::exit(0);
                }
                other => eprintln!("Ignoring unknown argument {}", other),
            }
            i += 1;
        }
        config
    }
}

/// One applied shot, for the summary
#[derive(Debug, Serialize)]
struct ShotRecord {
    turn: u32,
    player: String,
    pawn: u32,
    impulse: [f32; 3],
}

#[derive(Debug, Serialize)]
struct MatchSummary {
    session_id: String,
    seed: u64,
    turns: u32,
    winner: Option<String>,
    finished: bool,
    white_left: usize,
    black_left: usize,
    shots: Vec<ShotRecord>,
    event_counts: BTreeMap<&'static str, usize>,
}

impl MatchSummary {
    /// Summarize the first `max_turns` completed turns. The turn that starts
    /// right after the last one is left out.
    fn from_session(session: &GameSession, max_turns: u32) -> Self {
        let mut shots = Vec::new();
        let mut event_counts = BTreeMap::new();
        let mut turn = 0;
        let mut completed = 0;
        let mut player = String::new();
        let mut winner = None;

        for bus_event in session.events.history() {
            let game_over = matches!(bus_event.event, TurnEvent::GameOver { .. });
            if completed >= max_turns && !game_over {
                continue;
            }
            *event_counts.entry(bus_event.event.kind()).or_insert(0) += 1;
            match &bus_event.event {
                TurnEvent::TurnStarted { turn: t, player: p, .. } => {
                    turn = *t;
                    player = p.clone();
                }
                TurnEvent::ImpulseApplied { pawn, impulse } => shots.push(ShotRecord {
                    turn,
                    player: player.clone(),
                    pawn: pawn.0,
                    impulse: *impulse,
                }),
                TurnEvent::TurnEnded { turn: t } => completed = *t,
                TurnEvent::GameOver { winner: w, .. } => winner = w.clone(),
                _ => {}
            }
        }

        Self {
            session_id: session.session_id().to_string(),
            seed: session.seed(),
            turns: completed,
            winner,
            finished: session.game.is_over(),
            white_left: session.board.count(PawnColor::White),
            black_left: session.board.count(PawnColor::Black),
            shots,
            event_counts,
        }
    }

    fn print(&self) {
        println!("Match {} (seed {})", self.session_id, self.seed);
        println!("==============");
        for shot in &self.shots {
            println!(
                "  turn {:>3}  {:<6} pawn #{:<3} impulse ({:>7.1}, {:>7.1})",
                shot.turn, shot.player, shot.pawn, shot.impulse[0], shot.impulse[2]
            );
        }
        println!("==============");
        match (&self.winner, self.finished) {
            (Some(name), _) => println!("{} wins after {} turns", name, self.turns),
            (None, true) => println!("Draw after {} turns", self.turns),
            (None, false) => println!("No result after {} turns", self.turns),
        }
        println!("White pawns left: {}, Black pawns left: {}", self.white_left, self.black_left);
    }
}

/// Stand-in for a physics engine: each impulse slides its pawn along the
/// impulse, and the first enemy in the way is knocked on by the leftover travel.
fn resolve_impulses(mut session: ResMut<GameSession>) {
    let impulses = session.board.take_impulses();
    let board_extent = session.board.board_size() * session.board.cell_size();

    for (id, impulse) in impulses {
        let Some(pawn) = session.board.pawn(id).cloned() else {
            continue;
        };
        let Some(direction) = impulse.try_normalize() else {
            continue;
        };
        let travel = impulse.length() / pawn.max_force * board_extent;

        let enemy_hit = session
            .board
            .cast_ray(pawn.position, direction, travel, LayerMask::PAWN)
            .into_iter()
            .find_map(|hit| match hit.collider {
                ColliderRef::Pawn(other) => session
                    .board
                    .pawn(other)
                    .filter(|p| p.color != pawn.color)
                    .map(|p| (p.id, p.position, hit.distance)),
                ColliderRef::Obstacle(_) => None,
            });

        let moves = match enemy_hit {
            Some((enemy, enemy_position, distance)) => vec![
                (id, pawn.position + direction * distance),
                (enemy, enemy_position + direction * (travel - distance)),
            ],
            None => vec![(id, pawn.position + direction * travel)],
        };
        for (target, position) in moves {
            if let Err(e) = session.board.set_pawn_position(target, position) {
                warn!("Could not move {}: {}", target, e);
            }
        }
    }
}

fn main() {
    let config = MatchConfig::from_args();

    let first = Player::new(PlayerId(0), "Alpha", PlayerKind::Ai);
    let second = Player::new(PlayerId(1), "Bravo", PlayerKind::Ai);
    let mut plugin = PawnStrikePlugin::new(first, second, config.seed);
    if let Some(name) = &config.first_profile {
        plugin = plugin.with_profile(PlayerId(0), name);
    }
    if let Some(name) = &config.second_profile {
        plugin = plugin.with_profile(PlayerId(1), name);
    }
    if let Some(tolerance) = config.personality {
        plugin = plugin.with_personality(tolerance);
    }

    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f32(1.0 / FPS)));
    if !config.quiet && !config.json {
        app.add_plugins(LogPlugin::default());
    }
    app.add_plugins(plugin)
        .add_systems(Update, resolve_impulses.after(tick_game_session));

    // Generous frame cap: a turn is at most a few seconds of game time
    let max_frames = (config.max_turns as f32 * 15.0 * FPS) as u64;
    for _ in 0..max_frames {
        app.update();

        // Turn max_turns + 1 beginning means the last counted turn has ended
        let session = app.world().resource::<GameSession>();
        let past_turn_limit = session.game.turn() > config.max_turns;
        if session.game.is_over() || past_turn_limit || session.game.phase() == TurnPhase::Suspended {
            break;
        }
    }

    let summary = MatchSummary::from_session(app.world().resource::<GameSession>(), config.max_turns);
    if config.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to serialize summary: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        summary.print();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pawn_strike::{AiSettings, Board};

    fn bot(id: usize, name: &str) -> Player {
        Player::new(PlayerId(id), name, PlayerKind::Ai).with_ai_settings(AiSettings {
            min_decision_delay_ms: 100,
            max_decision_delay_ms: 100,
            aiming_time_ms: 600,
            camera_settle_buffer_ms: 0,
            ..AiSettings::default()
        })
    }

    #[test]
    fn test_summary_stops_at_turn_limit() {
        let mut session = GameSession::new(bot(0, "Alpha"), bot(1, "Bravo"), Board::default(), 11);
        session.start_new_game(Some(PlayerId(0)));

        let mut frames = 0;
        while session.game.turn() <= 2 && !session.game.is_over() && frames < 2000 {
            session.update(1.0 / FPS);
            frames += 1;
        }
        assert_eq!(session.game.turn(), 3, "third turn should have begun");

        let summary = MatchSummary::from_session(&session, 2);
        assert_eq!(summary.turns, 2);
        assert_eq!(summary.shots.len(), 2, "one shot per completed turn");
        assert_eq!(summary.event_counts.get("TurnStarted"), Some(&2));
        assert!(summary.shots.iter().all(|s| s.turn <= 2));
    }
}
