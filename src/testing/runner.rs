//! Scenario execution engine
//!
//! Builds a board from the scenario, drives one AI turn through the
//! controller and captures the events the turn produces frame by frame.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::ai::{AiController, AiSettings, FixedCamera, ScoringContext, TargetSource, TurnOutcome};
use crate::board::{Board, BoardProvider, Pawn, PawnColor, PawnId};
use crate::constants::{DEFAULT_CAMERA_MOVE_SECS, SAME_POSITION_EPSILON};
use crate::events::{EventBus, TurnEvent};
use crate::game::CancelToken;
use crate::player::{Player, PlayerId, PlayerKind};

use super::assertions::{AssertionError, CapturedEvent, ScenarioState, check_absent, check_sequence, check_state};
use super::parser::{RunMode, ScenarioDefinition, ScenarioSetup};

/// Result of running a scenario
#[derive(Debug)]
pub enum TestResult {
    Pass { frames: u64 },
    Fail { error: AssertionError },
    Error { message: String },
}

/// Board built from a scenario plus the labels of its pawns
struct ScenarioBoard {
    board: Board,
    labels: HashMap<PawnId, String>,
}

impl ScenarioBoard {
    fn build(setup: &ScenarioSetup) -> Result<Self, String> {
        let mut board = Board::new(setup.board_size, setup.cell_size, Vec3::ZERO).map_err(|e| e.to_string())?;
        let mut labels = HashMap::new();

        for (i, def) in setup.pawns.iter().enumerate() {
            if !def.color.is_resolved() {
                return Err(format!("Pawn '{}' needs color black or white", def.id));
            }
            let id = PawnId(i as u32);
            let forward = match def.facing {
                Some(f) => Vec3::from_array(f),
                None if def.color == PawnColor::Black => Vec3::NEG_Z,
                None => Vec3::Z,
            };
            if labels.values().any(|l| *l == def.id) {
                return Err(format!("Duplicate pawn id '{}'", def.id));
            }
            board.insert_pawn(Pawn::new(id, def.color, Vec3::new(def.x, def.y, def.z)).with_forward(forward));
            labels.insert(id, def.id.clone());
        }
        for obstacle in &setup.obstacles {
            board.add_obstacle(Vec3::new(obstacle.x, 0.0, obstacle.z), obstacle.radius);
        }

        Ok(Self { board, labels })
    }

    fn label(&self, id: PawnId) -> String {
        self.labels.get(&id).cloned().unwrap_or_else(|| id.to_string())
    }

    /// Label of the pawn sitting at `point`, if any
    fn label_at(&self, point: Vec3) -> Option<String> {
        self.board
            .pawns()
            .iter()
            .find(|p| p.position.distance(point) < SAME_POSITION_EPSILON)
            .map(|p| self.label(p.id))
    }
}

/// Run a single scenario and return the result
pub fn run_test(test: &ScenarioDefinition) -> TestResult {
    let mut world = match ScenarioBoard::build(&test.setup) {
        Ok(w) => w,
        Err(message) => return TestResult::Error { message },
    };

    let settings = test.setup.settings.clone().unwrap_or_default();
    let color = test.setup.ai_color;
    let player = Player::new(PlayerId(0), &test.name, PlayerKind::Ai)
        .with_color(color)
        .with_ai_settings(settings.clone());

    let mut state = ScenarioState::default();
    record_scores(&world, color, &settings, &mut state);

    let seed = test.setup.seed.unwrap_or(0);
    let mut controller = AiController::new(seed);
    let mut camera = FixedCamera {
        move_secs: test.run.camera_move_secs.unwrap_or(DEFAULT_CAMERA_MOVE_SECS),
    };
    let cancel = CancelToken::new();
    let mut captured = Vec::new();

    match controller.make_move(&player, &world.board, &mut camera, cancel.clone()) {
        Ok(pawn) => {
            captured.push(CapturedEvent {
                frame: 0,
                event_type: "PawnSelected".to_string(),
                pawn: Some(world.label(pawn)),
            });
            state.set_label("outcome", "pending");
        }
        Err(e) => {
            captured.push(CapturedEvent {
                frame: 0,
                event_type: "TurnFailed".to_string(),
                pawn: None,
            });
            state.set_label("outcome", "failed");
            state.set_label("error", &e.to_string());
        }
    }
    record_plan(&world, &controller, &mut state);

    let mut frames = 0;
    if test.run.mode == RunMode::Turn && controller.is_busy() {
        frames = play_turn(test, &mut world, &mut controller, &cancel, &mut captured, &mut state);
    }

    state.set_number("impulses", world.board.pending_impulses().len() as f32);
    state.set_number(
        "aim_updates",
        captured.iter().filter(|c| c.event_type == "AimUpdated").count() as f32,
    );
    if let Some((_, impulse)) = world.board.pending_impulses().first() {
        state.set_number("impulse.length", impulse.length());
        state.set_number("impulse.y", impulse.y);
    }

    let checked = check_sequence(&test.expect.sequence, &captured)
        .and_then(|()| check_absent(&test.expect.absent, &captured))
        .and_then(|()| check_state(&test.expect.checks, &state));
    match checked {
        Ok(()) => TestResult::Pass { frames },
        Err(error) => TestResult::Fail { error },
    }
}

/// Tick the controller until the turn ends or the frame budget runs out
fn play_turn(
    test: &ScenarioDefinition,
    world: &mut ScenarioBoard,
    controller: &mut AiController,
    cancel: &CancelToken,
    captured: &mut Vec<CapturedEvent>,
    state: &mut ScenarioState,
) -> u64 {
    let dt = 1.0 / test.run.fps.max(1.0);
    let mut bus = EventBus::new();

    for frame in 1..=test.run.max_frames {
        if test.run.cancel_at_frame == Some(frame) {
            cancel.cancel();
        }
        bus.update_time(frame as f32 * dt);
        let outcome = controller.tick(dt, &mut world.board, &mut bus);

        for event in bus.drain() {
            if let TurnEvent::AimUpdated { pawn, .. } = event.event {
                captured.push(CapturedEvent {
                    frame,
                    event_type: event.event.kind().to_string(),
                    pawn: Some(world.label(pawn)),
                });
            }
        }

        let Some(outcome) = outcome else {
            continue;
        };
        let (kind, pawn, label) = match &outcome {
            TurnOutcome::Applied { pawn, .. } => ("ImpulseApplied", Some(world.label(*pawn)), "applied"),
            TurnOutcome::Cancelled => ("TurnCancelled", None, "cancelled"),
            TurnOutcome::Failed(e) => {
                state.set_label("error", &e.to_string());
                ("TurnFailed", None, "failed")
            }
        };
        captured.push(CapturedEvent {
            frame,
            event_type: kind.to_string(),
            pawn,
        });
        state.set_label("outcome", label);
        return frame;
    }

    test.run.max_frames
}

/// Score every friendly pawn so scenarios can compare positions
fn record_scores(world: &ScenarioBoard, color: PawnColor, settings: &AiSettings, state: &mut ScenarioState) {
    let friendly = world.board.pawns_on_board(color);
    let enemies = world.board.pawns_on_board(color.opponent());
    let ctx = ScoringContext::new(
        &world.board,
        &friendly,
        &enemies,
        settings,
        world.board.center_position(),
        world.board.board_size(),
    );
    for pawn in &friendly {
        if let Ok(breakdown) = ctx.score(pawn.position) {
            state.set_number(&format!("score.{}", world.label(pawn.id)), breakdown.total());
        }
    }
}

fn record_plan(world: &ScenarioBoard, controller: &AiController, state: &mut ScenarioState) {
    let Some(plan) = controller.plan() else {
        state.set_label("selected", "none");
        return;
    };
    state.set_label("selected", &world.label(plan.pawn));
    state.set_label("target", &world.label_at(plan.target).unwrap_or_else(|| "none".to_string()));
    state.set_label(
        "source",
        match plan.source {
            TargetSource::Optimal => "optimal",
            TargetSource::RandomEnemy => "random_enemy",
            TargetSource::Forward => "forward",
        },
    );
    state.set_number("direction.x", plan.optimal_direction.x);
    state.set_number("direction.y", plan.optimal_direction.y);
    state.set_number("direction.z", plan.optimal_direction.z);
    state.set_number("direction.length", plan.optimal_direction.length());
    state.set_number("force", plan.force);
    state.set_number("hits", plan.hit_count as f32);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(toml: &str) -> ScenarioDefinition {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_plan_scenario_passes() {
        let test = scenario(
            r#"
name = "Straight shot"
[setup]
[[setup.pawns]]
id = "me"
color = "white"
x = 0.0
z = 0.0
[[setup.pawns]]
id = "enemy"
color = "black"
x = 0.0
z = 3.0
[expect]
checks = ["selected = me", "target = enemy", "direction.z > 0.99", "hits = 1"]
"#,
        );
        let result = run_test(&test);
        assert!(matches!(result, TestResult::Pass { frames: 0 }), "got {:?}", result);
    }

    #[test]
    fn test_failing_check_reports_fail() {
        let test = scenario(
            r#"
name = "Wrong expectation"
[setup]
[[setup.pawns]]
id = "me"
color = "white"
x = 0.0
z = 0.0
[expect]
checks = ["selected = someone_else"]
"#,
        );
        assert!(matches!(run_test(&test), TestResult::Fail { .. }));
    }

    #[test]
    fn test_bad_setup_is_error() {
        let test = scenario(
            r#"
name = "Tiny board"
[setup]
board_size = 2
"#,
        );
        assert!(matches!(run_test(&test), TestResult::Error { .. }));
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let test = scenario(
            r#"
name = "Twins"
[setup]
[[setup.pawns]]
id = "a"
color = "white"
x = 0.0
z = 0.0
[[setup.pawns]]
id = "a"
color = "white"
x = 1.0
z = 0.0
"#,
        );
        assert!(matches!(run_test(&test), TestResult::Error { .. }));
    }

    #[test]
    fn test_no_friendly_pawn_fails_turn() {
        let test = scenario(
            r#"
name = "Nobody home"
[setup]
[[setup.pawns]]
id = "enemy"
color = "black"
x = 0.0
z = 3.0
[run]
mode = "turn"
[expect]
checks = ["outcome = failed", "impulses = 0", "selected = none"]
[[expect.sequence]]
event = "TurnFailed"
"#,
        );
        let result = run_test(&test);
        assert!(matches!(result, TestResult::Pass { .. }), "got {:?}", result);
    }
}
