//! AI turn controller
//!
//! `make_move` runs the synchronous part of a turn: validate the player,
//! snapshot pawns, pick the pawn and plan its shot. `tick` then walks the
//! suspension points one frame at a time:
//!
//! Thinking (decision delay) -> CameraSettle -> Aiming -> impulse applied
//!
//! The turn's `CancelToken` is checked on every tick before anything else.
//! A cancelled turn never applies an impulse.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    AimPlan, AimProgress, AimShot, AimSimulator, AimVisual, AiSettings, ScoringContext,
    calculate_force, calculate_optimal_direction, select_optimal_pawn,
};
use crate::board::{BoardProvider, ImpulseSink, Pawn, PawnId, PhysicsQuery};
use crate::constants::DEFAULT_CAMERA_MOVE_SECS;
use crate::error::{AiError, Result};
use crate::game::CancelToken;
use crate::player::Player;

/// Camera collaborator: follows the selected pawn and reports how long the move takes
pub trait CameraRig {
    fn move_duration_secs(&self) -> f32;
    fn follow(&mut self, _pawn: PawnId) {}
}

/// Camera with a constant move duration
#[derive(Clone, Copy, Debug)]
pub struct FixedCamera {
    pub move_secs: f32,
}

impl Default for FixedCamera {
    fn default() -> Self {
        Self {
            move_secs: DEFAULT_CAMERA_MOVE_SECS,
        }
    }
}

impl CameraRig for FixedCamera {
    fn move_duration_secs(&self) -> f32 {
        self.move_secs
    }
}

/// Where a live turn is waiting
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TurnStep {
    Thinking { remaining: f32 },
    CameraSettle { remaining: f32 },
    Aiming,
}

/// How a turn ended
#[derive(Clone, Debug, PartialEq)]
pub enum TurnOutcome {
    Applied { pawn: PawnId, impulse: Vec3 },
    Cancelled,
    Failed(AiError),
}

#[derive(Debug)]
struct ActiveTurn {
    plan: AimPlan,
    settings: AiSettings,
    step: TurnStep,
    camera_wait: f32,
    cancel: CancelToken,
}

/// Direction and force for `shooter`, computed once and threaded into the plan
#[allow(clippy::too_many_arguments)]
pub fn plan_shot<P: PhysicsQuery + ?Sized>(
    physics: &P,
    shooter: &Pawn,
    friendly: &[Pawn],
    enemies: &[Pawn],
    board_size: f32,
    settings: &AiSettings,
    rng: &mut StdRng,
) -> AimPlan {
    let solution =
        calculate_optimal_direction(physics, shooter, friendly, enemies, board_size, settings, rng);
    let force = calculate_force(shooter, solution.target, solution.hit_count, board_size, rng);
    AimPlan {
        pawn: shooter.id,
        origin: shooter.position,
        optimal_direction: solution.direction,
        target: solution.target,
        hit_count: solution.hit_count,
        force,
        source: solution.source,
    }
}

fn planned_shot(plan: &AimPlan) -> AimShot {
    AimShot {
        pawn: plan.pawn,
        direction: plan.optimal_direction,
        force: plan.force,
    }
}

/// One AI seat's turn driver. Owns its RNG so a seed reproduces a game.
#[derive(Debug)]
pub struct AiController {
    rng: StdRng,
    aim: AimSimulator,
    turn: Option<ActiveTurn>,
}

impl AiController {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            aim: AimSimulator::new(),
            turn: None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.turn.is_some()
    }

    /// Pawn currently aiming, if a turn is live
    pub fn selected_pawn(&self) -> Option<PawnId> {
        self.turn.as_ref().map(|t| t.plan.pawn)
    }

    pub fn plan(&self) -> Option<&AimPlan> {
        self.turn.as_ref().map(|t| &t.plan)
    }

    pub fn step(&self) -> Option<TurnStep> {
        self.turn.as_ref().map(|t| t.step)
    }

    pub fn aim(&self) -> &AimSimulator {
        &self.aim
    }

    /// Drop any live turn and its animation without applying anything
    pub fn abort(&mut self) {
        self.aim.kill();
        self.turn = None;
    }

    /// Start a turn for `player`. On success the selected pawn is returned and
    /// the camera has been told to follow it; drive the rest with `tick`.
    pub fn make_move<W: BoardProvider + PhysicsQuery + ?Sized>(
        &mut self,
        player: &Player,
        world: &W,
        camera: &mut dyn CameraRig,
        cancel: CancelToken,
    ) -> Result<PawnId> {
        if self.turn.is_some() {
            warn!("New AI turn for {} while another is live, killing it", player.name);
            self.abort();
        }

        let color = player.color();
        if !color.is_resolved() {
            error!("AI player '{}' has no resolved color", player.name);
            return Err(AiError::UnresolvedColor {
                player: player.name.clone(),
            });
        }

        let friendly = world.pawns_on_board(color);
        let enemies = world.pawns_on_board(color.opponent());
        let settings = player.ai_settings.clone().unwrap_or_default();
        settings.validate().inspect_err(|e| error!("{}: {}", player.name, e))?;

        let board_size = world.board_size();
        let ctx = ScoringContext::new(
            world,
            &friendly,
            &enemies,
            &settings,
            world.center_position(),
            board_size,
        );
        let Some(choice) = select_optimal_pawn(&ctx, &friendly)? else {
            error!("No movable {} pawn for '{}'", color, player.name);
            return Err(AiError::NoSelectablePawn { color });
        };

        let plan = plan_shot(
            world,
            &choice.pawn,
            &friendly,
            &enemies,
            board_size,
            &settings,
            &mut self.rng,
        );

        camera.follow(plan.pawn);
        let thinking = settings.sample_decision_delay_secs(&mut self.rng);
        let camera_wait = camera.move_duration_secs().max(0.0) + settings.camera_settle_buffer_secs();
        info!(
            "{} selected {} (score {:.2}), aiming {:?} at {:.0} force, {} predicted hits",
            player.name,
            plan.pawn,
            choice.score(),
            plan.optimal_direction,
            plan.force,
            plan.hit_count
        );

        self.turn = Some(ActiveTurn {
            plan,
            settings,
            step: TurnStep::Thinking { remaining: thinking },
            camera_wait,
            cancel,
        });
        Ok(plan.pawn)
    }

    /// Advance the live turn by one frame. Returns the outcome once the turn ends.
    pub fn tick<S: ImpulseSink + ?Sized>(
        &mut self,
        dt: f32,
        sink: &mut S,
        visual: &mut dyn AimVisual,
    ) -> Option<TurnOutcome> {
        let turn = self.turn.as_mut()?;

        if turn.cancel.is_cancelled() {
            let pawn = turn.plan.pawn;
            info!("AI turn for {} cancelled", pawn);
            self.abort();
            visual.clear_aim(pawn);
            return Some(TurnOutcome::Cancelled);
        }

        match turn.step {
            TurnStep::Thinking { remaining } => {
                let remaining = remaining - dt;
                turn.step = if remaining > 0.0 {
                    TurnStep::Thinking { remaining }
                } else {
                    TurnStep::CameraSettle {
                        remaining: turn.camera_wait,
                    }
                };
                None
            }
            TurnStep::CameraSettle { remaining } => {
                let remaining = remaining - dt;
                if remaining > 0.0 {
                    turn.step = TurnStep::CameraSettle { remaining };
                } else {
                    turn.step = TurnStep::Aiming;
                    let aiming_secs = turn.settings.aiming_secs();
                    self.aim.start(turn.plan, aiming_secs, &mut self.rng, visual);
                }
                None
            }
            TurnStep::Aiming => {
                let cancel = turn.cancel.clone();
                let plan = turn.plan;
                match self.aim.tick(dt, &mut self.rng, &cancel, visual) {
                    AimProgress::Running => None,
                    AimProgress::Finished(shot) => Some(self.commit(shot, sink, visual)),
                    AimProgress::Cancelled => {
                        self.abort();
                        visual.clear_aim(plan.pawn);
                        Some(TurnOutcome::Cancelled)
                    }
                    AimProgress::Faulted(reason) => {
                        warn!("Aim for {} faulted ({}), shooting the planned line", plan.pawn, reason);
                        Some(self.commit(planned_shot(&plan), sink, visual))
                    }
                    AimProgress::Idle => {
                        warn!("Aim for {} ended without a shot, shooting the planned line", plan.pawn);
                        Some(self.commit(planned_shot(&plan), sink, visual))
                    }
                }
            }
        }
    }

    fn commit<S: ImpulseSink + ?Sized>(
        &mut self,
        shot: AimShot,
        sink: &mut S,
        visual: &mut dyn AimVisual,
    ) -> TurnOutcome {
        self.turn = None;
        visual.clear_aim(shot.pawn);
        let impulse = shot.impulse();
        match sink.apply_impulse(shot.pawn, impulse) {
            Ok(()) => {
                info!("Impulse {:?} applied to {}", impulse, shot.pawn);
                TurnOutcome::Applied {
                    pawn: shot.pawn,
                    impulse,
                }
            }
            Err(e) => {
                error!("Could not apply impulse to {}: {}", shot.pawn, e);
                TurnOutcome::Failed(e)
            }
        }
    }
}
