//! Aim simulation - the visible "wobble" before an AI shot
//!
//! Frame-driven state machine: `start()` sets up the oscillation phases and
//! `tick(dt)` advances one frame. Every tick is a suspension point that checks
//! the turn's cancel token before touching the visual callback.
//!
//! Idle -> Oscillating(0..k) -> Locking -> Done, Cancelled from any running phase.

use bevy::prelude::*;
use rand::Rng;

use super::{AimVisual, TargetSource};
use crate::board::PawnId;
use crate::constants::*;
use crate::game::CancelToken;
use crate::helpers::{ease_in_out_quad, horizontal_unit, perturb_horizontal};

/// A shot decided before the animation starts. Force is computed once per plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimPlan {
    pub pawn: PawnId,
    pub origin: Vec3,
    /// Unit horizontal direction the aim settles on
    pub optimal_direction: Vec3,
    pub target: Vec3,
    pub hit_count: usize,
    pub force: f32,
    pub source: TargetSource,
}

/// The committed shot
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AimShot {
    pub pawn: PawnId,
    pub direction: Vec3,
    pub force: f32,
}

impl AimShot {
    pub fn impulse(&self) -> Vec3 {
        self.direction * self.force
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AimPhase {
    Idle,
    Oscillating(usize),
    Locking,
    Done,
    Cancelled,
    Faulted,
}

/// Result of one tick
#[derive(Clone, Debug, PartialEq)]
pub enum AimProgress {
    /// Nothing to animate
    Idle,
    Running,
    Finished(AimShot),
    Cancelled,
    /// The animation produced unusable values; the plan is still valid
    Faulted(String),
}

/// Eased direction tween, renormalized on the board plane
#[derive(Clone, Copy, Debug)]
struct DirectionTween {
    from: Vec3,
    to: Vec3,
    duration: f32,
    elapsed: f32,
}

impl DirectionTween {
    fn new(from: Vec3, to: Vec3, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
        }
    }

    /// Returns true once the tween has reached its end
    fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        self.elapsed >= self.duration
    }

    fn value(&self) -> Vec3 {
        let t = if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        };
        let mixed = self.from.lerp(self.to, ease_in_out_quad(t));
        horizontal_unit(mixed).unwrap_or(self.to)
    }
}

/// One AI's aiming animation. Only one plan is animated at a time.
#[derive(Debug)]
pub struct AimSimulator {
    plan: Option<AimPlan>,
    phase: AimPhase,
    oscillations: usize,
    phase_secs: f32,
    tween: Option<DirectionTween>,
    current: Vec3,
}

impl Default for AimSimulator {
    fn default() -> Self {
        Self {
            plan: None,
            phase: AimPhase::Idle,
            oscillations: 0,
            phase_secs: 0.0,
            tween: None,
            current: Vec3::Z,
        }
    }
}

impl AimSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> AimPhase {
        self.phase
    }

    pub fn plan(&self) -> Option<&AimPlan> {
        self.plan.as_ref()
    }

    pub fn oscillation_count(&self) -> usize {
        self.oscillations
    }

    pub fn phase_secs(&self) -> f32 {
        self.phase_secs
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, AimPhase::Oscillating(_) | AimPhase::Locking)
    }

    /// Begin animating `plan` over `aiming_secs`, the final lock included.
    /// Any animation already running is killed first.
    pub fn start(&mut self, plan: AimPlan, aiming_secs: f32, rng: &mut impl Rng, visual: &mut dyn AimVisual) {
        if self.is_active() {
            debug!("Killing in-flight aim before starting a new one");
            self.kill();
        }

        let optimal = plan.optimal_direction;
        let initial = perturb_horizontal(optimal, INITIAL_AIM_DEVIATION, rng);
        self.oscillations = rng.gen_range(OSCILLATION_COUNT_MIN..OSCILLATION_COUNT_MAX);
        self.phase_secs = (aiming_secs - FINAL_LOCK_SECS).max(0.0) / self.oscillations as f32;
        self.current = initial;
        self.tween = Some(DirectionTween::new(
            initial,
            perturb_horizontal(optimal, OSCILLATION_DEVIATION, rng),
            self.phase_secs,
        ));
        self.phase = AimPhase::Oscillating(0);

        debug!(
            "Aim for {}: {} oscillations of {:.2}s",
            plan.pawn, self.oscillations, self.phase_secs
        );
        visual.update_aim(plan.pawn, plan.force, initial);
        self.plan = Some(plan);
    }

    /// Stop the animation without committing anything
    pub fn kill(&mut self) {
        self.tween = None;
        if self.is_active() {
            self.phase = AimPhase::Cancelled;
        }
    }

    /// Advance one frame
    pub fn tick(
        &mut self,
        dt: f32,
        rng: &mut impl Rng,
        cancel: &CancelToken,
        visual: &mut dyn AimVisual,
    ) -> AimProgress {
        match self.phase {
            AimPhase::Idle | AimPhase::Done | AimPhase::Faulted => return AimProgress::Idle,
            AimPhase::Cancelled => return AimProgress::Cancelled,
            AimPhase::Oscillating(_) | AimPhase::Locking => {}
        }
        if cancel.is_cancelled() {
            self.kill();
            return AimProgress::Cancelled;
        }
        if !dt.is_finite() || dt < 0.0 {
            return self.fault(&format!("bad frame time {}", dt));
        }
        let Some(plan) = self.plan else {
            return self.fault("aim running without a plan");
        };
        let step = self.tween.as_mut().map(|tween| {
            let finished = tween.advance(dt);
            (finished, tween.value())
        });
        let Some((finished, value)) = step else {
            return self.fault("aim running without a tween");
        };
        if !value.is_finite() {
            return self.fault("non-finite aim direction");
        }
        self.current = value;

        if !finished {
            visual.update_aim(plan.pawn, plan.force, self.current);
            return AimProgress::Running;
        }

        match self.phase {
            AimPhase::Oscillating(index) if index + 1 < self.oscillations => {
                visual.update_aim(plan.pawn, plan.force, self.current);
                let target = perturb_horizontal(plan.optimal_direction, OSCILLATION_DEVIATION, rng);
                self.tween = Some(DirectionTween::new(self.current, target, self.phase_secs));
                self.phase = AimPhase::Oscillating(index + 1);
                AimProgress::Running
            }
            AimPhase::Oscillating(_) => {
                visual.update_aim(plan.pawn, plan.force, self.current);
                self.tween = Some(DirectionTween::new(
                    self.current,
                    plan.optimal_direction,
                    FINAL_LOCK_SECS,
                ));
                self.phase = AimPhase::Locking;
                debug!("Aim for {} locking", plan.pawn);
                AimProgress::Running
            }
            _ => {
                self.tween = None;
                self.current = plan.optimal_direction;
                self.phase = AimPhase::Done;
                visual.update_aim(plan.pawn, plan.force, plan.optimal_direction);
                AimProgress::Finished(AimShot {
                    pawn: plan.pawn,
                    direction: plan.optimal_direction,
                    force: plan.force,
                })
            }
        }
    }

    fn fault(&mut self, reason: &str) -> AimProgress {
        warn!("Aim simulation fault: {}", reason);
        self.tween = None;
        self.phase = AimPhase::Faulted;
        AimProgress::Faulted(reason.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::RecordingVisual;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const FRAME: f32 = 1.0 / 60.0;

    fn plan(pawn: u32) -> AimPlan {
        AimPlan {
            pawn: PawnId(pawn),
            origin: Vec3::ZERO,
            optimal_direction: Vec3::Z,
            target: Vec3::new(0.0, 0.0, 3.0),
            hit_count: 1,
            force: 120.0,
            source: TargetSource::Optimal,
        }
    }

    fn run_to_end(
        sim: &mut AimSimulator,
        rng: &mut StdRng,
        cancel: &CancelToken,
        visual: &mut RecordingVisual,
    ) -> (AimProgress, usize) {
        for frame in 1..10_000 {
            let progress = sim.tick(FRAME, rng, cancel, visual);
            if progress != AimProgress::Running {
                return (progress, frame);
            }
        }
        panic!("aim never finished");
    }

    #[test]
    fn test_full_aim_locks_onto_optimal() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut sim = AimSimulator::new();
        let mut visual = RecordingVisual::default();
        let cancel = CancelToken::new();

        sim.start(plan(3), 2.0, &mut rng, &mut visual);
        let count = sim.oscillation_count();
        assert!((OSCILLATION_COUNT_MIN..OSCILLATION_COUNT_MAX).contains(&count));

        let (progress, frames) = run_to_end(&mut sim, &mut rng, &cancel, &mut visual);
        let AimProgress::Finished(shot) = progress else {
            panic!("expected a finished shot, got {:?}", progress);
        };
        assert_eq!(shot.direction, Vec3::Z);
        assert_eq!(shot.force, 120.0);
        assert_eq!(sim.phase(), AimPhase::Done);

        // About two seconds of frames, plus at most one carried frame per phase
        let elapsed = frames as f32 * FRAME;
        assert!(elapsed >= 2.0 - FRAME && elapsed <= 2.0 + (count as f32 + 2.0) * FRAME, "elapsed {}", elapsed);

        // A visual update every frame, all flat and unit length, ending on the exact optimal
        assert!(visual.updates.len() >= frames);
        for (pawn, force, dir) in &visual.updates {
            assert_eq!(*pawn, PawnId(3));
            assert_eq!(*force, 120.0);
            assert_eq!(dir.y, 0.0);
            assert!((dir.length() - 1.0).abs() < 1e-4);
        }
        assert_eq!(visual.updates.last().map(|u| u.2), Some(Vec3::Z));
    }

    #[test]
    fn test_initial_direction_deviates_within_bounds() {
        let mut rng = StdRng::seed_from_u64(2);
        for _ in 0..50 {
            let mut sim = AimSimulator::new();
            let mut visual = RecordingVisual::default();
            sim.start(plan(0), 2.0, &mut rng, &mut visual);
            let first = visual.updates[0].2;
            // 0.5 perturbation keeps the start in the forward half-plane
            assert!(first.z > 0.0, "start {:?}", first);
        }
    }

    #[test]
    fn test_cancel_stops_callbacks() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut sim = AimSimulator::new();
        let mut visual = RecordingVisual::default();
        let cancel = CancelToken::new();

        sim.start(plan(1), 2.0, &mut rng, &mut visual);
        for _ in 0..30 {
            sim.tick(FRAME, &mut rng, &cancel, &mut visual);
        }
        let before = visual.updates.len();
        cancel.cancel();

        assert_eq!(sim.tick(FRAME, &mut rng, &cancel, &mut visual), AimProgress::Cancelled);
        assert_eq!(sim.tick(FRAME, &mut rng, &cancel, &mut visual), AimProgress::Cancelled);
        assert_eq!(visual.updates.len(), before, "no updates after cancellation");
        assert_eq!(sim.phase(), AimPhase::Cancelled);
        assert!(!sim.is_active());
    }

    #[test]
    fn test_restart_kills_previous_aim() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut sim = AimSimulator::new();
        let mut visual = RecordingVisual::default();
        let cancel = CancelToken::new();

        sim.start(plan(1), 2.0, &mut rng, &mut visual);
        sim.tick(FRAME, &mut rng, &cancel, &mut visual);
        sim.start(plan(2), 2.0, &mut rng, &mut visual);
        visual.updates.clear();

        let (progress, _) = run_to_end(&mut sim, &mut rng, &cancel, &mut visual);
        assert!(matches!(progress, AimProgress::Finished(shot) if shot.pawn == PawnId(2)));
        assert!(visual.updates.iter().all(|u| u.0 == PawnId(2)));
    }

    #[test]
    fn test_short_budget_still_locks() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = AimSimulator::new();
        let mut visual = RecordingVisual::default();
        sim.start(plan(0), 0.2, &mut rng, &mut visual);
        assert_eq!(sim.phase_secs(), 0.0);
        let (progress, _) = run_to_end(&mut sim, &mut rng, &CancelToken::new(), &mut visual);
        assert!(matches!(progress, AimProgress::Finished(_)));
    }

    #[test]
    fn test_bad_frame_time_faults() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = AimSimulator::new();
        let mut visual = RecordingVisual::default();
        sim.start(plan(0), 2.0, &mut rng, &mut visual);
        let progress = sim.tick(f32::NAN, &mut rng, &CancelToken::new(), &mut visual);
        assert!(matches!(progress, AimProgress::Faulted(_)));
        assert_eq!(sim.phase(), AimPhase::Faulted);
    }

    #[test]
    fn test_idle_tick_does_nothing() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut sim = AimSimulator::new();
        let mut visual = RecordingVisual::default();
        assert_eq!(sim.tick(FRAME, &mut rng, &CancelToken::new(), &mut visual), AimProgress::Idle);
        assert!(visual.updates.is_empty());
    }
}
