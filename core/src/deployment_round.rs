//! Timed target round: the mini-game that gates every deployment.
//!
//! States: Idle → Active → (Succeeded | TimedOut).
//!
//! While active the round owns two repeating timers in the scheduler:
//! a countdown and a target spawner. Ending the round, by either
//! outcome, cancels both, clears the targets and leaves exactly one
//! `RoundReport` for the owner to collect. Once ended, clicks and
//! stale timer firings change nothing.

use crate::{
    error::{GameError, GameResult},
    rng::RandomSource,
    scheduler::{Scheduler, TimerHandle, TimerTask},
    service::Service,
    transcript::Transcript,
    types::{Millis, TargetId},
};
use serde::{Deserialize, Serialize};

pub const BASE_REQUIRED_HITS: f64 = 10.0;
pub const MIN_REQUIRED_HITS: u32 = 8;
pub const MAX_DIFFICULTY: f64 = 5.0;
pub const DIFFICULTY_STEP: f64 = 0.5;
/// Probability that a spawned target shows the service being deployed.
pub const CORRECT_TARGET_CHANCE: f64 = 0.6;
/// Seconds left at which the front end should warn the player.
pub const LOW_TIME_SECS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundState {
    Idle,
    Active,
    Succeeded,
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id:      TargetId,
    pub service: Service,
    pub correct: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickResult {
    Hit { score: u32, required: u32 },
    Miss { clicked: Service },
    /// No active round, or the target no longer exists.
    Ignored,
}

/// The single outcome of a round, handed to the owner once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    pub success: bool,
    pub service: Service,
}

pub struct DeploymentRound {
    state:          RoundState,
    service:        Option<Service>,
    score:          u32,
    required:       u32,
    time_left:      u32,
    difficulty:     f64,
    targets:        Vec<Target>,
    next_target_id: TargetId,
    countdown:      Option<TimerHandle>,
    spawner:        Option<TimerHandle>,
    report:         Option<RoundReport>,
    countdown_interval: Millis,
    spawn_interval:     Millis,
    rng:            Box<dyn RandomSource>,
}

impl DeploymentRound {
    pub fn new(rng: Box<dyn RandomSource>, countdown_interval: Millis, spawn_interval: Millis) -> Self {
        Self {
            state: RoundState::Idle,
            service: None,
            score: 0,
            required: required_hits(1.0),
            time_left: 0,
            difficulty: 1.0,
            targets: Vec::new(),
            next_target_id: 0,
            countdown: None,
            spawner: None,
            report: None,
            countdown_interval,
            spawn_interval,
            rng,
        }
    }

    /// Begin a round for `service` lasting `duration_secs`.
    pub fn start(
        &mut self,
        service: Service,
        duration_secs: u32,
        now: Millis,
        scheduler: &mut Scheduler,
        out: &mut Transcript,
    ) -> GameResult<()> {
        if self.is_active() {
            return Err(GameError::Busy { action: "a deployment", activity: "another deployment" });
        }

        self.state = RoundState::Active;
        self.service = Some(service);
        self.score = 0;
        self.time_left = duration_secs;
        self.required = required_hits(self.difficulty);
        self.targets.clear();
        self.report = None;

        out.say(format!("Initiating deployment of {service}..."));
        out.say(format!("Target: Click {service} icons to progress"));
        out.say(format!("Required progress: {} successful hits", self.required));
        out.say(format!("Time limit: {} seconds", self.time_left));
        out.say("Avoid clicking wrong service icons!");

        self.countdown =
            Some(scheduler.schedule_repeating(now, self.countdown_interval, TimerTask::RoundCountdown));
        self.spawner =
            Some(scheduler.schedule_repeating(now, self.spawn_interval, TimerTask::RoundSpawn));
        self.spawn_targets();

        log::debug!(
            "round: started {service} required={} difficulty={:.1} secs={duration_secs}",
            self.required,
            self.difficulty
        );
        Ok(())
    }

    /// One countdown step. Ends the round with a timeout at zero.
    pub fn on_countdown(&mut self, scheduler: &mut Scheduler, out: &mut Transcript) {
        if !self.is_active() {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.end(false, scheduler, out);
        }
    }

    /// Replace the on-screen targets with a fresh batch.
    pub fn on_spawn(&mut self) {
        if self.is_active() {
            self.spawn_targets();
        }
    }

    pub fn click(
        &mut self,
        target_id: TargetId,
        scheduler: &mut Scheduler,
        out: &mut Transcript,
    ) -> ClickResult {
        if !self.is_active() {
            return ClickResult::Ignored;
        }
        let Some(pos) = self.targets.iter().position(|t| t.id == target_id) else {
            return ClickResult::Ignored;
        };
        let target = self.targets.remove(pos);

        if !target.correct {
            if let Some(service) = self.service {
                out.say(format!("✗ Wrong service! Focus on {service} icons"));
            }
            return ClickResult::Miss { clicked: target.service };
        }

        self.score += 1;
        out.say(format!("✓ Correct! Progress: {}/{}", self.score, self.required));
        let result = ClickResult::Hit { score: self.score, required: self.required };
        if self.score >= self.required {
            self.end(true, scheduler, out);
        }
        result
    }

    /// Collect the outcome of a finished round. Returns `Some` exactly
    /// once per round.
    pub fn take_report(&mut self) -> Option<RoundReport> {
        self.report.take()
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == RoundState::Active
    }

    pub fn service(&self) -> Option<Service> {
        self.service
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn required(&self) -> u32 {
        self.required
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_low_on_time(&self) -> bool {
        self.is_active() && self.time_left <= LOW_TIME_SECS
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Fraction of the required hits achieved, in [0, 1].
    pub fn progress(&self) -> f64 {
        (self.score as f64 / self.required as f64).min(1.0)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// First target showing the service being deployed, if any.
    pub fn correct_target(&self) -> Option<TargetId> {
        self.targets.iter().find(|t| t.correct).map(|t| t.id)
    }

    fn spawn_targets(&mut self) {
        let Some(service) = self.service else { return };
        self.targets.clear();

        let count = 4 + self.rng.pick_index(3);
        for _ in 0..count {
            let (shown, correct) = if self.rng.chance(CORRECT_TARGET_CHANCE) {
                (service, true)
            } else {
                let others: Vec<Service> =
                    Service::ALL.into_iter().filter(|s| *s != service).collect();
                (others[self.rng.pick_index(others.len())], false)
            };
            self.next_target_id += 1;
            self.targets.push(Target { id: self.next_target_id, service: shown, correct });
        }
    }

    fn end(&mut self, success: bool, scheduler: &mut Scheduler, out: &mut Transcript) {
        self.state = if success { RoundState::Succeeded } else { RoundState::TimedOut };
        if let Some(handle) = self.countdown.take() {
            scheduler.cancel(handle);
        }
        if let Some(handle) = self.spawner.take() {
            scheduler.cancel(handle);
        }
        self.targets.clear();

        let Some(service) = self.service else { return };
        if success {
            out.say("✓ DEPLOYMENT SUCCESSFUL!");
            out.say(format!("{service} service is now online"));
            self.difficulty = (self.difficulty + DIFFICULTY_STEP).min(MAX_DIFFICULTY);
        } else {
            out.say("✗ Deployment failed - time expired");
            out.say("Try again with better focus");
        }
        log::debug!("round: {service} ended success={success} score={}", self.score);
        self.report = Some(RoundReport { success, service });
    }
}

/// Hits needed at a given difficulty: max(8, ⌈10 − difficulty⌉).
pub fn required_hits(difficulty: f64) -> u32 {
    ((BASE_REQUIRED_HITS - difficulty).ceil() as u32).max(MIN_REQUIRED_HITS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ScriptedRng;

    fn round_with(rolls: Vec<f64>) -> DeploymentRound {
        DeploymentRound::new(Box::new(ScriptedRng::new(rolls)), 1000, 2000)
    }

    #[test]
    fn required_hits_tracks_difficulty() {
        assert_eq!(required_hits(1.0), 9);
        assert_eq!(required_hits(1.5), 9);
        assert_eq!(required_hits(2.0), 8);
        assert_eq!(required_hits(5.0), 8);
    }

    #[test]
    fn low_rolls_spawn_only_correct_targets() {
        let mut round = round_with(vec![0.0]);
        let mut sched = Scheduler::new();
        let mut out = Transcript::new();
        round.start(Service::S3, 45, 0, &mut sched, &mut out).unwrap();

        assert_eq!(round.targets().len(), 4);
        assert!(round.targets().iter().all(|t| t.correct && t.service == Service::S3));
    }

    #[test]
    fn high_rolls_spawn_only_decoys() {
        let mut round = round_with(vec![0.99]);
        let mut sched = Scheduler::new();
        let mut out = Transcript::new();
        round.start(Service::S3, 45, 0, &mut sched, &mut out).unwrap();

        assert_eq!(round.targets().len(), 6);
        assert!(round.targets().iter().all(|t| !t.correct && t.service != Service::S3));
    }

    #[test]
    fn reaching_required_hits_ends_immediately() {
        let mut round = round_with(vec![0.0]);
        let mut sched = Scheduler::new();
        let mut out = Transcript::new();
        round.start(Service::Lambda, 45, 0, &mut sched, &mut out).unwrap();
        assert_eq!(sched.pending_count(), 2);

        while round.is_active() {
            if round.correct_target().is_none() {
                round.on_spawn();
            }
            let id = round.correct_target().unwrap();
            round.click(id, &mut sched, &mut out);
        }

        assert_eq!(round.state(), RoundState::Succeeded);
        assert_eq!(round.score(), 9);
        assert_eq!(sched.pending_count(), 0, "timers must be cancelled");
        assert!(round.targets().is_empty());
        assert_eq!(round.difficulty(), 1.5);
        assert_eq!(
            round.take_report(),
            Some(RoundReport { success: true, service: Service::Lambda })
        );
        assert_eq!(round.take_report(), None, "report is delivered once");
    }

    #[test]
    fn countdown_to_zero_times_out() {
        let mut round = round_with(vec![0.99]);
        let mut sched = Scheduler::new();
        let mut out = Transcript::new();
        round.start(Service::Ec2, 3, 0, &mut sched, &mut out).unwrap();

        round.on_countdown(&mut sched, &mut out);
        round.on_countdown(&mut sched, &mut out);
        assert!(round.is_active());
        round.on_countdown(&mut sched, &mut out);

        assert_eq!(round.state(), RoundState::TimedOut);
        assert_eq!(round.difficulty(), 1.0, "failure leaves difficulty alone");
        assert_eq!(sched.pending_count(), 0);
        assert_eq!(
            round.take_report(),
            Some(RoundReport { success: false, service: Service::Ec2 })
        );
    }

    #[test]
    fn ended_round_is_inert() {
        let mut round = round_with(vec![0.99]);
        let mut sched = Scheduler::new();
        let mut out = Transcript::new();
        round.start(Service::Ec2, 1, 0, &mut sched, &mut out).unwrap();
        round.on_countdown(&mut sched, &mut out);
        round.take_report();

        round.on_countdown(&mut sched, &mut out);
        round.on_spawn();
        assert_eq!(round.click(1, &mut sched, &mut out), ClickResult::Ignored);
        assert_eq!(round.time_left(), 0);
        assert_eq!(round.score(), 0);
        assert!(round.targets().is_empty());
        assert_eq!(round.take_report(), None);
    }

    #[test]
    fn wrong_click_has_no_penalty() {
        let mut round = round_with(vec![0.99]);
        let mut sched = Scheduler::new();
        let mut out = Transcript::new();
        round.start(Service::Sqs, 45, 0, &mut sched, &mut out).unwrap();

        let decoy = round.targets()[0].id;
        let result = round.click(decoy, &mut sched, &mut out);
        assert!(matches!(result, ClickResult::Miss { .. }));
        assert_eq!(round.score(), 0);
        assert!(out.contains("Wrong service"));
    }

    #[test]
    fn difficulty_caps_at_five() {
        let mut round = round_with(vec![0.0]);
        let mut sched = Scheduler::new();
        let mut out = Transcript::new();
        for _ in 0..12 {
            round.start(Service::S3, 45, 0, &mut sched, &mut out).unwrap();
            while round.is_active() {
                if round.correct_target().is_none() {
                    round.on_spawn();
                }
                let id = round.correct_target().unwrap();
                round.click(id, &mut sched, &mut out);
            }
            round.take_report();
        }
        assert_eq!(round.difficulty(), MAX_DIFFICULTY);
        assert_eq!(round.required(), MIN_REQUIRED_HITS);
    }
}
