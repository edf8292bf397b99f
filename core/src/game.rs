//! The game controller: the heart of Quantum Drift.
//!
//! `Game` owns the player, the session phase and every component. UI
//! events come in as method calls; components hand their results back
//! as return values (`RoundReport`, `RegionSelection`, `QuizVerdict`)
//! rather than calling into the controller.
//!
//! RULES:
//!   - Every mutation is announced as a `GameEvent` and persisted.
//!   - All randomness flows through per-component `RandomSource`s.
//!   - All delays are scheduler timers, pumped by `advance()`.
//!   - A rejected operation reports one transcript line, returns the
//!     error and leaves state untouched.

use crate::{
    clock::GameClock,
    config::GameConfig,
    deployment_round::{ClickResult, DeploymentRound, RoundReport},
    error::{GameError, GameResult},
    event::{EventLogEntry, GameEvent},
    interpreter::{CliInterpreter, CliOutcome, CliReply},
    player::Player,
    quiz::{QuestionBank, QuizSystem, QuizVerdict},
    region_map::{RegionMap, RegionSelection},
    registry::MockProvider,
    rng::{RandomSource, RngBank, StreamSlot},
    scheduler::{Scheduler, TimerTask},
    snapshot::GameSnapshot,
    store::GameStore,
    transcript::Transcript,
    types::{Millis, SessionId, TargetId},
};
use serde::{Deserialize, Serialize};

/// Coarse mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Start,
    World,
    Hacking,
    Complete,
}

pub const CLUES: [&str; 5] = [
    "Found encrypted log files with quantum signatures.",
    "Unusual API call patterns detected in CloudTrail.",
    "Anomalous network traffic to unknown endpoints.",
    "Suspicious IAM role modifications in audit logs.",
    "Quantum algorithm traces in Lambda execution logs.",
];

pub const REGION_EVENTS: [&str; 5] = [
    "Security alert: Unusual access patterns detected.",
    "Performance warning: High latency in current region.",
    "Cost optimization opportunity identified.",
    "New AWS service announcement in this region.",
    "Compliance audit scheduled for this region.",
];

const CRITICAL_CLUE: &str = "This region contains evidence of Dr. ███████'s presence!";

pub struct Game {
    pub session_id: SessionId,
    pub clock:      GameClock,
    seed:           u64,
    config:         GameConfig,
    phase:          Phase,
    player:         Player,
    aws:            MockProvider,
    cli:            CliInterpreter,
    round:          DeploymentRound,
    map:            RegionMap,
    quiz:           QuizSystem,
    scheduler:      Scheduler,
    transcript:     Transcript,
    events:         Vec<GameEvent>,
    store:          GameStore,
    rng:            Box<dyn RandomSource>,
}

impl Game {
    /// Build a fully wired session. The store must already be migrated
    /// and hold a session row for `session_id`.
    pub fn build(
        session_id: SessionId,
        seed: u64,
        config: GameConfig,
        questions: QuestionBank,
        store: GameStore,
    ) -> GameResult<Self> {
        let bank = RngBank::new(seed);
        let map = RegionMap::new(&mut bank.for_slot(StreamSlot::RegionMap));
        let aws = MockProvider::new(
            &config.account_id,
            &config.default_region,
            bank.boxed(StreamSlot::Registry),
        );
        let round = DeploymentRound::new(
            bank.boxed(StreamSlot::Deployment),
            config.countdown_interval_ms,
            config.spawn_interval_ms,
        );
        let quiz = QuizSystem::new(questions, bank.boxed(StreamSlot::Quiz));

        let mut game = Self {
            clock: GameClock::new(session_id.clone()),
            session_id: session_id.clone(),
            seed,
            player: Player::new(&config),
            phase: Phase::Start,
            aws,
            cli: CliInterpreter::new(),
            round,
            map,
            quiz,
            scheduler: Scheduler::new(),
            transcript: Transcript::new(),
            events: Vec::new(),
            store,
            rng: bank.boxed(StreamSlot::Controller),
            config,
        };
        game.emit(GameEvent::SessionStarted { session_id, seed })?;
        log::info!("Quantum Drift session {} initialized (seed {seed})", game.session_id);
        Ok(game)
    }

    /// In-memory session with default rules and the built-in question.
    pub fn build_test(session_id: &str, seed: u64) -> GameResult<Self> {
        Self::build_test_with(session_id, seed, GameConfig::default(), QuestionBank::fallback())
    }

    /// In-memory session with custom rules and questions.
    pub fn build_test_with(
        session_id: &str,
        seed: u64,
        config: GameConfig,
        questions: QuestionBank,
    ) -> GameResult<Self> {
        let store = GameStore::in_memory()?;
        store.migrate()?;
        store.insert_session(session_id, seed, "0.1.0-test")?;
        Self::build(session_id.to_string(), seed, config, questions, store)
    }

    // ── Session flow ───────────────────────────────────────────

    pub fn start_game(&mut self) -> GameResult<()> {
        if self.phase != Phase::Start {
            return Ok(());
        }
        self.set_phase(Phase::World)?;
        self.transcript.say("Welcome to Quantum Drift: The Lost AWS Architect");
        self.transcript.say("Mission: Locate Dr. ███████ using AWS services");
        self.transcript.say("Type \"help\" for available commands");
        Ok(())
    }

    /// Handle one line typed into the console.
    pub fn process_command(&mut self, line: &str) -> GameResult<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        if CliInterpreter::recognizes(line) {
            return self.run_cli(line).map(|_| ());
        }

        let lowered = line.to_lowercase();
        let parts: Vec<&str> = lowered.split_whitespace().collect();
        match parts[0] {
            "help" => {
                self.show_help();
                Ok(())
            }
            "status" => {
                self.show_status();
                Ok(())
            }
            "deploy" => match parts.get(1) {
                Some(service) => self.deploy_service(service),
                None => {
                    self.transcript.say("Usage: deploy <service-name>");
                    Ok(())
                }
            },
            "scan" => self.service_scan(),
            "investigate" => self.investigate(),
            other => self.reject(GameError::UnrecognizedCommand { command: other.to_string() }),
        }
    }

    /// Route an `aws ...` line through the interpreter.
    pub fn run_cli(&mut self, line: &str) -> GameResult<CliReply> {
        match self.cli.process(line, &mut self.aws, &mut self.transcript) {
            CliOutcome::Completed(reply) => {
                if let Some(event) = reply_event(&reply) {
                    self.emit(event)?;
                }
                Ok(reply)
            }
            CliOutcome::Failed(err) => {
                self.emit(GameEvent::CommandRejected {
                    line: line.to_string(),
                    reason: err.to_string(),
                })?;
                Err(err)
            }
            CliOutcome::NotHandled => {
                let command = line.split_whitespace().next().unwrap_or_default().to_string();
                self.reject(GameError::UnrecognizedCommand { command })
            }
        }
    }

    /// Advance virtual time by `ms`, firing due timers in order.
    /// Time saturates at `Millis::MAX`.
    pub fn advance(&mut self, ms: Millis) -> GameResult<()> {
        let until = self.clock.now.saturating_add(ms);
        while let Some(fired) = self.scheduler.pop_due(until) {
            self.clock.advance_to(fired.at);
            self.dispatch(fired.task)?;
        }
        self.clock.advance_to(until);
        Ok(())
    }

    fn dispatch(&mut self, task: TimerTask) -> GameResult<()> {
        match task {
            TimerTask::RoundCountdown => {
                self.round.on_countdown(&mut self.scheduler, &mut self.transcript);
                self.collect_round_report()
            }
            TimerTask::RoundSpawn => {
                self.round.on_spawn();
                Ok(())
            }
            TimerTask::ScanReveal => self.reveal_scan(),
            TimerTask::ClueReveal => self.reveal_clue(),
            TimerTask::RegionEvent => self.region_event(),
        }
    }

    // ── Deployment ─────────────────────────────────────────────

    pub fn deploy_service(&mut self, name: &str) -> GameResult<()> {
        let Some(service) = crate::service::Service::parse(name) else {
            return self.reject(GameError::UnknownService { name: name.to_string() });
        };
        if self.round.is_active() {
            return self.reject(GameError::Busy {
                action: "a deployment",
                activity: "another deployment",
            });
        }
        if self.player.has_deployed(service) {
            return self.reject(GameError::AlreadyDeployed { service: service.to_string() });
        }

        let cost = service.cost();
        if let Err(err) = self.player.spend(cost) {
            return self.reject(err);
        }
        self.emit(GameEvent::DeploymentStarted {
            service,
            cost,
            credits_left: self.player.credits,
        })?;
        if self.phase != Phase::Complete {
            self.set_phase(Phase::Hacking)?;
        }
        self.round.start(
            service,
            self.config.round_seconds,
            self.clock.now,
            &mut self.scheduler,
            &mut self.transcript,
        )
    }

    /// Click a target in the active round.
    pub fn click_target(&mut self, target: TargetId) -> GameResult<ClickResult> {
        let result = self.round.click(target, &mut self.scheduler, &mut self.transcript);
        self.collect_round_report()?;
        Ok(result)
    }

    fn collect_round_report(&mut self) -> GameResult<()> {
        match self.round.take_report() {
            Some(report) => self.on_round_complete(report),
            None => Ok(()),
        }
    }

    fn on_round_complete(&mut self, report: RoundReport) -> GameResult<()> {
        if self.phase == Phase::Hacking {
            self.set_phase(Phase::World)?;
        }
        let service = report.service;

        if !report.success {
            let refund = service.cost() / 2;
            self.player.refund(refund);
            self.transcript.say(format!("Deployment failed. {refund} credits refunded."));
            return self.emit(GameEvent::DeploymentFailed { service, refund });
        }

        self.player.record_deployment(service);
        self.player.xp += self.config.deploy_xp;
        self.emit(GameEvent::DeploymentSucceeded { service, xp_awarded: self.config.deploy_xp })?;

        if let Some(level) = self.player.check_level_up(&self.config) {
            self.transcript.say(format!("LEVEL UP! You are now level {level}"));
            self.emit(GameEvent::LevelUp { level, max_health: self.player.max_health })?;
        }
        self.transcript.say(format!(
            "{service} deployed successfully! +{} XP",
            self.config.deploy_xp
        ));
        self.check_win_condition()?;
        Ok(())
    }

    // ── Exploration ────────────────────────────────────────────

    pub fn select_region(&mut self, id: &str) -> GameResult<Option<RegionSelection>> {
        let selection = match self.map.select(id) {
            Ok(Some(selection)) => selection,
            Ok(None) => return Ok(None),
            Err(err) => return self.reject(err),
        };

        self.player.current_region = Some(selection.region.clone());
        self.transcript.say(format!("Infrastructure deployed to {}", selection.name));
        self.emit(GameEvent::RegionSelected {
            region: selection.region.clone(),
            is_target: selection.is_target,
        })?;

        if self.rng.chance(self.config.region_event_chance) {
            self.scheduler.schedule_once(
                self.clock.now,
                self.config.region_event_delay_ms,
                TimerTask::RegionEvent,
            );
        }
        self.check_win_condition()?;
        Ok(Some(selection))
    }

    fn region_event(&mut self) -> GameResult<()> {
        let text = REGION_EVENTS[self.rng.pick_index(REGION_EVENTS.len())];
        self.transcript.say(format!("EVENT: {text}"));
        let region = self.player.current_region.clone().unwrap_or_default();
        self.emit(GameEvent::RegionEvent { region, text: text.to_string() })
    }

    pub fn service_scan(&mut self) -> GameResult<()> {
        if self.map.current().is_none() {
            return self.reject(GameError::NoSelection);
        }
        let cost = self.config.scan_cost;
        if let Err(err) = self.player.spend(cost) {
            return self.reject(err);
        }
        self.transcript.say("Scanning region for available services...");
        self.emit(GameEvent::ScanStarted { cost })?;
        self.scheduler.schedule_once(self.clock.now, self.config.scan_delay_ms, TimerTask::ScanReveal);
        Ok(())
    }

    fn reveal_scan(&mut self) -> GameResult<()> {
        let available = self.player.undeployed_scannable();
        let detected = if available.is_empty() {
            self.transcript.say("All services already deployed in this region.");
            None
        } else {
            let service = available[self.rng.pick_index(available.len())];
            self.transcript.say(format!("Service detected: {service} available for deployment"));
            Some(service)
        };
        self.emit(GameEvent::ServiceDetected { service: detected })
    }

    // ── Investigation ──────────────────────────────────────────

    pub fn investigate(&mut self) -> GameResult<()> {
        if self.map.current().is_none() {
            return self.reject(GameError::NoSelection);
        }
        if self.quiz.is_pending() {
            return self.reject(GameError::Busy {
                action: "an investigation",
                activity: "a knowledge check",
            });
        }
        let cost = self.config.investigate_cost;
        if let Err(err) = self.player.spend(cost) {
            return self.reject(err);
        }

        self.transcript.say("Investigating region for clues...");
        self.transcript.say("Accessing AWS knowledge database...");
        let quiz_shown = self.quiz.show_question();
        self.emit(GameEvent::InvestigationStarted { cost, quiz_shown })?;

        if !quiz_shown {
            self.scheduler.schedule_once(
                self.clock.now,
                self.config.clue_delay_ms,
                TimerTask::ClueReveal,
            );
        }
        Ok(())
    }

    /// Answer the pending knowledge check. `None` if nothing is pending.
    pub fn answer_question(&mut self, option: &str) -> GameResult<Option<QuizVerdict>> {
        match self.quiz.answer(option) {
            Some(verdict) => self.resolve_investigation(verdict).map(Some),
            None => Ok(None),
        }
    }

    /// Skip the pending knowledge check. `None` if nothing is pending.
    pub fn skip_question(&mut self) -> GameResult<Option<QuizVerdict>> {
        match self.quiz.skip() {
            Some(verdict) => self.resolve_investigation(verdict).map(Some),
            None => Ok(None),
        }
    }

    fn resolve_investigation(&mut self, verdict: QuizVerdict) -> GameResult<QuizVerdict> {
        self.emit(GameEvent::QuizAnswered { correct: verdict.correct, skipped: verdict.skipped })?;

        if verdict.skipped {
            self.transcript.say("Investigation skipped. No new information gathered.");
            return Ok(verdict);
        }
        if let Some(explanation) = &verdict.explanation {
            self.transcript.say(format!("Explanation: {explanation}"));
        }
        if verdict.correct {
            self.transcript.say("✓ Knowledge verified! Investigation successful.");
            self.player.xp += self.config.investigate_xp;
            self.reveal_clue()?;
        } else {
            self.transcript.say("✗ Knowledge verification failed. Investigation incomplete.");
            self.transcript.say("Some clues may have been missed.");
        }
        Ok(verdict)
    }

    /// Reveal what the current region holds: the critical clue in the
    /// target region, one flavor clue anywhere else.
    fn reveal_clue(&mut self) -> GameResult<()> {
        let critical = self.map.is_in_target_region();
        let text = if critical {
            self.transcript.say("*** CRITICAL CLUE DISCOVERED ***");
            self.transcript.say(CRITICAL_CLUE);
            self.transcript.say("Deploy all AWS services here to complete the mission.");
            CRITICAL_CLUE
        } else {
            let clue = CLUES[self.rng.pick_index(CLUES.len())];
            self.transcript.say(format!("Clue found: {clue}"));
            clue
        };
        self.emit(GameEvent::ClueRevealed { critical, text: text.to_string() })
    }

    // ── Outcome ────────────────────────────────────────────────

    /// Finish the mission if every required service is deployed and the
    /// player stands in the target region. Fires at most once.
    pub fn check_win_condition(&mut self) -> GameResult<bool> {
        if self.phase == Phase::Complete {
            return Ok(false);
        }
        if !(self.player.has_required_services() && self.map.is_in_target_region()) {
            return Ok(false);
        }

        self.set_phase(Phase::Complete)?;
        self.transcript.say("*** MISSION ACCOMPLISHED ***");
        self.transcript.say("Dr. ███████ has been located and rescued!");
        self.transcript.say("All AWS services successfully deployed.");
        self.transcript.say("Quantum anomaly neutralized.");
        self.transcript.say("Thank you for playing Quantum Drift!");
        self.player.certifications += 1;
        self.emit(GameEvent::MissionComplete { certifications: self.player.certifications })?;
        log::info!("session {} complete at {}ms", self.session_id, self.clock.now);
        Ok(true)
    }

    // ── Console output ─────────────────────────────────────────

    fn show_help(&mut self) {
        for line in [
            "Available commands:",
            "help - Show this help message",
            "status - Show player status",
            "deploy <service> - Deploy AWS service",
            "scan - Scan current region",
            "investigate - Investigate current region",
            "",
            "AWS CLI commands:",
            "aws sns create-topic --name <topic-name>",
            "aws sns publish --topic-arn <arn> --message <text>",
            "aws sqs create-queue --queue-name <queue-name>",
            "aws sqs send-message --queue-url <url> --message-body <text>",
            "aws apigateway create-rest-api --name <api-name>",
            "aws ec2 describe-instances",
            "aws s3 ls",
            "aws lambda list-functions",
        ] {
            self.transcript.say(line);
        }
    }

    fn show_status(&mut self) {
        let p = &self.player;
        let lines = [
            "Player Status:".to_string(),
            format!("Level: {} | XP: {}", p.level, p.xp),
            format!("Health: {}/{}", p.health, p.max_health),
            format!("Credits: {}", p.credits),
            format!("Certifications: {}", p.certifications),
            format!("Deployed Services: {}", p.deployed.len()),
            format!("Current Region: {}", p.current_region.as_deref().unwrap_or("None")),
        ];
        for line in lines {
            self.transcript.say(line);
        }
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn map(&self) -> &RegionMap {
        &self.map
    }

    pub fn round(&self) -> &DeploymentRound {
        &self.round
    }

    pub fn quiz(&self) -> &QuizSystem {
        &self.quiz
    }

    pub fn provider(&self) -> &MockProvider {
        &self.aws
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Current display state.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    /// Events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// The persisted event log of this session.
    pub fn event_log(&self) -> GameResult<Vec<EventLogEntry>> {
        self.store.events_for_session(&self.session_id)
    }

    pub fn store(&self) -> &GameStore {
        &self.store
    }

    // ── Internals ──────────────────────────────────────────────

    fn set_phase(&mut self, to: Phase) -> GameResult<()> {
        let from = self.phase;
        if from == to {
            return Ok(());
        }
        self.phase = to;
        self.emit(GameEvent::PhaseChanged { from, to })
    }

    /// Report a rule violation and hand it back.
    fn reject<T>(&mut self, err: GameError) -> GameResult<T> {
        log::debug!("rejected: {err}");
        self.transcript.say(err.to_string());
        Err(err)
    }

    fn emit(&mut self, event: GameEvent) -> GameResult<()> {
        let entry = EventLogEntry {
            id:         None,
            session_id: self.session_id.clone(),
            at_ms:      self.clock.now,
            source:     event.source().to_string(),
            event_type: event.type_name().to_string(),
            payload:    serde_json::to_string(&event)?,
        };
        self.store.append_event(&entry)?;
        log::debug!("t={}ms event={}", self.clock.now, entry.event_type);
        self.events.push(event);
        Ok(())
    }
}

fn reply_event(reply: &CliReply) -> Option<GameEvent> {
    match reply {
        CliReply::TopicCreated { arn } => Some(GameEvent::ResourceCreated {
            service: "sns".into(),
            identifier: arn.clone(),
        }),
        CliReply::QueueCreated { url } => Some(GameEvent::ResourceCreated {
            service: "sqs".into(),
            identifier: url.clone(),
        }),
        CliReply::ApiCreated(api) => Some(GameEvent::ResourceCreated {
            service: "apigateway".into(),
            identifier: api.id.clone(),
        }),
        CliReply::Published(receipt) => Some(GameEvent::MessageAccepted {
            service: "sns".into(),
            message_id: receipt.message_id.clone(),
        }),
        CliReply::MessageSent { message_id } => Some(GameEvent::MessageAccepted {
            service: "sqs".into(),
            message_id: message_id.clone(),
        }),
        CliReply::Topics { .. }
        | CliReply::Queues { .. }
        | CliReply::Apis { .. }
        | CliReply::Stub { .. } => None,
    }
}
