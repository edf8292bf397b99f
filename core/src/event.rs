//! Game events: the record of every state change.
//!
//! RULE: every mutation the controller performs is announced as a
//! `GameEvent`. Front ends subscribe by draining events; the store
//! persists them to the event log.

use crate::{
    game::Phase,
    service::Service,
    types::{Millis, RegionId, SessionId},
};
use serde::{Deserialize, Serialize};

/// Variants are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    // ── Session ────────────────────────────────────
    SessionStarted { session_id: SessionId, seed: u64 },
    PhaseChanged { from: Phase, to: Phase },

    // ── Mock provider ──────────────────────────────
    ResourceCreated { service: String, identifier: String },
    MessageAccepted { service: String, message_id: String },
    CommandRejected { line: String, reason: String },

    // ── Deployment ─────────────────────────────────
    DeploymentStarted { service: Service, cost: u32, credits_left: u32 },
    DeploymentSucceeded { service: Service, xp_awarded: u32 },
    DeploymentFailed { service: Service, refund: u32 },
    LevelUp { level: u32, max_health: u32 },

    // ── Exploration ────────────────────────────────
    RegionSelected { region: RegionId, is_target: bool },
    RegionEvent { region: RegionId, text: String },
    ScanStarted { cost: u32 },
    ServiceDetected { service: Option<Service> },

    // ── Investigation ──────────────────────────────
    InvestigationStarted { cost: u32, quiz_shown: bool },
    QuizAnswered { correct: bool, skipped: bool },
    ClueRevealed { critical: bool, text: String },

    // ── Outcome ────────────────────────────────────
    MissionComplete { certifications: u32 },
}

impl GameEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. }      => "session_started",
            Self::PhaseChanged { .. }        => "phase_changed",
            Self::ResourceCreated { .. }     => "resource_created",
            Self::MessageAccepted { .. }     => "message_accepted",
            Self::CommandRejected { .. }     => "command_rejected",
            Self::DeploymentStarted { .. }   => "deployment_started",
            Self::DeploymentSucceeded { .. } => "deployment_succeeded",
            Self::DeploymentFailed { .. }    => "deployment_failed",
            Self::LevelUp { .. }             => "level_up",
            Self::RegionSelected { .. }      => "region_selected",
            Self::RegionEvent { .. }         => "region_event",
            Self::ScanStarted { .. }         => "scan_started",
            Self::ServiceDetected { .. }     => "service_detected",
            Self::InvestigationStarted { .. }=> "investigation_started",
            Self::QuizAnswered { .. }        => "quiz_answered",
            Self::ClueRevealed { .. }        => "clue_revealed",
            Self::MissionComplete { .. }     => "mission_complete",
        }
    }

    /// Which component the event originates from.
    pub fn source(&self) -> &'static str {
        match self {
            Self::SessionStarted { .. } | Self::PhaseChanged { .. } => "game",
            Self::ResourceCreated { .. }
            | Self::MessageAccepted { .. }
            | Self::CommandRejected { .. } => "interpreter",
            Self::DeploymentStarted { .. }
            | Self::DeploymentSucceeded { .. }
            | Self::DeploymentFailed { .. }
            | Self::LevelUp { .. } => "deployment",
            Self::RegionSelected { .. }
            | Self::RegionEvent { .. }
            | Self::ScanStarted { .. }
            | Self::ServiceDetected { .. } => "region_map",
            Self::InvestigationStarted { .. }
            | Self::QuizAnswered { .. }
            | Self::ClueRevealed { .. } => "quiz",
            Self::MissionComplete { .. } => "game",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub session_id: SessionId,
    pub at_ms:      Millis,
    pub source:     String,
    pub event_type: String,
    pub payload:    String, // JSON-serialized GameEvent
}
