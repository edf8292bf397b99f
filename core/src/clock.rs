//! Virtual session clock. Owns the current time in milliseconds.
//!
//! Nothing in the game reads wall-clock time for game logic; the
//! front end decides how fast virtual time advances.

use crate::types::{Millis, SessionId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameClock {
    pub session_id: SessionId,
    pub now:        Millis,
}

impl GameClock {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id, now: 0 }
    }

    /// Move the clock forward to `at`.
    ///
    /// Only the controller's timer pump moves the clock, and it never
    /// passes a time in the past. A backwards move is a bug and panics.
    pub(crate) fn advance_to(&mut self, at: Millis) {
        assert!(at >= self.now, "clock moved backwards: {} -> {at}", self.now);
        self.now = at;
    }

    /// Whole seconds elapsed since the session started.
    pub fn elapsed_secs(&self) -> u64 {
        self.now / 1000
    }
}
