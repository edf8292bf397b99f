//! Explicit, cancellable timers driven by the virtual clock.
//!
//! RULE: every delayed or repeating behaviour in the game is a task in
//! the scheduler, held by whoever started it through a `TimerHandle`.
//! A cancelled handle never fires again.

use crate::types::Millis;
use serde::{Deserialize, Serialize};

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerTask {
    /// One-second countdown of the active deployment round.
    RoundCountdown,
    /// Target respawn of the active deployment round.
    RoundSpawn,
    /// Delayed result of a service scan.
    ScanReveal,
    /// Delayed clue when no quiz question was available.
    ClueReveal,
    /// Flavor event after arriving in a region.
    RegionEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone)]
struct ScheduledTask {
    handle:   TimerHandle,
    due:      Millis,
    interval: Option<Millis>,
    task:     TimerTask,
}

/// A fired timer, as handed back to the owner for dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    pub handle: TimerHandle,
    pub at:     Millis,
    pub task:   TimerTask,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    next_handle: u64,
    tasks:       Vec<ScheduledTask>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `task` once, `delay` ms after `now`.
    pub fn schedule_once(&mut self, now: Millis, delay: Millis, task: TimerTask) -> TimerHandle {
        self.push(now.saturating_add(delay), None, task)
    }

    /// Fire `task` every `interval` ms, first at `now + interval`.
    pub fn schedule_repeating(
        &mut self,
        now: Millis,
        interval: Millis,
        task: TimerTask,
    ) -> TimerHandle {
        assert!(interval > 0, "repeating timer needs a non-zero interval");
        self.push(now.saturating_add(interval), Some(interval), task)
    }

    /// Cancel a timer. Returns false if it had already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        before != self.tasks.len()
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn pending_count(&self) -> usize {
        self.tasks.len()
    }

    /// Pending timers running `task`.
    pub fn pending_of(&self, task: TimerTask) -> usize {
        self.tasks.iter().filter(|t| t.task == task).count()
    }

    /// Pop the earliest timer due at or before `until`.
    /// Ties fire in scheduling order. Repeating timers are re-armed.
    pub fn pop_due(&mut self, until: Millis) -> Option<FiredTimer> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= until)
            .min_by_key(|(_, t)| (t.due, t.handle))
            .map(|(i, _)| i)?;

        let entry = &mut self.tasks[idx];
        let fired = FiredTimer { handle: entry.handle, at: entry.due, task: entry.task };
        match entry.interval {
            Some(interval) => entry.due = entry.due.saturating_add(interval),
            None => {
                self.tasks.remove(idx);
            }
        }
        Some(fired)
    }

    fn push(&mut self, due: Millis, interval: Option<Millis>, task: TimerTask) -> TimerHandle {
        self.next_handle += 1;
        let handle = TimerHandle(self.next_handle);
        self.tasks.push(ScheduledTask { handle, due, interval, task });
        handle
    }
}
