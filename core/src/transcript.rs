//! Console transcript: the text feedback a player reads.
//!
//! Lines are stored without the `> ` prompt marker; the front end
//! decides how to decorate them.
//!
//! The transcript is session-scoped and append-only. Front ends render
//! incrementally with `since(cursor)`, so line indices never shift.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn say(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines appended after `cursor`, for incremental rendering.
    pub fn since(&self, cursor: usize) -> &[String] {
        &self.lines[cursor.min(self.lines.len())..]
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }

    /// True if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|l| l.contains(needle))
    }
}
