//! SQLite persistence for the session event log.
//!
//! RULE: Only store.rs talks to the database.
//! The controller hands events to the store and never executes SQL.

use crate::{
    error::GameResult,
    event::EventLogEntry,
};
use rusqlite::{params, Connection};

pub struct GameStore {
    conn: Connection,
}

impl GameStore {
    /// Open (or create) the event log database at `path`.
    pub fn open(path: &str) -> GameResult<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests and throwaway sessions).
    pub fn in_memory() -> GameResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> GameResult<()> {
        self.conn.execute_batch(include_str!("../migrations/001_event_log.sql"))?;
        Ok(())
    }

    // ── Session ────────────────────────────────────────────────

    pub fn insert_session(&self, session_id: &str, seed: u64, version: &str) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO session (session_id, seed, version, started_at) VALUES (?1, ?2, ?3, ?4)",
            params![session_id, seed as i64, version, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn session_seed(&self, session_id: &str) -> GameResult<Option<u64>> {
        let mut stmt = self.conn.prepare("SELECT seed FROM session WHERE session_id = ?1")?;
        let mut rows = stmt.query(params![session_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row.get::<_, i64>(0)? as u64)),
            None => Ok(None),
        }
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> GameResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, at_ms, source, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_id,
                entry.at_ms as i64,
                entry.source,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_session(&self, session_id: &str) -> GameResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, at_ms, source, event_type, payload
             FROM event_log WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(EventLogEntry {
                    id:         Some(row.get(0)?),
                    session_id: row.get(1)?,
                    at_ms:      row.get::<_, i64>(2)? as u64,
                    source:     row.get(3)?,
                    event_type: row.get(4)?,
                    payload:    row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn event_count(&self, session_id: &str, event_type: &str) -> GameResult<i64> {
        let count = self.conn.query_row(
            "SELECT COUNT(*) FROM event_log WHERE session_id = ?1 AND event_type = ?2",
            params![session_id, event_type],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}
