//! Shared primitive types used across the entire game.

/// Virtual time in milliseconds since the session started.
pub type Millis = u64;

/// A region identifier such as `us-east-1`.
pub type RegionId = String;

/// The canonical session identifier.
pub type SessionId = String;

/// Identifier of a clickable target within a deployment round.
pub type TargetId = u32;
