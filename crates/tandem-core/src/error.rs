//! Error types for the session core.

use thiserror::Error;

/// An input arrived that the current status has no transition for.
///
/// Relay and peer routinely drift out of sync (late completions, frames sent
/// before a reload), so this is reported and otherwise ignored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("oops: {event} is not valid in status {status}")]
pub struct ProtocolViolation {
    /// Name of the status the session was in.
    pub status: &'static str,
    /// Tag of the offending input.
    pub event: &'static str,
}

impl ProtocolViolation {
    /// Record a mismatched status/input pair.
    pub fn new(status: &'static str, event: &'static str) -> Self {
        Self { status, event }
    }
}
