//! Port for structured vote event logging.
//!
//! Defines the [`VoteEventLogger`] trait for recording committed mutations
//! (votes cast, transferred and withdrawn, quotes created and deleted) to an
//! append-only audit log.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures every
//! committed change in a machine-readable format (JSONL).

use ledger_domain::VoteChange;
use serde_json::{Value, json};

/// A structured vote event for logging.
pub struct VoteEvent {
    /// Event type identifier (e.g., "vote_cast", "quote_deleted").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl VoteEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }

    /// Build the event for a committed vote change.
    pub fn from_change(change: &VoteChange, new_vote_count: u64) -> Self {
        let payload = match change {
            VoteChange::Cast { user, quote } => json!({
                "user": user,
                "quote": quote,
                "votes": new_vote_count,
            }),
            VoteChange::Transferred { user, from, to } => json!({
                "user": user,
                "from": from,
                "to": to,
                "votes": new_vote_count,
            }),
            VoteChange::Withdrawn { user, quote } => json!({
                "user": user,
                "quote": quote,
                "votes": new_vote_count,
            }),
        };
        Self::new(change.event_type(), payload)
    }
}

/// Port for logging vote events.
///
/// The `log` method is synchronous and non-fallible so a broken audit log
/// never fails a committed vote.
pub trait VoteEventLogger: Send + Sync {
    fn log(&self, event: VoteEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoVoteEventLogger;

impl VoteEventLogger for NoVoteEventLogger {
    fn log(&self, _event: VoteEvent) {}
}
