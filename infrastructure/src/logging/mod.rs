//! Logging infrastructure: structured vote event logging.
//!
//! Provides [`JsonlVoteLogger`], a JSONL file writer that implements
//! the [`VoteEventLogger`](ledger_application::VoteEventLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlVoteLogger;
