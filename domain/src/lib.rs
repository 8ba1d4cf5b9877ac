//! Domain layer for quote-ledger
//!
//! This crate contains the core entities, value objects and the ranking rules.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Quote
//!
//! A short piece of text submitted by a user. Each quote carries a vote
//! counter and the set of users currently counted toward it.
//!
//! ## Single active vote
//!
//! A user holds at most one active vote across all quotes. Voting for another
//! quote moves the vote; the application layer enforces this through
//! store transactions.
//!
//! ## Ranking
//!
//! [`rank_quotes`] turns raw quotes into [`QuoteView`]s ordered by a
//! [`SortKey`], with a per-viewer `voted_by_viewer` flag.

pub mod config;
pub mod core;
pub mod quote;
pub mod vote;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use quote::{
    entities::Quote,
    ranking::{ListQuery, rank_quotes},
    sort::SortKey,
    value_objects::{QuoteDraft, QuoteId, UserId},
    view::QuoteView,
};
pub use vote::{VoteChange, VoteOutcome};
