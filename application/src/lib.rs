//! Application layer for quote-ledger
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::LedgerParams;
pub use ports::{
    quote_store::{CommitReceipt, QuoteStore, QuoteTransaction, StoreError},
    vote_event_logger::{NoVoteEventLogger, VoteEvent, VoteEventLogger},
};
pub use use_cases::list_quotes::{ListQuotesUseCase, QueryError};
pub use use_cases::manage_quotes::{
    CreateQuoteError, CreateQuoteInput, CreateQuoteUseCase, DeleteQuoteError, DeleteQuoteUseCase,
};
pub use use_cases::vote_ledger::{VoteError, VoteLedger};
