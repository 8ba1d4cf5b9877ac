//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod list_quotes;
pub mod manage_quotes;
pub(crate) mod shared;
pub mod vote_ledger;
