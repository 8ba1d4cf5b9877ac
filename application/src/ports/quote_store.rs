//! Quote store port
//!
//! Defines the transactional storage contract the vote ledger relies on.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;
use ledger_domain::{Quote, QuoteId, UserId};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A value read by the transaction changed before commit. Safe to retry.
    #[error("Transaction conflict")]
    Conflict,

    #[error("Quote with ID \"{0}\" not found")]
    QuoteNotFound(QuoteId),

    #[error("Quote with ID \"{0}\" already exists")]
    DuplicateQuote(QuoteId),

    /// The backing store could not be reached or persisted.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict)
    }
}

/// Vote counts of the quotes touched by a committed transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    counts: HashMap<QuoteId, u64>,
}

impl CommitReceipt {
    pub fn record(&mut self, id: QuoteId, vote_count: u64) {
        self.counts.insert(id, vote_count);
    }

    /// Post-commit vote count of `id`, if the transaction touched it.
    pub fn vote_count(&self, id: &QuoteId) -> Option<u64> {
        self.counts.get(id).copied()
    }
}

/// Storage for quote records.
///
/// Vote counters and voter sets are only changed through a
/// [`QuoteTransaction`]; `insert` and `remove` serve the creation and
/// deletion flow, the getters serve the read path.
#[async_trait]
pub trait QuoteStore: Send + Sync {
    /// Start an isolated transaction.
    async fn begin(&self) -> Result<Box<dyn QuoteTransaction>, StoreError>;

    /// Insert a newly created quote.
    async fn insert(&self, quote: Quote) -> Result<(), StoreError>;

    /// Remove a quote, returning it if it existed.
    ///
    /// Every voter of the removed quote loses its active vote, and any
    /// in-flight transaction that observed one of those votes fails to commit.
    async fn remove(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError>;

    async fn get(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError>;

    /// Fetch several quotes; unknown ids are skipped.
    async fn get_many(&self, ids: &[QuoteId]) -> Result<Vec<Quote>, StoreError>;

    /// Consistent copy of every stored quote.
    async fn snapshot(&self) -> Result<Vec<Quote>, StoreError>;
}

/// A snapshot-isolated unit of vote mutations.
///
/// Reads are tracked and validated at commit; the mutation primitives are
/// buffered and applied atomically by [`commit`](QuoteTransaction::commit).
/// Dropping a transaction without committing discards it.
#[async_trait]
pub trait QuoteTransaction: Send {
    /// Whether `id` exists in this transaction's snapshot.
    async fn quote_exists(&mut self, id: &QuoteId) -> Result<bool, StoreError>;

    /// The quote `user` currently votes for, if any.
    async fn active_vote_of(&mut self, user: &UserId) -> Result<Option<QuoteId>, StoreError>;

    /// Buffer: increment `id`'s counter and add `user` to its voter set.
    fn increment_and_add_voter(&mut self, id: &QuoteId, user: &UserId);

    /// Buffer: decrement `id`'s counter and remove `user` from its voter set.
    fn decrement_and_remove_voter(&mut self, id: &QuoteId, user: &UserId);

    /// Validate the read set and apply all buffered primitives atomically.
    ///
    /// Returns [`StoreError::Conflict`] when validation fails or a buffered
    /// membership change no longer applies, and
    /// [`StoreError::QuoteNotFound`] when a target quote was deleted.
    /// Either way nothing is applied.
    async fn commit(self: Box<Self>) -> Result<CommitReceipt, StoreError>;
}
