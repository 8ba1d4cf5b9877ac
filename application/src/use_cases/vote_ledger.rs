//! Vote ledger.
//!
//! The only mutation path for vote state. Each operation runs its
//! read-decide-write sequence inside one store transaction and retries the
//! whole sequence when the store reports a conflict:
//!
//! ```text
//! begin ─▶ read active vote ─▶ decide ─▶ buffer primitives ─▶ commit
//!   ▲                                                           │
//!   └──────────── Conflict (attempt < max_attempts) ◀───────────┘
//! ```
//!
//! After `max_attempts` conflicting commits the caller gets
//! [`VoteError::Contention`].

use crate::config::LedgerParams;
use crate::ports::quote_store::{CommitReceipt, QuoteStore, StoreError};
use crate::ports::vote_event_logger::{NoVoteEventLogger, VoteEvent, VoteEventLogger};
use crate::use_cases::shared::check_cancelled;
use ledger_domain::{QuoteId, UserId, VoteChange, VoteOutcome};
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Errors returned by vote operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoteError {
    #[error("Quote with ID \"{0}\" not found")]
    QuoteNotFound(QuoteId),

    #[error("You have already voted for quote \"{0}\"")]
    DuplicateVote(QuoteId),

    #[error("You have not voted for quote \"{0}\"")]
    NoActiveVote(QuoteId),

    #[error("Vote not applied after {attempts} conflicting attempts, try again")]
    Contention { attempts: usize },

    #[error("Operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Store(StoreError),
}

impl VoteError {
    /// Whether the caller may reasonably retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VoteError::Contention { .. })
    }

    /// Whether this is an infrastructure failure rather than a domain outcome.
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, VoteError::Store(_))
    }
}

impl From<StoreError> for VoteError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::QuoteNotFound(id) => VoteError::QuoteNotFound(id),
            other => VoteError::Store(other),
        }
    }
}

/// Outcome of a single attempt.
enum AttemptError {
    /// Commit-time validation failed; the whole attempt may be replayed.
    Conflict,
    Fail(VoteError),
}

impl From<StoreError> for AttemptError {
    fn from(err: StoreError) -> Self {
        if err.is_conflict() {
            AttemptError::Conflict
        } else {
            AttemptError::Fail(err.into())
        }
    }
}

impl From<VoteError> for AttemptError {
    fn from(err: VoteError) -> Self {
        AttemptError::Fail(err)
    }
}

/// Enforces the single-active-vote invariant over a [`QuoteStore`].
#[derive(Clone)]
pub struct VoteLedger {
    store: Arc<dyn QuoteStore>,
    params: LedgerParams,
    event_logger: Arc<dyn VoteEventLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn QuoteStore>) -> Self {
        Self {
            store,
            params: LedgerParams::default(),
            event_logger: Arc::new(NoVoteEventLogger),
            cancellation_token: None,
        }
    }

    pub fn with_params(mut self, params: LedgerParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn VoteEventLogger>) -> Self {
        self.event_logger = logger;
        self
    }

    /// Set a cancellation token; a cancelled token aborts before commit.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    pub fn params(&self) -> &LedgerParams {
        &self.params
    }

    /// Vote for `target`, moving any existing vote of `user` onto it.
    pub async fn cast_vote(
        &self,
        user: &UserId,
        target: &QuoteId,
    ) -> Result<VoteOutcome, VoteError> {
        let (change, receipt) = self
            .with_retry("cast_vote", move || self.try_cast(user, target))
            .await?;
        let new_vote_count = self.count_after(&receipt, target)?;
        info!(
            user = %user,
            quote = %target,
            votes = new_vote_count,
            "{}",
            change.event_type()
        );
        self.event_logger
            .log(VoteEvent::from_change(&change, new_vote_count));

        Ok(VoteOutcome {
            quote_id: target.clone(),
            new_vote_count,
            voted: true,
        })
    }

    /// Withdraw `user`'s vote from `quote`.
    pub async fn withdraw_vote(
        &self,
        user: &UserId,
        quote: &QuoteId,
    ) -> Result<VoteOutcome, VoteError> {
        let (change, receipt) = self
            .with_retry("withdraw_vote", move || self.try_withdraw(user, quote))
            .await?;
        let new_vote_count = self.count_after(&receipt, quote)?;
        info!(user = %user, quote = %quote, votes = new_vote_count, "vote_withdrawn");
        self.event_logger
            .log(VoteEvent::from_change(&change, new_vote_count));

        Ok(VoteOutcome {
            quote_id: quote.clone(),
            new_vote_count,
            voted: false,
        })
    }

    async fn try_cast(
        &self,
        user: &UserId,
        target: &QuoteId,
    ) -> Result<(VoteChange, CommitReceipt), AttemptError> {
        check_cancelled(&self.cancellation_token)?;
        let mut tx = self.store.begin().await?;

        if !tx.quote_exists(target).await? {
            return Err(VoteError::QuoteNotFound(target.clone()).into());
        }

        let change = match tx.active_vote_of(user).await? {
            Some(previous) if &previous == target => {
                return Err(VoteError::DuplicateVote(target.clone()).into());
            }
            Some(previous) => {
                tx.decrement_and_remove_voter(&previous, user);
                tx.increment_and_add_voter(target, user);
                VoteChange::Transferred {
                    user: user.clone(),
                    from: previous,
                    to: target.clone(),
                }
            }
            None => {
                tx.increment_and_add_voter(target, user);
                VoteChange::Cast {
                    user: user.clone(),
                    quote: target.clone(),
                }
            }
        };

        check_cancelled(&self.cancellation_token)?;
        let receipt = tx.commit().await?;
        Ok((change, receipt))
    }

    async fn try_withdraw(
        &self,
        user: &UserId,
        quote: &QuoteId,
    ) -> Result<(VoteChange, CommitReceipt), AttemptError> {
        check_cancelled(&self.cancellation_token)?;
        let mut tx = self.store.begin().await?;

        if !tx.quote_exists(quote).await? {
            return Err(VoteError::QuoteNotFound(quote.clone()).into());
        }
        if tx.active_vote_of(user).await?.as_ref() != Some(quote) {
            return Err(VoteError::NoActiveVote(quote.clone()).into());
        }
        tx.decrement_and_remove_voter(quote, user);

        check_cancelled(&self.cancellation_token)?;
        let receipt = tx.commit().await?;
        Ok((
            VoteChange::Withdrawn {
                user: user.clone(),
                quote: quote.clone(),
            },
            receipt,
        ))
    }

    /// Run `attempt` until it commits, fails for a non-conflict reason, or
    /// exhausts `max_attempts`.
    async fn with_retry<T, F, Fut>(&self, operation: &str, attempt: F) -> Result<T, VoteError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.params.max_attempts.max(1);
        for n in 1..=max_attempts {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Fail(err)) => return Err(err),
                Err(AttemptError::Conflict) if n < max_attempts => {
                    debug!("{}: conflict on attempt {}/{}", operation, n, max_attempts);
                    self.backoff(n).await?;
                }
                Err(AttemptError::Conflict) => {}
            }
        }
        warn!(
            "{}: giving up after {} conflicting attempts",
            operation, max_attempts
        );
        Err(VoteError::Contention {
            attempts: max_attempts,
        })
    }

    async fn backoff(&self, attempt: usize) -> Result<(), VoteError> {
        let delay = self.params.delay_after(attempt);
        match &self.cancellation_token {
            Some(token) => tokio::select! {
                _ = token.cancelled() => Err(VoteError::Cancelled),
                _ = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }

    fn count_after(&self, receipt: &CommitReceipt, id: &QuoteId) -> Result<u64, VoteError> {
        receipt.vote_count(id).ok_or_else(|| {
            VoteError::Store(StoreError::Unavailable(format!(
                "commit receipt is missing quote {}",
                id
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, qid, uid};
    use std::time::Duration;

    fn ledger(store: &FakeStore) -> VoteLedger {
        VoteLedger::new(Arc::new(store.clone()))
            .with_params(LedgerParams::default().with_backoff(Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn test_first_vote_increments_target() {
        let store = FakeStore::with_quotes(&["a", "b"]);
        let outcome = ledger(&store).cast_vote(&uid("u"), &qid("a")).await.unwrap();

        assert_eq!(
            outcome,
            VoteOutcome {
                quote_id: qid("a"),
                new_vote_count: 1,
                voted: true
            }
        );
        assert!(store.quote("a").has_voter(&uid("u")));
        assert_eq!(store.quote("b").vote_count(), 0);
    }

    #[tokio::test]
    async fn test_second_vote_on_same_quote_is_duplicate() {
        let store = FakeStore::with_quotes(&["a"]);
        let ledger = ledger(&store);

        ledger.cast_vote(&uid("u"), &qid("a")).await.unwrap();
        let err = ledger.cast_vote(&uid("u"), &qid("a")).await.unwrap_err();

        assert_eq!(err, VoteError::DuplicateVote(qid("a")));
        assert_eq!(store.quote("a").vote_count(), 1);
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_vote_moves_to_new_target() {
        let store = FakeStore::with_quotes(&["a", "b"]);
        let ledger = ledger(&store);

        ledger.cast_vote(&uid("u"), &qid("a")).await.unwrap();
        ledger.cast_vote(&uid("other"), &qid("a")).await.unwrap();
        let outcome = ledger.cast_vote(&uid("u"), &qid("b")).await.unwrap();

        assert_eq!(outcome.new_vote_count, 1);
        let a = store.quote("a");
        let b = store.quote("b");
        assert_eq!(a.vote_count(), 1);
        assert!(!a.has_voter(&uid("u")));
        assert!(b.has_voter(&uid("u")));
        assert!(a.is_consistent() && b.is_consistent());
    }

    #[tokio::test]
    async fn test_missing_target_leaves_counters_untouched() {
        let store = FakeStore::with_quotes(&["a"]);
        let ledger = ledger(&store);
        ledger.cast_vote(&uid("u"), &qid("a")).await.unwrap();

        let err = ledger.cast_vote(&uid("u"), &qid("nope")).await.unwrap_err();

        assert_eq!(err, VoteError::QuoteNotFound(qid("nope")));
        assert_eq!(store.quote("a").vote_count(), 1);
        assert!(store.quote("a").has_voter(&uid("u")));
    }

    #[tokio::test]
    async fn test_withdraw_then_withdraw_again() {
        let store = FakeStore::with_quotes(&["a"]);
        let ledger = ledger(&store);
        ledger.cast_vote(&uid("u"), &qid("a")).await.unwrap();

        let outcome = ledger.withdraw_vote(&uid("u"), &qid("a")).await.unwrap();
        assert_eq!(outcome.new_vote_count, 0);
        assert!(!outcome.voted);

        let err = ledger.withdraw_vote(&uid("u"), &qid("a")).await.unwrap_err();
        assert_eq!(err, VoteError::NoActiveVote(qid("a")));
    }

    #[tokio::test]
    async fn test_withdraw_checks_existence_first() {
        let store = FakeStore::with_quotes(&["a"]);
        let err = ledger(&store)
            .withdraw_vote(&uid("u"), &qid("missing"))
            .await
            .unwrap_err();
        assert_eq!(err, VoteError::QuoteNotFound(qid("missing")));
    }

    #[tokio::test]
    async fn test_withdraw_from_other_quote_is_no_active_vote() {
        let store = FakeStore::with_quotes(&["a", "b"]);
        let ledger = ledger(&store);
        ledger.cast_vote(&uid("u"), &qid("a")).await.unwrap();

        let err = ledger.withdraw_vote(&uid("u"), &qid("b")).await.unwrap_err();
        assert_eq!(err, VoteError::NoActiveVote(qid("b")));
        assert_eq!(store.quote("a").vote_count(), 1);
    }

    #[tokio::test]
    async fn test_conflicts_are_retried() {
        let store = FakeStore::with_quotes(&["a"]);
        store.fail_next_commits(2);

        let outcome = ledger(&store).cast_vote(&uid("u"), &qid("a")).await.unwrap();
        assert_eq!(outcome.new_vote_count, 1);
        assert_eq!(store.commits(), 1);
    }

    #[tokio::test]
    async fn test_exhausted_retries_surface_contention() {
        let store = FakeStore::with_quotes(&["a"]);
        store.fail_next_commits(3);

        let err = ledger(&store).cast_vote(&uid("u"), &qid("a")).await.unwrap_err();
        assert_eq!(err, VoteError::Contention { attempts: 3 });
        assert!(err.is_retryable());
        assert_eq!(store.quote("a").vote_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_commit_changes_nothing() {
        let store = FakeStore::with_quotes(&["a"]);
        let token = CancellationToken::new();
        token.cancel();

        let err = ledger(&store)
            .with_cancellation(token)
            .cast_vote(&uid("u"), &qid("a"))
            .await
            .unwrap_err();

        assert_eq!(err, VoteError::Cancelled);
        assert_eq!(store.quote("a").vote_count(), 0);
        assert_eq!(store.commits(), 0);
    }

    #[test]
    fn test_store_not_found_maps_to_domain_error() {
        let err: VoteError = StoreError::QuoteNotFound(qid("x")).into();
        assert_eq!(err, VoteError::QuoteNotFound(qid("x")));

        let err: VoteError = StoreError::Unavailable("disk".into()).into();
        assert!(err.is_infrastructure());
        assert!(!err.is_retryable());
    }
}
