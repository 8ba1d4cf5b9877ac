//! Test double for the [`QuoteStore`] port.
//!
//! Applies transactions naively under a single lock and can be told to fail
//! the next N commits with [`StoreError::Conflict`].

use crate::ports::quote_store::{CommitReceipt, QuoteStore, QuoteTransaction, StoreError};
use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use ledger_domain::{Quote, QuoteDraft, QuoteId, UserId};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Inner {
    quotes: Mutex<BTreeMap<QuoteId, Quote>>,
    forced_conflicts: AtomicUsize,
    commits: AtomicUsize,
}

#[derive(Clone, Default)]
pub(crate) struct FakeStore {
    inner: Arc<Inner>,
}

impl FakeStore {
    /// Store holding one quote per id, created one minute apart.
    pub(crate) fn with_quotes(ids: &[&str]) -> Self {
        let store = Self::default();
        {
            let mut quotes = store.inner.quotes.lock().unwrap();
            for (i, id) in ids.iter().enumerate() {
                let q = fixture(id, i as i64);
                quotes.insert(q.id.clone(), q);
            }
        }
        store
    }

    pub(crate) fn fail_next_commits(&self, n: usize) {
        self.inner.forced_conflicts.store(n, Ordering::SeqCst);
    }

    pub(crate) fn commits(&self) -> usize {
        self.inner.commits.load(Ordering::SeqCst)
    }

    pub(crate) fn quote(&self, id: &str) -> Quote {
        self.inner.quotes.lock().unwrap()[&qid(id)].clone()
    }
}

pub(crate) fn qid(id: &str) -> QuoteId {
    id.parse().unwrap()
}

pub(crate) fn uid(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub(crate) fn fixture(id: &str, minute: i64) -> Quote {
    let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::minutes(minute);
    let draft = QuoteDraft::new(format!("quote number {}", id), "Someone", vec![]).unwrap();
    Quote::create(draft, uid("creator"), at).with_id(qid(id))
}

enum Op {
    Add(QuoteId, UserId),
    Remove(QuoteId, UserId),
}

struct FakeTx {
    inner: Arc<Inner>,
    snapshot: BTreeMap<QuoteId, Quote>,
    ops: Vec<Op>,
}

#[async_trait]
impl QuoteStore for FakeStore {
    async fn begin(&self) -> Result<Box<dyn QuoteTransaction>, StoreError> {
        let snapshot = self.inner.quotes.lock().unwrap().clone();
        Ok(Box::new(FakeTx {
            inner: self.inner.clone(),
            snapshot,
            ops: Vec::new(),
        }))
    }

    async fn insert(&self, quote: Quote) -> Result<(), StoreError> {
        let mut quotes = self.inner.quotes.lock().unwrap();
        if quotes.contains_key(&quote.id) {
            return Err(StoreError::DuplicateQuote(quote.id));
        }
        quotes.insert(quote.id.clone(), quote);
        Ok(())
    }

    async fn remove(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        Ok(self.inner.quotes.lock().unwrap().remove(id))
    }

    async fn get(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        Ok(self.inner.quotes.lock().unwrap().get(id).cloned())
    }

    async fn get_many(&self, ids: &[QuoteId]) -> Result<Vec<Quote>, StoreError> {
        let quotes = self.inner.quotes.lock().unwrap();
        Ok(ids.iter().filter_map(|id| quotes.get(id).cloned()).collect())
    }

    async fn snapshot(&self) -> Result<Vec<Quote>, StoreError> {
        Ok(self.inner.quotes.lock().unwrap().values().cloned().collect())
    }
}

#[async_trait]
impl QuoteTransaction for FakeTx {
    async fn quote_exists(&mut self, id: &QuoteId) -> Result<bool, StoreError> {
        Ok(self.snapshot.contains_key(id))
    }

    async fn active_vote_of(&mut self, user: &UserId) -> Result<Option<QuoteId>, StoreError> {
        Ok(self
            .snapshot
            .values()
            .find(|q| q.has_voter(user))
            .map(|q| q.id.clone()))
    }

    fn increment_and_add_voter(&mut self, id: &QuoteId, user: &UserId) {
        self.ops.push(Op::Add(id.clone(), user.clone()));
    }

    fn decrement_and_remove_voter(&mut self, id: &QuoteId, user: &UserId) {
        self.ops.push(Op::Remove(id.clone(), user.clone()));
    }

    async fn commit(self: Box<Self>) -> Result<CommitReceipt, StoreError> {
        if self
            .inner
            .forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(StoreError::Conflict);
        }

        let mut quotes = self.inner.quotes.lock().unwrap();
        let mut staged = quotes.clone();
        let mut receipt = CommitReceipt::default();
        let now = Utc::now();
        for op in &self.ops {
            let (id, applied) = match op {
                Op::Add(id, user) => {
                    let q = staged
                        .get_mut(id)
                        .ok_or_else(|| StoreError::QuoteNotFound(id.clone()))?;
                    (id, q.add_voter(user.clone(), now))
                }
                Op::Remove(id, user) => {
                    let q = staged
                        .get_mut(id)
                        .ok_or_else(|| StoreError::QuoteNotFound(id.clone()))?;
                    (id, q.remove_voter(user, now))
                }
            };
            if !applied {
                return Err(StoreError::Conflict);
            }
            receipt.record(id.clone(), staged[id].vote_count());
        }
        *quotes = staged;
        self.inner.commits.fetch_add(1, Ordering::SeqCst);
        Ok(receipt)
    }
}
