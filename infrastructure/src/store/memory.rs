//! In-memory quote store with optimistic transactions.
//!
//! Each user has a slot in a vote index holding the quote they currently vote
//! for and a version token. A transaction remembers the version of every slot
//! it read; commit takes the write lock, rejects the transaction with
//! [`StoreError::Conflict`] if any of those versions moved, stages the
//! buffered primitives on copies of the touched quotes, and only then
//! publishes them together with the bumped versions.
//!
//! Counters are never written from values read earlier in the transaction:
//! the increment and decrement primitives run against the committed quote
//! under the lock, so concurrent votes by different users on the same quote
//! (disjoint read sets) both apply.
//!
//! A store opened on a snapshot file shares that file with other processes.
//! Every write takes the file's writer lock and first catches up with the
//! generation on disk; users whose vote moved in the meantime get their slot
//! version bumped, which turns stale transactions into conflicts. Disk work
//! runs on tokio's blocking pool.

use super::snapshot::{SnapshotData, SnapshotFile};
use async_trait::async_trait;
use chrono::Utc;
use ledger_application::{CommitReceipt, QuoteStore, QuoteTransaction, StoreError};
use ledger_domain::{Quote, QuoteId, UserId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info, warn};

/// A user's entry in the vote index.
#[derive(Debug, Clone, Default)]
struct VoteSlot {
    quote: Option<QuoteId>,
    version: u64,
}

#[derive(Debug, Clone, Default)]
struct State {
    quotes: BTreeMap<QuoteId, Quote>,
    slots: HashMap<UserId, VoteSlot>,
    /// Snapshot generation this state reflects.
    generation: u64,
}

impl State {
    /// Build state from persisted quotes, rejecting data that breaks the
    /// vote invariants.
    fn from_quotes(quotes: Vec<Quote>) -> Result<Self, StoreError> {
        let mut state = State::default();
        for quote in quotes {
            if !quote.is_consistent() {
                return Err(StoreError::Unavailable(format!(
                    "quote {} has a vote count that does not match its voters",
                    quote.id
                )));
            }
            for voter in quote.voters() {
                let slot = state.slots.entry(voter.clone()).or_default();
                if let Some(other) = &slot.quote {
                    return Err(StoreError::Unavailable(format!(
                        "user {} votes for both {} and {}",
                        voter, other, quote.id
                    )));
                }
                slot.quote = Some(quote.id.clone());
            }
            state.quotes.insert(quote.id.clone(), quote);
        }
        Ok(state)
    }

    /// Adopt a snapshot written by another process.
    ///
    /// Every user whose active vote differs gets a version bump, so
    /// transactions that read the old slot fail validation.
    fn catch_up(&mut self, data: SnapshotData) -> Result<(), StoreError> {
        if data.generation == self.generation {
            return Ok(());
        }
        let mut fresh = State::from_quotes(data.quotes)?;
        let users: HashSet<UserId> = self
            .slots
            .keys()
            .chain(fresh.slots.keys())
            .cloned()
            .collect();

        let mut moved = 0;
        for user in users {
            let before = self.slots.get(&user).cloned().unwrap_or_default();
            let slot = fresh.slots.entry(user).or_default();
            slot.version = before.version;
            if slot.quote != before.quote {
                slot.version += 1;
                moved += 1;
            }
        }
        debug!(
            "Caught up with snapshot generation {} -> {} ({} vote slots moved)",
            self.generation, data.generation, moved
        );
        fresh.generation = data.generation;
        *self = fresh;
        Ok(())
    }

    fn version_of(&self, user: &UserId) -> u64 {
        self.slots.get(user).map_or(0, |s| s.version)
    }

    fn active_vote_of(&self, user: &UserId) -> Option<&QuoteId> {
        self.slots.get(user).and_then(|s| s.quote.as_ref())
    }
}

/// Mutation primitive buffered by a transaction.
#[derive(Debug, Clone)]
enum Primitive {
    IncrementAndAddVoter(QuoteId, UserId),
    DecrementAndRemoveVoter(QuoteId, UserId),
}

/// Result of staging a transaction against the committed state.
struct Staged {
    quotes: BTreeMap<QuoteId, Quote>,
    slots: HashMap<UserId, Option<QuoteId>>,
}

struct Shared {
    state: RwLock<State>,
    snapshot: Option<SnapshotFile>,
}

impl Shared {
    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }

    /// Bring `state` up to date with the snapshot file, if any.
    fn sync(&self, state: &mut State) -> Result<(), StoreError> {
        match &self.snapshot {
            Some(file) => state.catch_up(file.load()?),
            None => Ok(()),
        }
    }

    /// Catch up with the snapshot file without writing.
    fn refresh(&self) -> Result<(), StoreError> {
        let mut guard = self.write()?;
        self.sync(&mut guard)
    }

    /// Run `op` on the current state, then persist and publish the state it
    /// returns. `None` leaves the store as it is.
    ///
    /// The file lock is held from catch-up to the write, so writers in other
    /// processes take turns. On a persistence failure the published state is
    /// left untouched.
    fn mutate<T>(
        &self,
        op: impl FnOnce(&State) -> Result<(T, Option<State>), StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.write()?;
        let _file_lock = self.snapshot.as_ref().map(SnapshotFile::lock).transpose()?;
        self.sync(&mut guard)?;

        let (value, next) = op(&guard)?;
        if let Some(mut next) = next {
            if let Some(file) = &self.snapshot {
                next.generation = guard.generation + 1;
                file.write(next.generation, next.quotes.values())?;
            }
            *guard = next;
        }
        Ok(value)
    }
}

/// Run store work that may block on disk I/O or the file lock.
async fn on_blocking_pool<T, F>(shared: &Arc<Shared>, work: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce(&Shared) -> Result<T, StoreError> + Send + 'static,
{
    let shared = shared.clone();
    tokio::task::spawn_blocking(move || work(&shared))
        .await
        .map_err(|e| StoreError::Unavailable(format!("store task failed: {}", e)))?
}

/// Optimistic, snapshot-validated quote store.
#[derive(Clone)]
pub struct InMemoryQuoteStore {
    shared: Arc<Shared>,
}

impl Default for InMemoryQuoteStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryQuoteStore {
    /// Empty, non-persistent store.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State::default()),
                snapshot: None,
            }),
        }
    }

    /// Open a store backed by `file`, loading whatever it already holds.
    pub fn open(file: SnapshotFile) -> Result<Self, StoreError> {
        let data = file.load()?;
        let generation = data.generation;
        let mut state = State::from_quotes(data.quotes)?;
        state.generation = generation;
        info!(
            "Opened quote store {} ({} quotes, generation {})",
            file.path().display(),
            state.quotes.len(),
            generation
        );
        Ok(Self {
            shared: Arc::new(Shared {
                state: RwLock::new(state),
                snapshot: Some(file),
            }),
        })
    }

    /// Non-persistent store pre-filled with `quotes`.
    pub fn with_quotes(quotes: Vec<Quote>) -> Result<Self, StoreError> {
        Ok(Self {
            shared: Arc::new(Shared {
                state: RwLock::new(State::from_quotes(quotes)?),
                snapshot: None,
            }),
        })
    }
}

#[async_trait]
impl QuoteStore for InMemoryQuoteStore {
    async fn begin(&self) -> Result<Box<dyn QuoteTransaction>, StoreError> {
        if self.shared.snapshot.is_some() {
            on_blocking_pool(&self.shared, Shared::refresh).await?;
        }
        Ok(Box::new(InMemoryTransaction {
            shared: self.shared.clone(),
            observed: HashMap::new(),
            primitives: Vec::new(),
        }))
    }

    async fn insert(&self, quote: Quote) -> Result<(), StoreError> {
        on_blocking_pool(&self.shared, move |shared| {
            shared.mutate(|state| {
                if state.quotes.contains_key(&quote.id) {
                    return Err(StoreError::DuplicateQuote(quote.id.clone()));
                }
                // Inserted quotes are fresh; reject anything already carrying votes.
                if quote.vote_count() != 0 {
                    return Err(StoreError::Unavailable(format!(
                        "refusing to insert quote {} with existing votes",
                        quote.id
                    )));
                }

                let mut next = state.clone();
                next.quotes.insert(quote.id.clone(), quote);
                Ok(((), Some(next)))
            })
        })
        .await
    }

    async fn remove(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        let id = id.clone();
        on_blocking_pool(&self.shared, move |shared| {
            shared.mutate(|state| {
                if !state.quotes.contains_key(&id) {
                    return Ok((None, None));
                }
                let mut next = state.clone();
                let removed = next.quotes.remove(&id);
                if let Some(quote) = &removed {
                    for voter in quote.voters() {
                        let slot = next.slots.entry(voter.clone()).or_default();
                        slot.quote = None;
                        slot.version += 1;
                    }
                    debug!(
                        "Removed quote {}, released {} votes",
                        id,
                        quote.vote_count()
                    );
                }
                Ok((removed, Some(next)))
            })
        })
        .await
    }

    async fn get(&self, id: &QuoteId) -> Result<Option<Quote>, StoreError> {
        Ok(self.shared.read()?.quotes.get(id).cloned())
    }

    async fn get_many(&self, ids: &[QuoteId]) -> Result<Vec<Quote>, StoreError> {
        let guard = self.shared.read()?;
        Ok(ids
            .iter()
            .filter_map(|id| guard.quotes.get(id).cloned())
            .collect())
    }

    async fn snapshot(&self) -> Result<Vec<Quote>, StoreError> {
        Ok(self.shared.read()?.quotes.values().cloned().collect())
    }
}

/// Transaction over an [`InMemoryQuoteStore`].
struct InMemoryTransaction {
    shared: Arc<Shared>,
    /// Slot versions this transaction based its decisions on.
    observed: HashMap<UserId, u64>,
    primitives: Vec<Primitive>,
}

impl InMemoryTransaction {
    fn validate(&self, state: &State) -> Result<(), StoreError> {
        for (user, version) in &self.observed {
            let current = state.version_of(user);
            if current != *version {
                debug!(
                    "Conflict: vote slot of {} moved from version {} to {}",
                    user, version, current
                );
                return Err(StoreError::Conflict);
            }
        }
        Ok(())
    }

    fn stage(&self, state: &State) -> Result<Staged, StoreError> {
        let now = Utc::now();
        let mut staged = Staged {
            quotes: BTreeMap::new(),
            slots: HashMap::new(),
        };

        for primitive in &self.primitives {
            let (id, user) = match primitive {
                Primitive::IncrementAndAddVoter(id, user)
                | Primitive::DecrementAndRemoveVoter(id, user) => (id, user),
            };
            if !staged.quotes.contains_key(id) {
                let quote = state
                    .quotes
                    .get(id)
                    .ok_or_else(|| StoreError::QuoteNotFound(id.clone()))?;
                staged.quotes.insert(id.clone(), quote.clone());
            }
            let quote = staged
                .quotes
                .get_mut(id)
                .ok_or_else(|| StoreError::QuoteNotFound(id.clone()))?;
            let current = staged
                .slots
                .get(user)
                .cloned()
                .unwrap_or_else(|| state.active_vote_of(user).cloned());

            match primitive {
                Primitive::IncrementAndAddVoter(..) => {
                    if current.is_some() || !quote.add_voter(user.clone(), now) {
                        return Err(StoreError::Conflict);
                    }
                    staged.slots.insert(user.clone(), Some(id.clone()));
                }
                Primitive::DecrementAndRemoveVoter(..) => {
                    if current.as_ref() != Some(id) || !quote.remove_voter(user, now) {
                        return Err(StoreError::Conflict);
                    }
                    staged.slots.insert(user.clone(), None);
                }
            }
        }
        Ok(staged)
    }
}

#[async_trait]
impl QuoteTransaction for InMemoryTransaction {
    async fn quote_exists(&mut self, id: &QuoteId) -> Result<bool, StoreError> {
        Ok(self.shared.read()?.quotes.contains_key(id))
    }

    async fn active_vote_of(&mut self, user: &UserId) -> Result<Option<QuoteId>, StoreError> {
        let guard = self.shared.read()?;
        let version = guard.version_of(user);
        let quote = guard.active_vote_of(user).cloned();
        drop(guard);

        // Re-reading a slot must see the version already observed.
        match self.observed.get(user) {
            Some(seen) if *seen != version => return Err(StoreError::Conflict),
            Some(_) => {}
            None => {
                self.observed.insert(user.clone(), version);
            }
        }
        Ok(quote)
    }

    fn increment_and_add_voter(&mut self, id: &QuoteId, user: &UserId) {
        self.primitives
            .push(Primitive::IncrementAndAddVoter(id.clone(), user.clone()));
    }

    fn decrement_and_remove_voter(&mut self, id: &QuoteId, user: &UserId) {
        self.primitives
            .push(Primitive::DecrementAndRemoveVoter(id.clone(), user.clone()));
    }

    async fn commit(self: Box<Self>) -> Result<CommitReceipt, StoreError> {
        let shared = self.shared.clone();
        let result = on_blocking_pool(&shared, move |shared| {
            shared.mutate(|state| {
                self.validate(state)?;
                let staged = self.stage(state)?;

                let mut receipt = CommitReceipt::default();
                let mut next = state.clone();
                for (id, quote) in staged.quotes {
                    receipt.record(id.clone(), quote.vote_count());
                    next.quotes.insert(id, quote);
                }
                for (user, quote) in staged.slots {
                    let slot = next.slots.entry(user).or_default();
                    slot.quote = quote;
                    slot.version += 1;
                }
                Ok((receipt, Some(next)))
            })
        })
        .await;

        if let Err(StoreError::Unavailable(reason)) = &result {
            warn!("Commit aborted: {}", reason);
        }
        result
    }
}
