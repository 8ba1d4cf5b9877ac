//! Quote store adapters.
//!
//! Provides [`InMemoryQuoteStore`], an optimistic transactional store that
//! implements the [`QuoteStore`](ledger_application::QuoteStore) port, with
//! optional persistence to a JSON snapshot file.

mod memory;
mod snapshot;

pub use memory::InMemoryQuoteStore;
pub use snapshot::{SnapshotData, SnapshotFile, SnapshotLock};
