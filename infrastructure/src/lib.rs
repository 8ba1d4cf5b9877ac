//! Infrastructure layer for quote-ledger
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod logging;
pub mod store;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLedgerConfig, FileLoggingConfig,
    FileOutputConfig, FileStoreConfig,
};
pub use logging::JsonlVoteLogger;
pub use store::{InMemoryQuoteStore, SnapshotData, SnapshotFile};
