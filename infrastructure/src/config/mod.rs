//! Configuration file loading for quote-ledger
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `QUOTE_LEDGER_*` environment variables (e.g. `QUOTE_LEDGER_LEDGER__MAX_ATTEMPTS=5`)
//! 2. `--config <path>` specified file
//! 3. Project root: `./quote-ledger.toml` or `./.quote-ledger.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/quote-ledger/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLedgerConfig, FileLoggingConfig, FileOutputConfig,
    FileStoreConfig,
};
pub use loader::ConfigLoader;
