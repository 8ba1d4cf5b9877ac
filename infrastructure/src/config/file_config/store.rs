//! Store configuration from TOML (`[store]` section)

use ledger_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw store configuration from TOML
///
/// # Example
///
/// ```toml
/// [store]
/// path = "~/.local/share/quote-ledger/quotes.json"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileStoreConfig {
    /// JSON snapshot file. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl FileStoreConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        match &self.path {
            Some(path) if path.as_os_str().is_empty() => vec![ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::EmptyPath {
                    field: "store.path".to_string(),
                },
                message: "store.path is set but empty".to_string(),
            }],
            _ => vec![],
        }
    }
}
