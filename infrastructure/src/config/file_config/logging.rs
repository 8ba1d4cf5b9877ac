//! Logging configuration from TOML (`[logging]` section)

use ledger_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw logging configuration from TOML
///
/// # Example
///
/// ```toml
/// [logging]
/// file = "~/.local/state/quote-ledger/ledger.log"       # tracing output
/// vote_log = "~/.local/state/quote-ledger/votes.jsonl"  # audit trail
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write diagnostic logs to this file instead of stderr.
    pub file: Option<PathBuf>,
    /// Append every committed vote mutation to this JSONL file.
    pub vote_log: Option<PathBuf>,
}

impl FileLoggingConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        [("logging.file", &self.file), ("logging.vote_log", &self.vote_log)]
            .into_iter()
            .filter(|(_, path)| matches!(path, Some(p) if p.as_os_str().is_empty()))
            .map(|(field, _)| ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::EmptyPath {
                    field: field.to_string(),
                },
                message: format!("{} is empty and will be ignored", field),
            })
            .collect()
    }
}
