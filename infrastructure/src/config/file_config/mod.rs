//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod ledger;
mod logging;
mod output;
mod store;

pub use ledger::FileLedgerConfig;
pub use logging::FileLoggingConfig;
pub use output::FileOutputConfig;
pub use store::FileStoreConfig;

use ledger_domain::{ConfigIssue, Severity};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a configuration contains at least one error-level issue.
#[derive(Error, Debug)]
#[error("invalid configuration: {}", summarize(.issues))]
pub struct ConfigValidationError {
    pub issues: Vec<ConfigIssue>,
}

fn summarize(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(|i| i.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Snapshot storage settings
    pub store: FileStoreConfig,
    /// Vote ledger retry settings
    pub ledger: FileLedgerConfig,
    /// Diagnostic and audit logging
    pub logging: FileLoggingConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.store.validate());
        issues.extend(self.ledger.validate());
        issues.extend(self.logging.validate());
        issues
    }

    /// Split issues into a hard error (if any error-level issue exists) and
    /// the remaining warnings.
    pub fn check(&self) -> Result<Vec<ConfigIssue>, ConfigValidationError> {
        let (errors, warnings): (Vec<_>, Vec<_>) =
            self.validate().into_iter().partition(|i| i.severity == Severity::Error);
        if errors.is_empty() {
            Ok(warnings)
        } else {
            Err(ConfigValidationError { issues: errors })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_domain::{ConfigIssueCode, OutputFormat};
    use std::path::PathBuf;

    #[test]
    fn test_deserialize_full_config() {
        let toml_str = r#"
[store]
path = "~/.local/share/quote-ledger/quotes.json"

[ledger]
max_attempts = 5
backoff_ms = 20

[logging]
file = "/var/log/quote-ledger.log"
vote_log = "/var/log/votes.jsonl"

[output]
format = "json"
color = false
"#;

        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(
            config.store.path,
            Some(PathBuf::from("~/.local/share/quote-ledger/quotes.json"))
        );
        assert_eq!(config.ledger.max_attempts, 5);
        assert_eq!(config.ledger.backoff_ms, 20);
        assert_eq!(
            config.logging.vote_log,
            Some(PathBuf::from("/var/log/votes.jsonl"))
        );
        assert_eq!(config.output.format, Some(OutputFormat::Json));
        assert!(!config.output.color);
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: FileConfig = toml::from_str("[ledger]\nmax_attempts = 4\n").unwrap();
        assert_eq!(config.ledger.max_attempts, 4);
        assert_eq!(config.ledger.backoff_ms, 5);
        assert!(config.store.path.is_none());
        assert!(config.output.color);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(FileConfig::default().validate().is_empty());
        assert!(FileConfig::default().check().unwrap().is_empty());
    }

    #[test]
    fn test_zero_attempts_is_an_error() {
        let mut config = FileConfig::default();
        config.ledger.max_attempts = 0;

        let err = config.check().unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert!(matches!(
            &err.issues[0].code,
            ConfigIssueCode::OutOfRange { field, .. } if field == "ledger.max_attempts"
        ));
        assert!(err.to_string().contains("max_attempts"));
    }
}
