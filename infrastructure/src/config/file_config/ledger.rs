//! Ledger configuration from TOML (`[ledger]` section)

use ledger_application::LedgerParams;
use ledger_domain::{ConfigIssue, ConfigIssueCode, Severity};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Attempts above this are allowed but usually hide a hot spot.
const HIGH_ATTEMPTS: usize = 20;

/// Raw ledger configuration from TOML
///
/// # Example
///
/// ```toml
/// [ledger]
/// max_attempts = 3   # total tries per vote before reporting contention
/// backoff_ms = 5     # linear backoff step between tries
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLedgerConfig {
    pub max_attempts: usize,
    pub backoff_ms: u64,
}

impl Default for FileLedgerConfig {
    fn default() -> Self {
        let params = LedgerParams::default();
        Self {
            max_attempts: params.max_attempts,
            backoff_ms: params.backoff.as_millis() as u64,
        }
    }
}

impl FileLedgerConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.max_attempts == 0 {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                code: ConfigIssueCode::OutOfRange {
                    field: "ledger.max_attempts".to_string(),
                    value: "0".to_string(),
                },
                message: "ledger.max_attempts must be at least 1".to_string(),
            });
        } else if self.max_attempts > HIGH_ATTEMPTS {
            issues.push(ConfigIssue {
                severity: Severity::Warning,
                code: ConfigIssueCode::OutOfRange {
                    field: "ledger.max_attempts".to_string(),
                    value: self.max_attempts.to_string(),
                },
                message: format!(
                    "ledger.max_attempts = {} is unusually high",
                    self.max_attempts
                ),
            });
        }
        issues
    }

    pub fn to_params(&self) -> LedgerParams {
        LedgerParams::default()
            .with_max_attempts(self.max_attempts)
            .with_backoff(Duration::from_millis(self.backoff_ms))
    }
}
