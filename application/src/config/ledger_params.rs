//! Ledger parameters: retry policy for conflicting vote transactions.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry control for the vote ledger.
///
/// A transaction that fails validation is retried up to `max_attempts`
/// times in total, sleeping `backoff * attempt` between attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerParams {
    /// Total attempts per operation, including the first one. At least 1.
    pub max_attempts: usize,
    /// Base delay between attempts.
    pub backoff: Duration,
}

impl Default for LedgerParams {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(5),
        }
    }
}

impl LedgerParams {
    pub fn with_max_attempts(mut self, max: usize) -> Self {
        self.max_attempts = max.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    /// Delay before attempt number `attempt + 1` (`attempt` is 1-based).
    pub fn delay_after(&self, attempt: usize) -> Duration {
        self.backoff.saturating_mul(attempt as u32)
    }
}
