//! Sort criteria for the quote list.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a quote list is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Creation time, newest first (default)
    #[default]
    Newest,
    /// Creation time, oldest first
    Oldest,
    /// Vote count descending, newer quote wins ties
    MostVoted,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Oldest => "oldest",
            SortKey::MostVoted => "most_voted",
        }
    }
}

impl FromStr for SortKey {
    type Err = DomainError;

    /// Accepts the canonical names plus the legacy query values
    /// `date_desc`, `date_asc` and `votes`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "newest" | "date_desc" => Ok(SortKey::Newest),
            "oldest" | "date_asc" => Ok(SortKey::Oldest),
            "most_voted" | "mostvoted" | "most-voted" | "votes" => Ok(SortKey::MostVoted),
            _ => Err(DomainError::InvalidSortKey(s.to_string())),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
