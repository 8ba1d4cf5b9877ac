//! Output format value object

use serde::{Deserialize, Serialize};

/// Output format for command results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table (default)
    #[default]
    Table,
    /// JSON output
    Json,
}
