//! `[output]` section: how command results are rendered.

use ledger_domain::OutputFormat;
use serde::{Deserialize, Serialize};

/// Rendering preferences.
///
/// # Example
///
/// ```toml
/// [output]
/// format = "json"   # table (default) or json
/// color = false     # plain text even on a terminal
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Preferred format when the command line does not pick one.
    pub format: Option<OutputFormat>,
    /// Colorize table output.
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
        }
    }
}

impl FileOutputConfig {
    /// `requested` (from the command line) wins over the configured format.
    pub fn resolve_format(&self, requested: Option<OutputFormat>) -> OutputFormat {
        requested.or(self.format).unwrap_or_default()
    }

    /// Whether to colorize, given the `--no-color` flag.
    pub fn use_color(&self, no_color_flag: bool) -> bool {
        self.color && !no_color_flag
    }
}
