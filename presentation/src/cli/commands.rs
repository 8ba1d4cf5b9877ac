//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use ledger_domain::SortKey;
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable listing
    Table,
    /// JSON output
    Json,
}

impl From<ledger_domain::OutputFormat> for OutputFormat {
    fn from(format: ledger_domain::OutputFormat) -> Self {
        match format {
            ledger_domain::OutputFormat::Table => OutputFormat::Table,
            ledger_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

impl From<OutputFormat> for ledger_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Table => ledger_domain::OutputFormat::Table,
            OutputFormat::Json => ledger_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for quote-ledger
#[derive(Parser, Debug)]
#[command(name = "quote-ledger")]
#[command(author, version, about = "Quote board where every user holds a single vote")]
#[command(long_about = r#"
quote-ledger keeps a board of short quotes. Each user holds at most one vote
across the whole board: voting for another quote moves the vote there.

Configuration files are loaded from (in priority order):
1. QUOTE_LEDGER_* environment variables
2. --config <path>                         Explicit config file
3. ./quote-ledger.toml                     Project-level config
4. ~/.config/quote-ledger/config.toml      Global config

Example:
  quote-ledger --user alice add "Simplicity is prerequisite for reliability" --author Dijkstra
  quote-ledger --user bob vote 1f0c...
  quote-ledger --user bob list --sort most-voted
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Acting user id (required for mutations, optional for reads)
    #[arg(short, long, global = true, value_name = "USER_ID")]
    pub user: Option<String>,

    /// Output format (overrides [output] format)
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Snapshot file to use instead of [store] path
    #[arg(long, global = true, value_name = "PATH")]
    pub store: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Submit a new quote
    Add {
        /// Quote text (at least 5 characters)
        text: String,
        /// Display name of the author
        #[arg(short, long, default_value = "")]
        author: String,
        /// Tag to attach (repeatable)
        #[arg(short, long = "tag", value_name = "TAG")]
        tags: Vec<String>,
        /// Avatar image URL
        #[arg(long, value_name = "URL")]
        avatar_url: Option<String>,
    },
    /// Vote for a quote, moving any existing vote
    Vote {
        quote_id: String,
    },
    /// Withdraw your vote from a quote
    Unvote {
        quote_id: String,
    },
    /// List quotes
    List {
        /// newest, oldest or most-voted (also: date_desc, date_asc, votes)
        #[arg(short, long, default_value = "newest")]
        sort: SortKey,
        /// Only quotes whose text or author contains this (case-insensitive)
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one or more quotes
    Show {
        #[arg(required = true)]
        quote_ids: Vec<String>,
    },
    /// List quotes you created
    Mine,
    /// Delete a quote you created
    Delete {
        quote_id: String,
    },
}

impl Command {
    /// Whether the command changes the store.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Command::Add { .. } | Command::Vote { .. } | Command::Unvote { .. } | Command::Delete { .. }
        )
    }
}
