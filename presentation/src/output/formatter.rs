//! Output formatter trait

use ledger_domain::{QuoteId, QuoteView, VoteOutcome};

/// Trait for formatting command results
pub trait OutputFormatter {
    /// Format a ranked list of quotes
    fn format_list(&self, views: &[QuoteView]) -> String;

    /// Format a single quote in detail
    fn format_detail(&self, view: &QuoteView) -> String;

    /// Format the result of a vote or unvote
    fn format_outcome(&self, outcome: &VoteOutcome) -> String;

    /// Confirm a deleted quote
    fn format_deleted(&self, id: &QuoteId) -> String;
}

/// Formats everything as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_list(&self, views: &[QuoteView]) -> String {
        Self::to_json(views)
    }

    fn format_detail(&self, view: &QuoteView) -> String {
        Self::to_json(view)
    }

    fn format_outcome(&self, outcome: &VoteOutcome) -> String {
        Self::to_json(outcome)
    }

    fn format_deleted(&self, id: &QuoteId) -> String {
        Self::to_json(&serde_json::json!({ "deleted": id }))
    }
}
