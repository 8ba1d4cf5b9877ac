//! Console output formatter for quotes and vote results

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use ledger_domain::core::string::truncate;
use ledger_domain::{QuoteId, QuoteView, VoteOutcome};

/// Longest quote text shown in list rows before truncation.
const LIST_TEXT_CHARS: usize = 72;

/// Formats results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format a ranked list, one quote per row
    pub fn format_list(views: &[QuoteView]) -> String {
        if views.is_empty() {
            return format!("{}\n", "No quotes yet.".dimmed());
        }

        let mut output = String::new();
        for (rank, view) in views.iter().enumerate() {
            let marker = if view.voted_by_viewer {
                "★".yellow().bold().to_string()
            } else {
                " ".to_string()
            };
            output.push_str(&format!(
                "{:>3}. {} {} {}\n",
                rank + 1,
                marker,
                Self::votes_badge(view.vote_count),
                truncate(&view.text, LIST_TEXT_CHARS)
            ));
            output.push_str(&format!(
                "          {} {}\n",
                format!("— {}", view.author).cyan(),
                view.id.as_str().dimmed()
            ));
        }
        output
    }

    /// Format a single quote with all its fields
    pub fn format_detail(view: &QuoteView) -> String {
        let mut output = String::new();
        output.push_str(&format!("{}\n", Self::header(view.id.as_str())));
        output.push_str(&format!("\"{}\"\n", view.text.bold()));
        output.push_str(&format!("  {}\n\n", format!("— {}", view.author).cyan()));

        output.push_str(&format!(
            "{} {}\n",
            "Votes:".cyan().bold(),
            view.vote_count
        ));
        if view.voted_by_viewer {
            output.push_str(&format!("{}\n", "You voted for this quote.".yellow()));
        }
        if !view.tags.is_empty() {
            output.push_str(&format!(
                "{} {}\n",
                "Tags:".cyan().bold(),
                view.tags.join(", ")
            ));
        }
        if let Some(url) = &view.avatar_url {
            output.push_str(&format!("{} {}\n", "Avatar:".cyan().bold(), url));
        }
        output.push_str(&format!(
            "{} {} by {}\n",
            "Created:".cyan().bold(),
            view.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            view.created_by
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Updated:".cyan().bold(),
            view.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        output
    }

    /// Format a vote or unvote result
    pub fn format_outcome(outcome: &VoteOutcome) -> String {
        let action = if outcome.voted {
            "Voted for".green().bold()
        } else {
            "Withdrew vote from".yellow().bold()
        };
        format!(
            "{} {} ({})\n",
            action,
            outcome.quote_id,
            Self::votes_badge(outcome.new_vote_count)
        )
    }

    /// Confirm a deleted quote
    pub fn format_deleted(id: &QuoteId) -> String {
        format!("{} {}\n", "Deleted".red().bold(), id)
    }

    fn votes_badge(count: u64) -> String {
        let label = if count == 1 { "vote" } else { "votes" };
        format!("[{:>3} {}]", count, label).green().to_string()
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_list(&self, views: &[QuoteView]) -> String {
        Self::format_list(views)
    }

    fn format_detail(&self, view: &QuoteView) -> String {
        Self::format_detail(view)
    }

    fn format_outcome(&self, outcome: &VoteOutcome) -> String {
        Self::format_outcome(outcome)
    }

    fn format_deleted(&self, id: &QuoteId) -> String {
        Self::format_deleted(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn view(id: &str, votes: u64, voted: bool) -> QuoteView {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        QuoteView {
            id: id.parse().unwrap(),
            text: "Make it work, make it right, make it fast.".to_string(),
            author: "Kent Beck".to_string(),
            avatar_url: None,
            tags: vec!["craft".to_string()],
            vote_count: votes,
            voted_by_viewer: voted,
            created_at: at,
            updated_at: at,
            created_by: "kent".parse().unwrap(),
        }
    }

    #[test]
    fn test_list_rows_and_marker() {
        colored::control::set_override(false);
        let out = ConsoleFormatter::format_list(&[view("q1", 3, true), view("q2", 1, false)]);

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("  1. ★ [  3 votes]"));
        assert!(lines[2].starts_with("  2.   [  1 vote]"));
        assert!(lines[3].contains("q2"));
    }

    #[test]
    fn test_empty_list() {
        colored::control::set_override(false);
        assert_eq!(ConsoleFormatter::format_list(&[]), "No quotes yet.\n");
    }

    #[test]
    fn test_detail_mentions_viewer_vote() {
        colored::control::set_override(false);
        let out = ConsoleFormatter::format_detail(&view("q1", 3, true));
        assert!(out.contains("Votes: 3"));
        assert!(out.contains("You voted for this quote."));
        assert!(out.contains("Tags: craft"));
        assert!(out.contains("Created: 2025-03-01 12:00:00 UTC by kent"));
    }

    #[test]
    fn test_outcome_line() {
        colored::control::set_override(false);
        let outcome = VoteOutcome {
            quote_id: "q9".parse().unwrap(),
            new_vote_count: 0,
            voted: false,
        };
        assert_eq!(
            ConsoleFormatter::format_outcome(&outcome),
            "Withdrew vote from q9 ([  0 votes])\n"
        );
    }
}
