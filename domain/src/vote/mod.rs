//! Vote results.

use crate::quote::value_objects::{QuoteId, UserId};
use serde::{Deserialize, Serialize};

/// Result of a vote mutation as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub quote_id: QuoteId,
    pub new_vote_count: u64,
    pub voted: bool,
}

/// What a committed vote mutation did to a user's active vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteChange {
    /// The user had no active vote and now votes for `quote`.
    Cast { user: UserId, quote: QuoteId },
    /// The user's vote moved from `from` to `to`.
    Transferred {
        user: UserId,
        from: QuoteId,
        to: QuoteId,
    },
    /// The user's vote on `quote` was withdrawn.
    Withdrawn { user: UserId, quote: QuoteId },
}

impl VoteChange {
    pub fn event_type(&self) -> &'static str {
        match self {
            VoteChange::Cast { .. } => "vote_cast",
            VoteChange::Transferred { .. } => "vote_transferred",
            VoteChange::Withdrawn { .. } => "vote_withdrawn",
        }
    }

    pub fn user(&self) -> &UserId {
        match self {
            VoteChange::Cast { user, .. }
            | VoteChange::Transferred { user, .. }
            | VoteChange::Withdrawn { user, .. } => user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_camel_case() {
        let outcome = VoteOutcome {
            quote_id: "q1".parse().unwrap(),
            new_vote_count: 3,
            voted: true,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"quoteId": "q1", "newVoteCount": 3, "voted": true})
        );
    }

    #[test]
    fn test_event_types() {
        let user = UserId::new("u").unwrap();
        let q: QuoteId = "q".parse().unwrap();
        let change = VoteChange::Transferred {
            user: user.clone(),
            from: q.clone(),
            to: q.clone(),
        };
        assert_eq!(change.event_type(), "vote_transferred");
        assert_eq!(change.user(), &user);
        assert_eq!(
            VoteChange::Withdrawn { user, quote: q }.event_type(),
            "vote_withdrawn"
        );
    }
}
