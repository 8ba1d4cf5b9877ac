//! Quote entity.

use super::value_objects::{QuoteDraft, QuoteId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A stored quote.
///
/// `votes` and `voted_by` move together: the only mutators are
/// [`Quote::add_voter`] and [`Quote::remove_voter`], which the store applies
/// as its atomic vote primitives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: QuoteId,
    pub text: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    votes: u64,
    voted_by: BTreeSet<UserId>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Create a fresh quote with no votes.
    pub fn create(draft: QuoteDraft, created_by: UserId, now: DateTime<Utc>) -> Self {
        let (text, author, avatar_url, tags) = draft.into_parts();
        Self {
            id: QuoteId::generate(),
            text,
            author,
            avatar_url,
            tags,
            votes: 0,
            voted_by: BTreeSet::new(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Override the generated id (fixtures and imports).
    pub fn with_id(mut self, id: QuoteId) -> Self {
        self.id = id;
        self
    }

    pub fn vote_count(&self) -> u64 {
        self.votes
    }

    pub fn has_voter(&self, user: &UserId) -> bool {
        self.voted_by.contains(user)
    }

    pub fn voters(&self) -> impl Iterator<Item = &UserId> {
        self.voted_by.iter()
    }

    /// `votes == |voted_by|`
    pub fn is_consistent(&self) -> bool {
        self.votes == self.voted_by.len() as u64
    }

    /// Increment the counter and add `user` to the voter set.
    ///
    /// Returns `false` without touching anything if `user` already voted here.
    pub fn add_voter(&mut self, user: UserId, now: DateTime<Utc>) -> bool {
        if !self.voted_by.insert(user) {
            return false;
        }
        self.votes += 1;
        self.updated_at = now;
        true
    }

    /// Decrement the counter and remove `user` from the voter set.
    ///
    /// Returns `false` without touching anything if `user` is not a voter.
    pub fn remove_voter(&mut self, user: &UserId, now: DateTime<Utc>) -> bool {
        if !self.voted_by.remove(user) {
            return false;
        }
        self.votes -= 1;
        self.updated_at = now;
        true
    }
}
