//! Per-viewer quote projection.

use super::entities::Quote;
use super::value_objects::{QuoteId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What callers see of a quote.
///
/// The voter set never leaves the domain; only the viewer's own
/// membership is exposed as `voted_by_viewer`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteView {
    pub id: QuoteId,
    pub text: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub tags: Vec<String>,
    pub vote_count: u64,
    pub voted_by_viewer: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub created_by: UserId,
}

impl QuoteView {
    /// Project a quote for `viewer`. Without a viewer, `voted_by_viewer` is always `false`.
    pub fn project(quote: &Quote, viewer: Option<&UserId>) -> Self {
        Self {
            id: quote.id.clone(),
            text: quote.text.clone(),
            author: quote.author.clone(),
            avatar_url: quote.avatar_url.clone(),
            tags: quote.tags.clone(),
            vote_count: quote.vote_count(),
            voted_by_viewer: viewer.is_some_and(|v| quote.has_voter(v)),
            created_at: quote.created_at,
            updated_at: quote.updated_at,
            created_by: quote.created_by.clone(),
        }
    }
}
