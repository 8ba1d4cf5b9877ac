//! Ranked read projection.
//!
//! Pure transformation from stored quotes to ordered [`QuoteView`]s. Nothing
//! here mutates a quote.

use super::entities::Quote;
use super::sort::SortKey;
use super::value_objects::UserId;
use super::view::QuoteView;
use crate::core::string::contains_ignore_case;
use std::cmp::Ordering;

/// Parameters of a list query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    /// Viewer whose votes are reflected in `voted_by_viewer`; `None` for anonymous.
    pub viewer: Option<UserId>,
    pub sort: SortKey,
    /// Case-insensitive substring filter on text and author.
    pub search: Option<String>,
}

impl ListQuery {
    pub fn new(sort: SortKey) -> Self {
        Self {
            sort,
            ..Self::default()
        }
    }

    pub fn with_viewer(mut self, viewer: UserId) -> Self {
        self.viewer = Some(viewer);
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        let search = search.into();
        self.search = (!search.trim().is_empty()).then_some(search);
        self
    }

    fn matches(&self, quote: &Quote) -> bool {
        match self.search.as_deref().map(str::trim) {
            None => true,
            Some(needle) => {
                contains_ignore_case(&quote.text, needle)
                    || contains_ignore_case(&quote.author, needle)
            }
        }
    }
}

/// Order two quotes by `key`.
///
/// Every key falls back to the quote id so the order is total and repeated
/// queries over unchanged data return identical sequences.
pub fn compare(key: SortKey, a: &Quote, b: &Quote) -> Ordering {
    match key {
        SortKey::Newest => b
            .created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id)),
        SortKey::Oldest => a
            .created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id)),
        SortKey::MostVoted => b
            .vote_count()
            .cmp(&a.vote_count())
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id)),
    }
}

/// Filter, sort and project quotes for a viewer.
pub fn rank_quotes<'a, I>(quotes: I, query: &ListQuery) -> Vec<QuoteView>
where
    I: IntoIterator<Item = &'a Quote>,
{
    let mut selected: Vec<&Quote> = quotes.into_iter().filter(|q| query.matches(q)).collect();
    selected.sort_by(|a, b| compare(query.sort, a, b));
    selected
        .into_iter()
        .map(|q| QuoteView::project(q, query.viewer.as_ref()))
        .collect()
}
