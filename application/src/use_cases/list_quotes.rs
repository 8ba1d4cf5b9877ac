//! Read use cases: ranked list, detail and "my quotes".
//!
//! These never mutate the store. The only failure is an unreachable store;
//! an unknown or absent viewer simply sees `voted_by_viewer == false`.

use crate::ports::quote_store::{QuoteStore, StoreError};
use ledger_domain::{ListQuery, QuoteId, QuoteView, SortKey, UserId, rank_quotes};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Errors from single-quote lookups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Quote with ID \"{0}\" not found")]
    QuoteNotFound(QuoteId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Projects stored quotes into ranked, per-viewer views.
#[derive(Clone)]
pub struct ListQuotesUseCase {
    store: Arc<dyn QuoteStore>,
}

impl ListQuotesUseCase {
    pub fn new(store: Arc<dyn QuoteStore>) -> Self {
        Self { store }
    }

    /// Every quote matching `query`, ordered by its sort key.
    pub async fn execute(&self, query: &ListQuery) -> Result<Vec<QuoteView>, StoreError> {
        let quotes = self.store.snapshot().await?;
        let views = rank_quotes(&quotes, query);
        debug!(
            "list: sort={} search={:?} -> {} of {} quotes",
            query.sort,
            query.search,
            views.len(),
            quotes.len()
        );
        Ok(views)
    }

    /// A single quote as seen by `viewer`.
    pub async fn get(
        &self,
        viewer: Option<&UserId>,
        id: &QuoteId,
    ) -> Result<QuoteView, QueryError> {
        let quote = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| QueryError::QuoteNotFound(id.clone()))?;
        Ok(QuoteView::project(&quote, viewer))
    }

    /// Several quotes as seen by `viewer`, in the order requested.
    ///
    /// Fails on the first id that does not exist.
    pub async fn get_many(
        &self,
        viewer: Option<&UserId>,
        ids: &[QuoteId],
    ) -> Result<Vec<QuoteView>, QueryError> {
        let quotes = self.store.get_many(ids).await?;
        ids.iter()
            .map(|id| {
                quotes
                    .iter()
                    .find(|q| &q.id == id)
                    .map(|q| QuoteView::project(q, viewer))
                    .ok_or_else(|| QueryError::QuoteNotFound(id.clone()))
            })
            .collect()
    }

    /// Quotes created by `user`, newest first.
    pub async fn list_mine(&self, user: &UserId) -> Result<Vec<QuoteView>, StoreError> {
        let quotes = self.store.snapshot().await?;
        let query = ListQuery::new(SortKey::Newest).with_viewer(user.clone());
        Ok(rank_quotes(
            quotes.iter().filter(|q| &q.created_by == user),
            &query,
        ))
    }
}
