//! Quote creation and deletion.
//!
//! Creation validates the draft and inserts a vote-less quote. Deletion is
//! restricted to the creator; the store takes care of releasing the active
//! votes that pointed at the deleted quote.

use crate::ports::quote_store::{QuoteStore, StoreError};
use crate::ports::vote_event_logger::{NoVoteEventLogger, VoteEvent, VoteEventLogger};
use chrono::Utc;
use ledger_domain::{DomainError, Quote, QuoteDraft, QuoteId, QuoteView, UserId};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateQuoteError {
    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeleteQuoteError {
    #[error("Quote with ID \"{0}\" not found")]
    QuoteNotFound(QuoteId),

    #[error("You are not authorized to delete quote \"{0}\"")]
    Forbidden(QuoteId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Input for [`CreateQuoteUseCase`].
#[derive(Debug, Clone)]
pub struct CreateQuoteInput {
    pub user: UserId,
    pub text: String,
    /// Display name; falls back to "Anonymous" when empty.
    pub author: String,
    pub avatar_url: Option<String>,
    pub tags: Vec<String>,
}

impl CreateQuoteInput {
    pub fn new(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            text: text.into(),
            author: String::new(),
            avatar_url: None,
            tags: Vec::new(),
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

#[derive(Clone)]
pub struct CreateQuoteUseCase {
    store: Arc<dyn QuoteStore>,
    event_logger: Arc<dyn VoteEventLogger>,
}

impl CreateQuoteUseCase {
    pub fn new(store: Arc<dyn QuoteStore>) -> Self {
        Self {
            store,
            event_logger: Arc::new(NoVoteEventLogger),
        }
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn VoteEventLogger>) -> Self {
        self.event_logger = logger;
        self
    }

    pub async fn execute(&self, input: CreateQuoteInput) -> Result<QuoteView, CreateQuoteError> {
        let mut draft = QuoteDraft::new(input.text, input.author, input.tags)?;
        if let Some(url) = input.avatar_url {
            draft = draft.with_avatar_url(url);
        }

        let quote = Quote::create(draft, input.user.clone(), Utc::now());
        let view = QuoteView::project(&quote, Some(&input.user));
        self.store.insert(quote).await?;

        info!(user = %input.user, quote = %view.id, "quote_created");
        self.event_logger.log(VoteEvent::new(
            "quote_created",
            json!({ "user": input.user, "quote": view.id }),
        ));
        Ok(view)
    }
}

#[derive(Clone)]
pub struct DeleteQuoteUseCase {
    store: Arc<dyn QuoteStore>,
    event_logger: Arc<dyn VoteEventLogger>,
}

impl DeleteQuoteUseCase {
    pub fn new(store: Arc<dyn QuoteStore>) -> Self {
        Self {
            store,
            event_logger: Arc::new(NoVoteEventLogger),
        }
    }

    pub fn with_event_logger(mut self, logger: Arc<dyn VoteEventLogger>) -> Self {
        self.event_logger = logger;
        self
    }

    pub async fn execute(&self, user: &UserId, id: &QuoteId) -> Result<(), DeleteQuoteError> {
        let quote = self
            .store
            .get(id)
            .await?
            .ok_or_else(|| DeleteQuoteError::QuoteNotFound(id.clone()))?;
        if &quote.created_by != user {
            return Err(DeleteQuoteError::Forbidden(id.clone()));
        }

        let removed = self
            .store
            .remove(id)
            .await?
            .ok_or_else(|| DeleteQuoteError::QuoteNotFound(id.clone()))?;

        info!(
            user = %user,
            quote = %id,
            released_votes = removed.vote_count(),
            "quote_deleted"
        );
        self.event_logger.log(VoteEvent::new(
            "quote_deleted",
            json!({
                "user": user,
                "quote": id,
                "released_votes": removed.vote_count(),
            }),
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeStore, qid, uid};

    #[tokio::test]
    async fn test_create_quote_starts_without_votes() {
        let store = FakeStore::default();
        let view = CreateQuoteUseCase::new(Arc::new(store.clone()))
            .execute(
                CreateQuoteInput::new(uid("me"), "  Talk is cheap. Show me the code. ")
                    .with_author("Linus")
                    .with_tags(vec!["code".into(), " ".into()]),
            )
            .await
            .unwrap();

        assert_eq!(view.text, "Talk is cheap. Show me the code.");
        assert_eq!(view.author, "Linus");
        assert_eq!(view.tags, ["code"]);
        assert_eq!(view.vote_count, 0);
        assert!(!view.voted_by_viewer);
        assert_eq!(store.quote(view.id.as_str()).created_by, uid("me"));
    }

    #[tokio::test]
    async fn test_create_rejects_short_text() {
        let err = CreateQuoteUseCase::new(Arc::new(FakeStore::default()))
            .execute(CreateQuoteInput::new(uid("me"), "hey"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            CreateQuoteError::Invalid(DomainError::InvalidQuote(_))
        ));
    }

    #[tokio::test]
    async fn test_only_creator_may_delete() {
        let store = FakeStore::with_quotes(&["a"]);
        let delete = DeleteQuoteUseCase::new(Arc::new(store.clone()));

        let err = delete.execute(&uid("intruder"), &qid("a")).await.unwrap_err();
        assert_eq!(err, DeleteQuoteError::Forbidden(qid("a")));

        delete.execute(&uid("creator"), &qid("a")).await.unwrap();
        assert!(store.get(&qid("a")).await.unwrap().is_none());

        let err = delete.execute(&uid("creator"), &qid("a")).await.unwrap_err();
        assert_eq!(err, DeleteQuoteError::QuoteNotFound(qid("a")));
    }
}
