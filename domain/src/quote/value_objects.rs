//! Value objects for the quote domain.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Minimum number of characters a quote's text must contain.
pub const MIN_TEXT_CHARS: usize = 5;

/// Author name used when the caller supplies none.
pub const ANONYMOUS_AUTHOR: &str = "Anonymous";

/// Opaque quote identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteId(String);

impl QuoteId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for QuoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidQuoteId(s.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl fmt::Display for QuoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, already-authenticated user identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Result<Self, DomainError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(DomainError::InvalidUserId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for UserId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validated input for creating a quote.
///
/// # Example
///
/// ```
/// use ledger_domain::QuoteDraft;
///
/// let draft = QuoteDraft::new("  Stay hungry, stay foolish.  ", "", vec![" life ".into(), "".into()]).unwrap();
/// assert_eq!(draft.text(), "Stay hungry, stay foolish.");
/// assert_eq!(draft.author(), "Anonymous");
/// assert_eq!(draft.tags(), ["life"]);
///
/// assert!(QuoteDraft::new("hey", "me", vec![]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteDraft {
    text: String,
    author: String,
    avatar_url: Option<String>,
    tags: Vec<String>,
}

impl QuoteDraft {
    pub fn new(
        text: impl Into<String>,
        author: impl Into<String>,
        tags: Vec<String>,
    ) -> Result<Self, DomainError> {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Err(DomainError::InvalidQuote(
                "Quote text cannot be empty.".to_string(),
            ));
        }
        if text.chars().count() < MIN_TEXT_CHARS {
            return Err(DomainError::InvalidQuote(format!(
                "Quote text must be at least {} characters long.",
                MIN_TEXT_CHARS
            )));
        }

        let author = author.into().trim().to_string();
        let author = if author.is_empty() {
            ANONYMOUS_AUTHOR.to_string()
        } else {
            author
        };

        let tags = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Ok(Self {
            text,
            author,
            avatar_url: None,
            tags,
        })
    }

    pub fn with_avatar_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.avatar_url = (!url.trim().is_empty()).then_some(url);
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub(crate) fn into_parts(self) -> (String, String, Option<String>, Vec<String>) {
        (self.text, self.author, self.avatar_url, self.tags)
    }
}
