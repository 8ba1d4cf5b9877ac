//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid user id: {0}")]
    InvalidUserId(String),

    #[error("Invalid quote id: {0}")]
    InvalidQuoteId(String),

    #[error("Invalid quote: {0}")]
    InvalidQuote(String),

    #[error("Unknown sort key: {0}")]
    InvalidSortKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_quote_display() {
        let error = DomainError::InvalidQuote("Quote text cannot be empty.".to_string());
        assert_eq!(error.to_string(), "Invalid quote: Quote text cannot be empty.");
    }

    #[test]
    fn test_sort_key_display() {
        let error = DomainError::InvalidSortKey("random".to_string());
        assert_eq!(error.to_string(), "Unknown sort key: random");
    }
}
