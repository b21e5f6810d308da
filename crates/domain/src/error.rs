//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur while interpreting a suite definition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The provided URL is invalid or malformed.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The assertion type is not recognized.
    #[error("unknown assertion type: {0}")]
    UnknownAssertionType(String),

    /// The assertion is recognized but its fields have the wrong shape.
    #[error("invalid {kind} assertion: {message}")]
    InvalidAssertion {
        /// Assertion type tag.
        kind: String,
        /// What is wrong with it.
        message: String,
    },

    /// The comparison operator is not recognized or not allowed.
    #[error("unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A JSON path expression could not be parsed.
    #[error("invalid JSON path '{path}': {message}")]
    InvalidJsonPath {
        /// The offending path.
        path: String,
        /// Parse failure detail.
        message: String,
    },
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
