//! Application error types

use assay_domain::ValidationResult;
use thiserror::Error;

/// Errors that abort a whole suite run.
///
/// Transport failures and failing assertions are not errors at this level:
/// they end up inside the report.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The suite failed static validation; nothing was executed.
    #[error("suite validation failed: {0}")]
    Validation(ValidationResult),

    /// An internal error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Returns the validation errors, if this is a validation failure.
    #[must_use]
    pub const fn validation(&self) -> Option<&ValidationResult> {
        match self {
            Self::Validation(result) => Some(result),
            Self::Internal(_) => None,
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
