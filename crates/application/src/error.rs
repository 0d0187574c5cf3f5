//! Application-level errors

use std::fmt;

use ai_core::{ErrorKind, RetryError};
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Caller input rejected before any upstream call
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// Upstream quota or rate limit still exhausted after retries
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Any other upstream or processing failure
    #[error("Upstream failure: {0}")]
    Upstream(String),
}

impl ApplicationError {
    /// Shorthand for a validation failure with a custom message
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(DomainError::ValidationError(message.into()))
    }
}

/// Tag a classified executor failure with its category.
///
/// `RateLimited` becomes `QuotaExceeded`; server overload that outlived the
/// retries and every terminal failure become `Upstream`.
impl<E: fmt::Display> From<RetryError<E>> for ApplicationError {
    fn from(err: RetryError<E>) -> Self {
        match err.kind {
            ErrorKind::RateLimited => Self::QuotaExceeded(err.to_string()),
            ErrorKind::ServerOverload | ErrorKind::Other => Self::Upstream(err.to_string()),
        }
    }
}
