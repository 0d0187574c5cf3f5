//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// The message to send is missing or only whitespace
    #[error("Message must not be empty")]
    EmptyMessage,

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}
