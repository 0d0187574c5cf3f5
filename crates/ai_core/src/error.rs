//! Inference errors and failure classification

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Classified kind of an outbound call failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Upstream quota or rate limit (HTTP 429)
    RateLimited,
    /// Upstream server error or overload (HTTP 5xx)
    ServerOverload,
    /// Anything else; never retried
    Other,
}

impl ErrorKind {
    /// Whether a failure of this kind may be retried
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::ServerOverload)
    }

    /// Classify from an HTTP status code
    pub const fn from_status(status: u16) -> Self {
        match status {
            429 => Self::RateLimited,
            500..=599 => Self::ServerOverload,
            _ => Self::Other,
        }
    }

    /// Classify from free error text, for failures that carry no status.
    ///
    /// Matches the bare substrings "429" and "503" anywhere in the message,
    /// so unrelated text containing those digits is misclassified.
    pub fn from_message(message: &str) -> Self {
        if message.contains("429") {
            Self::RateLimited
        } else if message.contains("503") {
            Self::ServerOverload
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ServerOverload => write!(f, "server_overload"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Errors that know their own [`ErrorKind`]
pub trait Classify {
    /// Kind used by the retry executor to decide whether to retry
    fn kind(&self) -> ErrorKind;
}

/// Errors that can occur during chat inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Failed to connect to the provider
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request could not be sent or its body could not be read
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Provider answered with a non-success status
    #[error("Provider returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error message
        message: String,
    },

    /// Response body could not be parsed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Response parsed but holds no usable text
    #[error("Empty response: {0}")]
    EmptyResponse(String),

    /// Timeout waiting for the provider
    #[error("Inference timeout after {0}ms")]
    Timeout(u64),

    /// Invalid adapter configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl InferenceError {
    /// Map a transport-level reqwest failure
    pub fn from_transport(err: &reqwest::Error, timeout_ms: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout(timeout_ms)
        } else if err.is_connect() {
            Self::ConnectionFailed(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            Self::RequestFailed(err.to_string())
        }
    }

    /// HTTP status reported by the provider, if any
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl Classify for InferenceError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { status, .. } => ErrorKind::from_status(*status),
            Self::ConnectionFailed(msg) | Self::RequestFailed(msg) => ErrorKind::from_message(msg),
            Self::InvalidResponse(_)
            | Self::EmptyResponse(_)
            | Self::Timeout(_)
            | Self::Configuration(_) => ErrorKind::Other,
        }
    }
}
