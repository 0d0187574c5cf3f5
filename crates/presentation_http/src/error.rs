//! API error handling
//!
//! Every failure is logged in full and answered with a fixed message per
//! category, so upstream error text never reaches the client.

use application::ApplicationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Message returned once the provider's quota or rate limit is exhausted
pub const QUOTA_EXCEEDED_MESSAGE: &str =
    "API usage limit reached. Check your provider plan or try again later.";

/// Message returned for every other failure
pub const INTERNAL_ERROR_MESSAGE: &str =
    "The assistant is experiencing technical difficulties. Please try again later.";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller input was rejected; the message is safe to show
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Upstream quota or rate limit exhausted
    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// User-facing message
    pub error: String,
    /// Machine-readable code
    pub code: &'static str,
}

impl ApiError {
    /// HTTP status for this error
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for this error
    pub const fn code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "bad_request",
            Self::QuotaExceeded(_) => "quota_exceeded",
            Self::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            Self::BadRequest(msg) => {
                warn!(error = %msg, "Rejected request");
                msg.clone()
            },
            Self::QuotaExceeded(detail) => {
                error!(error = %detail, "Upstream quota exhausted");
                QUOTA_EXCEEDED_MESSAGE.to_string()
            },
            Self::Internal(detail) => {
                error!(error = %detail, "Request failed");
                INTERNAL_ERROR_MESSAGE.to_string()
            },
        };

        let body = ErrorResponse {
            error: message,
            code: self.code(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::Validation(e) => Self::BadRequest(e.to_string()),
            ApplicationError::QuotaExceeded(msg) => Self::QuotaExceeded(msg),
            ApplicationError::Upstream(msg) => Self::Internal(msg),
        }
    }
}
