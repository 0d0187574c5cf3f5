//! Speech processing errors

use ai_core::{Classify, ErrorKind};
use thiserror::Error;

/// Errors that can occur during speech processing
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Failed to connect to speech service
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to speech service failed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Provider answered with a non-success status
    #[error("Speech provider returned HTTP {status}: {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Provider error message
        message: String,
    },

    /// Invalid audio format or corrupted data
    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    /// Transcription produced no text
    #[error("Transcription failed: {0}")]
    TranscriptionFailed(String),

    /// Synthesis input rejected
    #[error("Synthesis failed: {0}")]
    SynthesisFailed(String),

    /// Invalid response from service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Timeout during processing
    #[error("Speech processing timeout after {0}ms")]
    Timeout(u64),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SpeechError {
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
}

impl Classify for SpeechError {
    fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { status, .. } => ErrorKind::from_status(*status),
            Self::ConnectionFailed(msg) | Self::RequestFailed(msg) => ErrorKind::from_message(msg),
            _ => ErrorKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_failed_error_message() {
        let err = SpeechError::ConnectionFailed("refused".to_string());
        assert_eq!(err.to_string(), "Connection failed: refused");
    }

    #[test]
    fn api_error_message() {
        let err = SpeechError::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "Speech provider returned HTTP 500: boom");
    }

    #[test]
    fn timeout_error_message() {
        let err = SpeechError::Timeout(30000);
        assert_eq!(err.to_string(), "Speech processing timeout after 30000ms");
    }

    #[test]
    fn api_errors_classified_by_status() {
        let limited = SpeechError::Api {
            status: 429,
            message: "Rate limit reached".to_string(),
        };
        let overloaded = SpeechError::Api {
            status: 502,
            message: "Bad gateway".to_string(),
        };
        let rejected = SpeechError::Api {
            status: 400,
            message: "Invalid file format".to_string(),
        };
        assert_eq!(limited.kind(), ErrorKind::RateLimited);
        assert_eq!(overloaded.kind(), ErrorKind::ServerOverload);
        assert_eq!(rejected.kind(), ErrorKind::Other);
    }

    #[test]
    fn request_failure_falls_back_to_message() {
        let err = SpeechError::RequestFailed("got 503 from proxy".to_string());
        assert_eq!(err.kind(), ErrorKind::ServerOverload);
    }

    #[test]
    fn local_failures_are_terminal() {
        assert_eq!(
            SpeechError::InvalidAudio("empty".to_string()).kind(),
            ErrorKind::Other
        );
        assert_eq!(
            SpeechError::Configuration("no key".to_string()).kind(),
            ErrorKind::Other
        );
        assert_eq!(SpeechError::Timeout(1).kind(), ErrorKind::Other);
    }
}
