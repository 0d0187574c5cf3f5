//! Route definitions

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::{config::ServerConfig, handlers, state::AppState};

/// Request body limits per route kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyLimits {
    /// Limit for JSON bodies
    pub json_bytes: usize,
    /// Limit for multipart audio uploads
    pub audio_bytes: usize,
}

impl Default for BodyLimits {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for BodyLimits {
    fn from(server: &ServerConfig) -> Self {
        Self {
            json_bytes: server.max_body_size_json_bytes,
            audio_bytes: server.max_body_size_audio_bytes,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState, limits: BodyLimits) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route(
            "/send-msg",
            post(handlers::chat::send_message).layer(DefaultBodyLimit::max(limits.json_bytes)),
        )
        .route(
            "/generate-speech",
            post(handlers::speech::generate_speech)
                .layer(DefaultBodyLimit::max(limits.json_bytes)),
        )
        .route(
            "/transcribe-audio",
            post(handlers::transcribe::transcribe_audio)
                .layer(DefaultBodyLimit::max(limits.audio_bytes)),
        )
        .with_state(state)
}
