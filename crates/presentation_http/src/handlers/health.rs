//! Health check handler

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Configured chat provider
    pub provider: String,
    /// Chat model in use
    pub model: String,
    /// Whether `/generate-speech` is available
    pub speech_synthesis: bool,
}

/// Liveness check - is the server running?
///
/// Does not contact the provider.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        provider: state.chat_service.provider().to_string(),
        model: state.chat_service.model().to_string(),
        speech_synthesis: state.speech_service.tts_enabled(),
    })
}
