//! Speech synthesis handler

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::{error::ApiError, extract::AppJson, state::AppState};

/// Body of `POST /generate-speech`
#[derive(Debug, Default, Deserialize)]
pub struct GenerateSpeechRequest {
    /// Text to speak
    #[serde(default)]
    pub text: String,
}

/// Synthesize `text` and return the raw audio
#[instrument(skip(state, request), fields(text_len = request.text.len()))]
pub async fn generate_speech(
    State(state): State<AppState>,
    AppJson(request): AppJson<GenerateSpeechRequest>,
) -> Result<Response, ApiError> {
    let audio = state.speech_service.synthesize(&request.text).await?;

    let content_type = audio.mime_type();
    Ok(([(header::CONTENT_TYPE, content_type)], audio.into_bytes()).into_response())
}
