//! Chat handler

use axum::{Json, extract::State};
use domain::ChatTurn;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{error::ApiError, extract::AppJson, state::AppState};

/// Body of `POST /send-msg`
///
/// The frontend sends `{history, newMessage}`; `{prompt}` is accepted as a
/// single-turn shorthand.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Conversation so far, oldest first; absent and `null` both mean none
    #[serde(default)]
    pub history: Option<Vec<ChatTurn>>,
    /// New user message
    #[serde(default)]
    pub new_message: Option<String>,
    /// Single-turn prompt
    #[serde(default)]
    pub prompt: Option<String>,
}

impl SendMessageRequest {
    /// Number of prior turns sent
    pub fn turns(&self) -> usize {
        self.history.as_ref().map_or(0, Vec::len)
    }

    /// Message to send, empty when neither field is present
    pub fn message(&self) -> &str {
        self.new_message
            .as_deref()
            .or(self.prompt.as_deref())
            .unwrap_or_default()
    }
}

/// Body of a successful `POST /send-msg`
#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    /// Model reply
    pub msg: String,
}

/// Relay a message, with its history, to the configured provider
#[instrument(skip(state, request), fields(turns = request.turns()))]
pub async fn send_message(
    State(state): State<AppState>,
    AppJson(request): AppJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let message = request.message().to_string();
    let history = request.history.unwrap_or_default();
    let reply = state.chat_service.reply(history, &message).await?;

    Ok(Json(SendMessageResponse { msg: reply.text }))
}
