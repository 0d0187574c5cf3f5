//! Application state shared across handlers

use std::sync::Arc;

use application::{ChatService, SpeechService};

/// Shared application state
///
/// Services are built once at startup and shared read-only by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Chat relay to the configured provider
    pub chat_service: Arc<ChatService>,
    /// Transcription and synthesis
    pub speech_service: Arc<SpeechService>,
}

impl AppState {
    /// Create state from the two services
    pub fn new(chat_service: ChatService, speech_service: SpeechService) -> Self {
        Self {
            chat_service: Arc::new(chat_service),
            speech_service: Arc::new(speech_service),
        }
    }
}
