//! Speech processing provider implementations
//!
//! Contains concrete implementations of the `SpeechToText` and `TextToSpeech`
//! traits, plus the startup factories that pick them from `SpeechConfig`.

pub mod gemini;
pub mod openai;

use std::sync::Arc;

use ai_core::Provider;
use tracing::info;

pub use gemini::GeminiSpeechProvider;
pub use openai::OpenAISpeechProvider;

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::{SpeechToText, TextToSpeech};

/// Build the transcription adapter for `config.provider`
///
/// # Errors
///
/// Returns `SpeechError::Configuration` if the provider's key is missing.
pub fn transcriber_for(config: &SpeechConfig) -> Result<Arc<dyn SpeechToText>, SpeechError> {
    let stt: Arc<dyn SpeechToText> = match config.provider {
        Provider::OpenAI => Arc::new(OpenAISpeechProvider::new(config.clone())?),
        Provider::Gemini => Arc::new(GeminiSpeechProvider::new(config.clone())?),
    };
    info!(provider = %config.provider, model = %stt.model_name(), "Transcription enabled");
    Ok(stt)
}

/// Build the synthesis adapter, `None` when no OpenAI key is configured
///
/// # Errors
///
/// Returns `SpeechError::Configuration` if the limits are invalid.
pub fn synthesizer_for(
    config: &SpeechConfig,
) -> Result<Option<Arc<dyn TextToSpeech>>, SpeechError> {
    if !config.tts_enabled() {
        info!("Speech synthesis disabled (no OpenAI key)");
        return Ok(None);
    }
    let tts = OpenAISpeechProvider::new(config.clone())?;
    info!(model = %config.tts_model, voice = %config.default_voice, "Speech synthesis enabled");
    Ok(Some(Arc::new(tts)))
}
