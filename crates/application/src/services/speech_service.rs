//! Speech service - Text-to-speech and transcription use cases

use std::{fmt, sync::Arc};

use ai_core::{RetryPolicy, execute};
use ai_speech::{AudioData, SpeechToText, TextToSpeech, Transcription};
use tracing::{debug, instrument};

use crate::error::ApplicationError;

/// Service for speech synthesis and transcription
pub struct SpeechService {
    stt: Arc<dyn SpeechToText>,
    tts: Option<Arc<dyn TextToSpeech>>,
    retry: RetryPolicy,
}

impl fmt::Debug for SpeechService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechService")
            .field("tts_enabled", &self.tts.is_some())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SpeechService {
    /// Create a new speech service; `tts` is `None` when synthesis is not configured
    pub fn new(stt: Arc<dyn SpeechToText>, tts: Option<Arc<dyn TextToSpeech>>) -> Self {
        Self {
            stt,
            tts,
            retry: RetryPolicy::default(),
        }
    }

    /// Override the retry policy
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Whether speech synthesis is available
    pub const fn tts_enabled(&self) -> bool {
        self.tts.is_some()
    }

    /// Synthesize `text` with the default voice
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn synthesize(&self, text: &str) -> Result<AudioData, ApplicationError> {
        if text.trim().is_empty() {
            return Err(ApplicationError::validation("Text must not be empty"));
        }

        let tts = self.tts.as_ref().ok_or_else(|| {
            ApplicationError::Upstream("Speech synthesis is not configured".to_string())
        })?;

        let audio = execute(&self.retry, || tts.synthesize(text, None)).await?;

        debug!(audio_size = audio.size_bytes(), "Speech synthesized");
        Ok(audio)
    }

    /// Transcribe an uploaded recording
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes(), format = ?audio.format()))]
    pub async fn transcribe(&self, audio: &AudioData) -> Result<Transcription, ApplicationError> {
        if audio.is_empty() {
            return Err(ApplicationError::validation("Audio file is empty"));
        }

        if !self.stt.supports_format(audio.format()) {
            return Err(ApplicationError::validation(format!(
                "Audio format .{} is not supported",
                audio.format().extension()
            )));
        }

        let transcription = execute(&self.retry, || self.stt.transcribe(audio)).await?;

        debug!(text_len = transcription.text.len(), "Audio transcribed");
        Ok(transcription)
    }
}
