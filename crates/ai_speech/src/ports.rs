//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech processing adapters must implement.
//! One call is one outbound request; callers wrap it in the retry executor.

use async_trait::async_trait;

use crate::error::SpeechError;
use crate::types::{AudioData, AudioFormat, Transcription};

/// Port for Speech-to-Text (STT) implementations
///
/// # Example
///
/// ```ignore
/// use ai_speech::{SpeechToText, AudioData, AudioFormat};
///
/// async fn transcribe_upload(
///     stt: &dyn SpeechToText,
///     audio: &AudioData,
/// ) -> Result<String, SpeechError> {
///     Ok(stt.transcribe(audio).await?.text)
/// }
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe audio to text
    ///
    /// Takes the audio by reference so the same payload can be resent.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if transcription fails or yields no text.
    async fn transcribe(&self, audio: &AudioData) -> Result<Transcription, SpeechError>;

    /// Whether `format` can be sent to this backend at all
    fn supports_format(&self, _format: AudioFormat) -> bool {
        true
    }

    /// Get the name of the current STT model
    fn model_name(&self) -> &str;
}

/// Port for Text-to-Speech (TTS) implementations
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech
    ///
    /// # Arguments
    ///
    /// * `text` - Text to synthesize
    /// * `voice` - Optional voice ID to use (uses default if None)
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(&self, text: &str, voice: Option<&str>) -> Result<AudioData, SpeechError>;

    /// Get the name of the current TTS model
    fn model_name(&self) -> &str;

    /// Get the default voice ID
    fn default_voice(&self) -> &str;
}
