//! Configuration for speech processing

use std::fmt;

use ai_core::Provider;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::types::AudioFormat;

/// Configuration for speech processing services
#[derive(Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Provider used for transcription
    #[serde(default)]
    pub provider: Provider,

    /// OpenAI API key (Whisper and TTS)
    #[serde(default, skip_serializing)]
    pub openai_api_key: Option<SecretString>,

    /// OpenAI API base URL (for custom endpoints)
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Gemini API key (transcription)
    #[serde(default, skip_serializing)]
    pub gemini_api_key: Option<SecretString>,

    /// Gemini API base URL
    #[serde(default = "default_gemini_base_url")]
    pub gemini_base_url: String,

    /// Speech-to-text model for OpenAI
    #[serde(default = "default_stt_model")]
    pub stt_model: String,

    /// Model used for Gemini transcription
    #[serde(default = "default_gemini_stt_model")]
    pub gemini_stt_model: String,

    /// Text-to-speech model
    #[serde(default = "default_tts_model")]
    pub tts_model: String,

    /// Default voice for TTS
    #[serde(default = "default_voice")]
    pub default_voice: String,

    /// Output audio format for TTS
    #[serde(default = "default_output_format")]
    pub output_format: AudioFormat,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// TTS speaking speed (0.25 to 4.0)
    #[serde(default = "default_speed")]
    pub speed: f32,
}

fn default_openai_base_url() -> String {
    Provider::OpenAI.default_base_url().to_string()
}

fn default_gemini_base_url() -> String {
    Provider::Gemini.default_base_url().to_string()
}

fn default_stt_model() -> String {
    "whisper-1".to_string()
}

fn default_gemini_stt_model() -> String {
    Provider::Gemini.default_model().to_string()
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_voice() -> String {
    "nova".to_string()
}

const fn default_output_format() -> AudioFormat {
    AudioFormat::Mp3
}

const fn default_timeout_ms() -> u64 {
    30000 // 30 seconds
}

const fn default_speed() -> f32 {
    1.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            openai_api_key: None,
            openai_base_url: default_openai_base_url(),
            gemini_api_key: None,
            gemini_base_url: default_gemini_base_url(),
            stt_model: default_stt_model(),
            gemini_stt_model: default_gemini_stt_model(),
            tts_model: default_tts_model(),
            default_voice: default_voice(),
            output_format: default_output_format(),
            timeout_ms: default_timeout_ms(),
            speed: default_speed(),
        }
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<SecretString>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("SpeechConfig")
            .field("provider", &self.provider)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("gemini_base_url", &self.gemini_base_url)
            .field("stt_model", &self.stt_model)
            .field("gemini_stt_model", &self.gemini_stt_model)
            .field("tts_model", &self.tts_model)
            .field("default_voice", &self.default_voice)
            .field("output_format", &self.output_format)
            .field("timeout_ms", &self.timeout_ms)
            .field("speed", &self.speed)
            .finish()
    }
}

fn non_blank(key: Option<&SecretString>) -> Option<&str> {
    key.map(|k| k.expose_secret())
        .filter(|k| !k.trim().is_empty())
}

impl SpeechConfig {
    /// Create a minimal config for testing
    #[cfg(test)]
    pub fn test() -> Self {
        Self {
            openai_api_key: Some(SecretString::from("test-key")),
            ..Default::default()
        }
    }

    /// OpenAI key, if set and not blank
    pub fn openai_key(&self) -> Option<&str> {
        non_blank(self.openai_api_key.as_ref())
    }

    /// Gemini key, if set and not blank
    pub fn gemini_key(&self) -> Option<&str> {
        non_blank(self.gemini_api_key.as_ref())
    }

    /// Whether speech synthesis can be offered (needs an OpenAI key)
    pub fn tts_enabled(&self) -> bool {
        self.openai_key().is_some()
    }

    /// Validate the configuration, including the transcription provider key
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        let key = match self.provider {
            Provider::OpenAI => self.openai_key(),
            Provider::Gemini => self.gemini_key(),
        };
        if key.is_none() {
            return Err(format!(
                "{} is required for {} transcription",
                self.provider.api_key_env(),
                self.provider
            ));
        }

        self.validate_limits()
    }

    /// Validate speed and timeout, independent of the provider keys
    pub fn validate_limits(&self) -> Result<(), String> {
        if !(0.25..=4.0).contains(&self.speed) {
            return Err(format!(
                "Speed must be between 0.25 and 4.0, got {}",
                self.speed
            ));
        }

        if self.timeout_ms == 0 {
            return Err("Timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
