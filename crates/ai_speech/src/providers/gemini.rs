//! Gemini Speech Provider
//!
//! Implements `SpeechToText` by sending the audio inline (base64) to
//! `generateContent` together with a transcription instruction.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::SpeechToText;
use crate::types::{AudioData, Transcription};

const TRANSCRIBE_INSTRUCTION: &str =
    "Transcribe this audio verbatim. Reply with the transcript only, without commentary.";

/// Gemini transcription provider
#[derive(Debug, Clone)]
pub struct GeminiSpeechProvider {
    client: Client,
    config: SpeechConfig,
}

impl GeminiSpeechProvider {
    /// Create a new Gemini transcription provider
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Configuration` if the Gemini key is missing.
    pub fn new(config: SpeechConfig) -> Result<Self, SpeechError> {
        config.validate_limits().map_err(SpeechError::Configuration)?;
        config
            .gemini_key()
            .ok_or_else(|| {
                SpeechError::Configuration(
                    "GEMINI_API_KEY is required for Gemini transcription".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| {
                SpeechError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Get the API key (presence checked in `new`)
    fn api_key(&self) -> &str {
        self.config.gemini_key().unwrap_or_default()
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.gemini_base_url.trim_end_matches('/'),
            self.config.gemini_stt_model
        )
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [RequestPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Text { text: &'a str },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl SpeechToText for GeminiSpeechProvider {
    #[instrument(skip(self, audio), fields(audio_size = audio.size_bytes(), format = ?audio.format()))]
    async fn transcribe(&self, audio: &AudioData) -> Result<Transcription, SpeechError> {
        debug!("Transcribing audio with Gemini");

        if audio.is_empty() {
            return Err(SpeechError::InvalidAudio("Audio data is empty".to_string()));
        }

        let body = GenerateRequest {
            contents: [Content {
                role: "user",
                parts: [
                    RequestPart::Text {
                        text: TRANSCRIBE_INSTRUCTION,
                    },
                    RequestPart::Inline {
                        inline_data: InlineData {
                            mime_type: audio.mime_type(),
                            data: BASE64.encode(audio.data()),
                        },
                    },
                ],
            }],
        };

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.api_key())
            .json(&body)
            .send()
            .await
            .map_err(|e| SpeechError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body).map_or(body, |e| e.error.message);
            warn!(status = %status, message = %message, "Gemini transcription failed");
            return Err(SpeechError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| SpeechError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let text: String = generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| content.parts.into_iter().filter_map(|p| p.text).collect())
            .unwrap_or_default();

        let transcription = Transcription::new(text.trim());
        if transcription.is_empty() {
            return Err(SpeechError::TranscriptionFailed(
                "Gemini returned no transcript".to_string(),
            ));
        }

        debug!(text_len = transcription.text.len(), "Transcription complete");
        Ok(transcription)
    }

    fn model_name(&self) -> &str {
        &self.config.gemini_stt_model
    }
}
