//! Audio transcription handler
//!
//! The uploaded file is staged in a temporary file that is removed when the
//! handler returns, whichever way it returns.

use std::{io, path::Path};

use ai_speech::{AudioData, AudioFormat};
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, instrument};

use crate::{error::ApiError, state::AppState};

/// Multipart field carrying the recording
pub const AUDIO_FIELD: &str = "audio";

/// Body of a successful `POST /transcribe-audio`
#[derive(Debug, Serialize, Deserialize)]
pub struct TranscribeResponse {
    /// Recognized text
    pub transcript: String,
}

/// Format of an upload: content type first, then file extension, else WebM
/// (what browsers' `MediaRecorder` produces)
pub fn detect_format(content_type: Option<&str>, file_name: Option<&str>) -> AudioFormat {
    content_type
        .and_then(AudioFormat::from_mime_type)
        .or_else(|| file_name.and_then(AudioFormat::from_file_name))
        .unwrap_or(AudioFormat::Webm)
}

/// An upload staged on disk; the file is deleted on drop
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
    format: AudioFormat,
}

impl StagedUpload {
    /// Write `data` to a fresh temporary file
    pub async fn stage(data: &[u8], format: AudioFormat) -> io::Result<Self> {
        let suffix = format!(".{}", format.extension());
        let file = tempfile::Builder::new()
            .prefix("chat-relay-upload-")
            .suffix(&suffix)
            .tempfile()?;
        tokio::fs::write(file.path(), data).await?;
        Ok(Self { file, format })
    }

    /// Location of the staged file
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Read the staged file back as audio
    pub async fn read(&self) -> io::Result<AudioData> {
        let data = tokio::fs::read(self.path()).await?;
        Ok(AudioData::new(data, self.format))
    }
}

/// Transcribe the `audio` field of a multipart upload
#[instrument(skip(state, multipart))]
pub async fn transcribe_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<TranscribeResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let upload = loop {
        let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?
        else {
            return Err(ApiError::BadRequest(
                "No audio file uploaded. Send it in the \"audio\" field".to_string(),
            ));
        };

        if field.name() != Some(AUDIO_FIELD) {
            continue;
        }

        let format = detect_format(field.content_type(), field.file_name());
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(e.body_text()))?;

        break StagedUpload::stage(&data, format)
            .await
            .map_err(|e| ApiError::Internal(format!("Failed to stage upload: {e}")))?;
    };

    debug!(path = %upload.path().display(), format = ?upload.format, "Upload staged");

    let audio = upload
        .read()
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to read staged upload: {e}")))?;

    let transcription = state.speech_service.transcribe(&audio).await?;

    Ok(Json(TranscribeResponse {
        transcript: transcription.text,
    }))
}
