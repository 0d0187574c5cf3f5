//! AI Speech - Speech-to-Text and Text-to-Speech adapters
//!
//! Provides traits and implementations for speech processing:
//! - `SpeechToText` - Transcribe audio to text (STT)
//! - `TextToSpeech` - Synthesize speech from text (TTS)
//!
//! # Architecture
//!
//! This crate follows the ports & adapters pattern:
//! - `ports` module defines the traits (ports)
//! - `providers` module contains concrete implementations (adapters)
//!
//! Every adapter error implements `ai_core::Classify`, so speech calls run
//! under the same retry executor as chat calls.
//!
//! # Supported Providers
//!
//! - OpenAI Whisper (STT) and TTS API
//! - Gemini `generateContent` with inline audio (STT)
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::{OpenAISpeechProvider, SpeechToText, TextToSpeech, AudioData, AudioFormat};
//!
//! let provider = OpenAISpeechProvider::new(config)?;
//!
//! let audio = AudioData::new(bytes, AudioFormat::Webm);
//! let transcription = provider.transcribe(&audio).await?;
//!
//! let mp3 = provider.synthesize("Hello, world!", None).await?;
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod providers;
pub mod types;

pub use config::SpeechConfig;
pub use error::SpeechError;
pub use ports::{SpeechToText, TextToSpeech};
pub use providers::{
    GeminiSpeechProvider, OpenAISpeechProvider, synthesizer_for, transcriber_for,
};
pub use types::{AudioData, AudioFormat, Transcription};
