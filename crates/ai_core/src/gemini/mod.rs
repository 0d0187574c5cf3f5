//! Google Gemini inference engine
//!
//! Talks to `POST {base_url}/models/{model}:generateContent`, authenticated
//! with the `x-goog-api-key` header.

mod client;

pub use client::GeminiInferenceEngine;
