//! OpenAI chat-completions inference engine
//!
//! Talks to `POST {base_url}/chat/completions` with bearer authentication.

mod client;

pub use client::OpenAIInferenceEngine;
