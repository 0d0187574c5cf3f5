//! AI Core - Chat inference and outbound call resilience
//!
//! Provides the `InferenceEngine` port with OpenAI and Gemini adapters, and
//! the retry policy executor that wraps every outbound call.
//!
//! Adapters translate provider failures into an [`ErrorKind`] at the
//! boundary, so [`retry::execute`] only ever looks at the kind.

pub mod config;
pub mod error;
pub mod gemini;
pub mod openai;
pub mod ports;
pub mod retry;
pub mod selector;

pub use config::{InferenceConfig, Provider};
pub use error::{Classify, ErrorKind, InferenceError};
pub use gemini::GeminiInferenceEngine;
pub use openai::OpenAIInferenceEngine;
pub use ports::{ChatReply, ChatRequest, InferenceEngine, TokenUsage};
pub use retry::{RetryError, RetryPolicy, execute};
pub use selector::engine_for;
