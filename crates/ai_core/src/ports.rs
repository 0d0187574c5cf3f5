//! Port definitions for chat inference
//!
//! Defines the trait (port) that provider adapters must implement.

use async_trait::async_trait;
use domain::{ChatTurn, Prompt};
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// One chat completion request: prior history plus the new user message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    /// New user message
    pub message: String,
    /// Per-request system prompt (overrides adapter config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl ChatRequest {
    /// Create a single-turn request
    pub fn simple(prompt: Prompt) -> Self {
        Self {
            history: Vec::new(),
            message: prompt.into_inner(),
            system_prompt: None,
        }
    }

    /// Create a request that continues `history`
    pub fn with_history(history: Vec<ChatTurn>, prompt: Prompt) -> Self {
        Self {
            history,
            message: prompt.into_inner(),
            system_prompt: None,
        }
    }

    /// Set a system prompt for this request
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system_prompt = Some(system.into());
        self
    }

    /// Number of turns sent upstream, including the new message
    pub fn turn_count(&self) -> usize {
        self.history.len() + 1
    }
}

/// Reply from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated text, never blank
    pub text: String,
    /// Model that produced the reply
    pub model: String,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
    /// Finish reason reported by the provider
    pub finish_reason: Option<String>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Port for chat inference adapters
///
/// One call is one outbound request; retries are the caller's concern.
#[async_trait]
pub trait InferenceEngine: Send + Sync {
    /// Generate a reply for the request.
    ///
    /// A response without usable text is an `InferenceError::EmptyResponse`.
    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, InferenceError>;

    /// Provider name (e.g. "openai")
    fn provider(&self) -> &'static str;

    /// Model used for requests
    fn model(&self) -> &str;
}
