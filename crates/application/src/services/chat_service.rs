//! Chat service - Stateless conversation relay

use std::{fmt, sync::Arc, time::Instant};

use ai_core::{ChatReply, ChatRequest, InferenceEngine, RetryPolicy, execute};
use domain::{ChatTurn, Prompt};
use tracing::{debug, instrument};

use crate::error::ApplicationError;

/// Service for relaying chat messages to the configured provider
pub struct ChatService {
    engine: Arc<dyn InferenceEngine>,
    retry: RetryPolicy,
    system_prompt: Option<String>,
}

impl fmt::Debug for ChatService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatService")
            .field("provider", &self.engine.provider())
            .field("retry", &self.retry)
            .field("system_prompt", &self.system_prompt)
            .finish_non_exhaustive()
    }
}

impl ChatService {
    /// Create a new chat service with the default retry policy
    pub fn new(engine: Arc<dyn InferenceEngine>) -> Self {
        Self {
            engine,
            retry: RetryPolicy::default(),
            system_prompt: None,
        }
    }

    /// Override the retry policy
    #[must_use]
    pub const fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set a system prompt sent with every request
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Reply to `message`, continuing `history`.
    ///
    /// A blank message is rejected without contacting the provider.
    #[instrument(skip(self, history, message), fields(turns = history.len(), message_len = message.len()))]
    pub async fn reply(
        &self,
        history: Vec<ChatTurn>,
        message: &str,
    ) -> Result<ChatReply, ApplicationError> {
        let prompt = Prompt::parse(message)?;

        let mut request = ChatRequest::with_history(history, prompt);
        if let Some(system) = &self.system_prompt {
            request = request.with_system(system.clone());
        }

        let start = Instant::now();
        let request = &request;
        let reply = execute(&self.retry, || self.engine.generate(request)).await?;

        #[allow(clippy::cast_possible_truncation)]
        let latency_ms = start.elapsed().as_millis() as u64;
        debug!(
            model = %reply.model,
            tokens = ?reply.usage,
            latency_ms,
            "Chat response generated"
        );

        Ok(reply)
    }

    /// Provider name of the underlying engine
    pub fn provider(&self) -> &'static str {
        self.engine.provider()
    }

    /// Model used for requests
    pub fn model(&self) -> &str {
        self.engine.model()
    }
}
