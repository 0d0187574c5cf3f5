//! OpenAI client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{ChatReply, ChatRequest, InferenceEngine, TokenUsage};

/// Inference engine backed by OpenAI chat completions
#[derive(Debug)]
pub struct OpenAIInferenceEngine {
    client: Client,
    config: InferenceConfig,
}

impl OpenAIInferenceEngine {
    /// Create a new OpenAI inference engine
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        config.validate().map_err(InferenceError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %config.resolved_base_url(),
            model = %config.resolved_model(),
            "Initialized OpenAI inference engine"
        );

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.resolved_base_url())
    }

    /// Translate history + new message into the OpenAI message list
    fn build_messages(&self, request: &ChatRequest) -> Vec<OpenAIMessage> {
        let system = request
            .system_prompt
            .as_deref()
            .or(self.config.system_prompt.as_deref());

        let mut messages = Vec::with_capacity(request.turn_count() + 1);
        if let Some(system) = system {
            messages.push(OpenAIMessage {
                role: "system",
                content: system.to_string(),
            });
        }
        messages.extend(request.history.iter().map(|turn| OpenAIMessage {
            role: turn.role.as_openai_role(),
            content: turn.text(),
        }));
        messages.push(OpenAIMessage {
            role: "user",
            content: request.message.clone(),
        });
        messages
    }
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

/// OpenAI API error response
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[async_trait]
impl InferenceEngine for OpenAIInferenceEngine {
    #[instrument(skip(self, request), fields(model = %self.config.resolved_model(), turns = request.turn_count()))]
    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, InferenceError> {
        let body = CompletionRequest {
            model: self.config.resolved_model(),
            messages: self.build_messages(request),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!("Sending request to OpenAI");

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or(body, |e| e.error.message);
            warn!(status = %status, message = %message, "OpenAI request failed");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: CompletionResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let choice = completion.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let text = choice
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| {
                InferenceError::EmptyResponse("completion has no message content".to_string())
            })?;

        let usage = completion.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        debug!(tokens = ?usage, "Inference completed");

        Ok(ChatReply {
            text,
            model: completion
                .model
                .unwrap_or_else(|| self.config.resolved_model().to_string()),
            usage,
            finish_reason,
        })
    }

    fn provider(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        self.config.resolved_model()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Provider;
    use crate::error::{Classify, ErrorKind};
    use domain::{ChatTurn, Prompt};
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn engine_for(server: &MockServer) -> OpenAIInferenceEngine {
        let config = InferenceConfig {
            base_url: Some(server.uri()),
            timeout_ms: 5000,
            ..InferenceConfig::for_provider(Provider::OpenAI, "test-api-key")
        };
        OpenAIInferenceEngine::new(config).unwrap()
    }

    fn request(text: &str) -> ChatRequest {
        ChatRequest::simple(Prompt::parse(text).unwrap())
    }

    fn completion(content: &str) -> serde_json::Value {
        serde_json::json!({
            "model": "gpt-3.5-turbo-0125",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 9, "completion_tokens": 12, "total_tokens": 21}
        })
    }

    #[test]
    fn new_fails_without_api_key() {
        let result = OpenAIInferenceEngine::new(InferenceConfig::default());
        assert!(matches!(result, Err(InferenceError::Configuration(_))));
    }

    #[test]
    fn builds_messages_with_role_mapping() {
        let config = InferenceConfig {
            system_prompt: Some("Be kind".to_string()),
            ..InferenceConfig::for_provider(Provider::OpenAI, "k")
        };
        let engine = OpenAIInferenceEngine::new(config).unwrap();
        let req = ChatRequest::with_history(
            vec![ChatTurn::user("Hi"), ChatTurn::model("Hello!")],
            Prompt::parse("Weather?").unwrap(),
        );

        let messages = engine.build_messages(&req);
        let roles: Vec<&str> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["system", "user", "assistant", "user"]);
        assert_eq!(messages[2].content, "Hello!");
        assert_eq!(messages[3].content, "Weather?");
    }

    #[test]
    fn request_system_prompt_overrides_config() {
        let config = InferenceConfig {
            system_prompt: Some("config".to_string()),
            ..InferenceConfig::for_provider(Provider::OpenAI, "k")
        };
        let engine = OpenAIInferenceEngine::new(config).unwrap();
        let messages = engine.build_messages(&request("x").with_system("request"));
        assert_eq!(messages[0].content, "request");
    }

    #[tokio::test]
    async fn generate_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-3.5-turbo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("Hi there!")))
            .expect(1)
            .mount(&server)
            .await;

        let reply = engine_for(&server).generate(&request("Hello")).await.unwrap();

        assert_eq!(reply.text, "Hi there!");
        assert_eq!(reply.model, "gpt-3.5-turbo-0125");
        assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
        assert_eq!(reply.usage.unwrap().total_tokens, 21);
    }

    #[tokio::test]
    async fn missing_content_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant"}, "finish_reason": "stop"}]
            })))
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, InferenceError::EmptyResponse(_)));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn no_choices_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::EmptyResponse(_)));
    }

    #[tokio::test]
    async fn rate_limit_status_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {
                    "message": "You exceeded your current quota",
                    "type": "insufficient_quota",
                    "code": "insufficient_quota"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(429));
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert!(err.to_string().contains("exceeded your current quota"));
    }

    #[tokio::test]
    async fn server_error_is_classified() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ServerOverload);
        assert!(err.to_string().contains("overloaded"));
    }

    #[tokio::test]
    async fn invalid_json_is_invalid_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::InvalidResponse(_)));
    }

    #[test]
    fn provider_and_model() {
        let engine =
            OpenAIInferenceEngine::new(InferenceConfig::for_provider(Provider::OpenAI, "k"))
                .unwrap();
        assert_eq!(engine.provider(), "openai");
        assert_eq!(engine.model(), "gpt-3.5-turbo");
    }
}
