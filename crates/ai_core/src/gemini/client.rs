//! Gemini client implementation

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{ChatReply, ChatRequest, InferenceEngine, TokenUsage};

/// Inference engine backed by Gemini `generateContent`
#[derive(Debug)]
pub struct GeminiInferenceEngine {
    client: Client,
    config: InferenceConfig,
}

impl GeminiInferenceEngine {
    /// Create a new Gemini inference engine
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        config.validate().map_err(InferenceError::Configuration)?;

        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        info!(
            base_url = %config.resolved_base_url(),
            model = %config.resolved_model(),
            "Initialized Gemini inference engine"
        );

        Ok(Self { client, config })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.resolved_base_url(),
            self.config.resolved_model()
        )
    }

    fn build_body<'a>(&'a self, request: &'a ChatRequest) -> GenerateRequest<'a> {
        let mut contents: Vec<Content<'a>> = request
            .history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_gemini_role()),
                parts: turn
                    .parts
                    .iter()
                    .map(|p| Part { text: p.text.as_str() })
                    .collect(),
            })
            .collect();
        contents.push(Content {
            role: Some("user"),
            parts: vec![Part {
                text: request.message.as_str(),
            }],
        });

        let system_instruction = request
            .system_prompt
            .as_deref()
            .or(self.config.system_prompt.as_deref())
            .map(|text| Content {
                role: None,
                parts: vec![Part { text }],
            });

        let generation_config = (self.config.temperature.is_some()
            || self.config.max_tokens.is_some())
        .then_some(GenerationConfig {
            temperature: self.config.temperature,
            max_output_tokens: self.config.max_tokens,
        });

        GenerateRequest {
            contents,
            system_instruction,
            generation_config,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
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
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

/// Gemini API error response
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

impl ApiErrorDetail {
    fn into_message(self) -> String {
        match self.status {
            Some(status) => format!("[{status}] {}", self.message),
            None => self.message,
        }
    }
}

#[async_trait]
impl InferenceEngine for GeminiInferenceEngine {
    #[instrument(skip(self, request), fields(model = %self.config.resolved_model(), turns = request.turn_count()))]
    async fn generate(&self, request: &ChatRequest) -> Result<ChatReply, InferenceError> {
        let body = self.build_body(request);

        debug!("Sending request to Gemini");

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::from_transport(&e, self.config.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map_or(body, |e| e.error.into_message());
            warn!(status = %status, message = %message, "Gemini request failed");
            return Err(InferenceError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let generated: GenerateResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let candidate = generated.candidates.into_iter().next();
        let finish_reason = candidate.as_ref().and_then(|c| c.finish_reason.clone());
        let text: String = candidate
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(InferenceError::EmptyResponse(format!(
                "candidate has no text (finish reason: {})",
                finish_reason.as_deref().unwrap_or("none")
            )));
        }

        let usage = generated.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        debug!(tokens = ?usage, "Inference completed");

        Ok(ChatReply {
            text,
            model: generated
                .model_version
                .unwrap_or_else(|| self.config.resolved_model().to_string()),
            usage,
            finish_reason,
        })
    }

    fn provider(&self) -> &'static str {
        "gemini"
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

    const GENERATE_PATH: &str = "/models/gemini-1.5-flash:generateContent";

    fn engine_for(server: &MockServer) -> GeminiInferenceEngine {
        let config = InferenceConfig {
            base_url: Some(server.uri()),
            timeout_ms: 5000,
            ..InferenceConfig::for_provider(Provider::Gemini, "gemini-key")
        };
        GeminiInferenceEngine::new(config).unwrap()
    }

    fn request(text: &str) -> ChatRequest {
        ChatRequest::simple(Prompt::parse(text).unwrap())
    }

    fn candidate(parts: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": parts},
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 4,
                "candidatesTokenCount": 6,
                "totalTokenCount": 10
            },
            "modelVersion": "gemini-1.5-flash-002"
        })
    }

    #[test]
    fn new_fails_without_api_key() {
        let config = InferenceConfig {
            provider: Provider::Gemini,
            ..Default::default()
        };
        let err = GeminiInferenceEngine::new(config).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn body_keeps_roles_and_adds_system_instruction() {
        let config = InferenceConfig {
            system_prompt: Some("Answer briefly".to_string()),
            ..InferenceConfig::for_provider(Provider::Gemini, "k")
        };
        let engine = GeminiInferenceEngine::new(config).unwrap();
        let req = ChatRequest::with_history(
            vec![ChatTurn::user("Hi"), ChatTurn::model("Hello!")],
            Prompt::parse("Weather?").unwrap(),
        );

        let json = serde_json::to_value(engine.build_body(&req)).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][1]["parts"][0]["text"], "Hello!");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "Weather?");
        assert_eq!(json["systemInstruction"]["parts"][0]["text"], "Answer briefly");
        assert!(json["systemInstruction"].get("role").is_none());
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn body_includes_generation_config_when_set() {
        let config = InferenceConfig {
            temperature: Some(0.2),
            max_tokens: Some(256),
            ..InferenceConfig::for_provider(Provider::Gemini, "k")
        };
        let engine = GeminiInferenceEngine::new(config).unwrap();
        let json = serde_json::to_value(engine.build_body(&request("x"))).unwrap();
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 256);
    }

    #[tokio::test]
    async fn generate_success_joins_parts() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(header("x-goog-api-key", "gemini-key"))
            .and(body_partial_json(serde_json::json!({
                "contents": [{"role": "user", "parts": [{"text": "Hello"}]}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate(
                serde_json::json!([{"text": "Hi "}, {"text": "there!"}]),
            )))
            .expect(1)
            .mount(&server)
            .await;

        let reply = engine_for(&server).generate(&request("Hello")).await.unwrap();

        assert_eq!(reply.text, "Hi there!");
        assert_eq!(reply.model, "gemini-1.5-flash-002");
        assert_eq!(reply.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(reply.usage.unwrap().completion_tokens, 6);
    }

    #[tokio::test]
    async fn candidate_without_text_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();

        assert!(matches!(err, InferenceError::EmptyResponse(_)));
        assert!(err.to_string().contains("SAFETY"));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[tokio::test]
    async fn whitespace_text_is_empty_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(candidate(serde_json::json!([{"text": "  \n"}]))),
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
    async fn overloaded_model_is_server_overload() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_json(serde_json::json!({
                "error": {
                    "code": 503,
                    "message": "The model is overloaded. Please try again later.",
                    "status": "UNAVAILABLE"
                }
            })))
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ServerOverload);
        assert!(err.to_string().contains("[UNAVAILABLE] The model is overloaded"));
    }

    #[tokio::test]
    async fn resource_exhausted_is_rate_limited() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(429).set_body_json(serde_json::json!({
                "error": {"code": 429, "message": "Resource has been exhausted", "status": "RESOURCE_EXHAUSTED"}
            })))
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
    }

    #[tokio::test]
    async fn bad_request_is_not_retryable() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}
            })))
            .mount(&server)
            .await;

        let err = engine_for(&server)
            .generate(&request("Hello"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        assert_eq!(err.kind(), ErrorKind::Other);
    }

    #[test]
    fn provider_and_model() {
        let engine =
            GeminiInferenceEngine::new(InferenceConfig::for_provider(Provider::Gemini, "k"))
                .unwrap();
        assert_eq!(engine.provider(), "gemini");
        assert_eq!(engine.model(), "gemini-1.5-flash");
    }
}
