//! Configuration for chat inference

use std::{fmt, str::FromStr};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Upstream generative-AI provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI chat completions
    #[default]
    OpenAI,
    /// Google Gemini `generateContent`
    Gemini,
}

impl Provider {
    /// Environment variable that holds this provider's API key
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAI => "OPENAI_API_KEY",
            Self::Gemini => "GEMINI_API_KEY",
        }
    }

    /// Default REST base URL
    pub const fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAI => "https://api.openai.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Default chat model
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAI => "gpt-3.5-turbo",
            Self::Gemini => "gemini-1.5-flash",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAI => write!(f, "openai"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" | "chatgpt" => Ok(Self::OpenAI),
            "gemini" | "google" => Ok(Self::Gemini),
            _ => Err(format!(
                "Invalid provider: {s}. Use 'openai' or 'gemini'"
            )),
        }
    }
}

/// Configuration for the inference adapter
#[derive(Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Provider to talk to
    #[serde(default)]
    pub provider: Provider,

    /// API key (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Base URL override (defaults per provider)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Model override (defaults per provider)
    #[serde(default)]
    pub model: Option<String>,

    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Sampling temperature, provider default when unset
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate, provider default when unset
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// System prompt prepended to every conversation
    #[serde(default)]
    pub system_prompt: Option<String>,
}

const fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            api_key: None,
            base_url: None,
            model: None,
            timeout_ms: default_timeout_ms(),
            temperature: None,
            max_tokens: None,
            system_prompt: None,
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("provider", &self.provider)
            .field(
                "api_key",
                &if self.api_key.is_some() {
                    Some("[REDACTED]")
                } else {
                    None
                },
            )
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_ms", &self.timeout_ms)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

impl InferenceConfig {
    /// Config for a provider with an API key and all other values defaulted
    pub fn for_provider(provider: Provider, api_key: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: Some(SecretString::from(api_key.into())),
            ..Default::default()
        }
    }

    /// Base URL without a trailing slash
    pub fn resolved_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
            .trim_end_matches('/')
    }

    /// Model to use
    pub fn resolved_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    /// API key, empty when missing
    pub fn api_key_str(&self) -> &str {
        self.api_key.as_ref().map_or("", |k| k.expose_secret())
    }

    /// Check that the adapter can be built from this config
    pub fn validate(&self) -> Result<(), String> {
        if self.api_key_str().trim().is_empty() {
            return Err(format!(
                "{} is required for the {} provider",
                self.provider.api_key_env(),
                self.provider
            ));
        }
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be greater than zero".to_string());
        }
        Ok(())
    }
}
