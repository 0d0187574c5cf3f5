//! Application configuration
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults
//! 2. an optional `config.toml` in the working directory
//! 3. `CHAT_RELAY__SECTION__KEY` environment variables
//! 4. the conventional `PORT`, `HOST`, `AI_PROVIDER`, `OPENAI_API_KEY` and
//!    `GEMINI_API_KEY` variables

use ai_core::{InferenceConfig, Provider, RetryPolicy};
use ai_speech::SpeechConfig;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// Values were read but are not usable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Chat provider configuration
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Transcription and synthesis configuration
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Backoff applied to every outbound call
    #[serde(default)]
    pub retry: RetryPolicy,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins (empty = allow all)
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Graceful shutdown timeout in seconds
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,

    /// Log format: "json" for structured JSON logs, "text" for human-readable
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Body limit for JSON endpoints
    #[serde(default = "default_max_body_size_json_bytes")]
    pub max_body_size_json_bytes: usize,

    /// Body limit for audio uploads
    #[serde(default = "default_max_body_size_audio_bytes")]
    pub max_body_size_audio_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_shutdown_timeout_secs() -> u64 {
    30
}

fn default_log_format() -> String {
    "text".to_string()
}

const fn default_max_body_size_json_bytes() -> usize {
    1024 * 1024
}

const fn default_max_body_size_audio_bytes() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
            log_format: default_log_format(),
            max_body_size_json_bytes: default_max_body_size_json_bytes(),
            max_body_size_audio_bytes: default_max_body_size_audio_bytes(),
        }
    }
}

impl ServerConfig {
    /// Whether logs should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.log_format.eq_ignore_ascii_case("json")
    }

    /// Socket address to bind
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl AppConfig {
    /// Load configuration from file and environment, then validate it
    pub fn load() -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            // e.g. CHAT_RELAY__SERVER__LOG_FORMAT=json
            .add_source(
                config::Environment::with_prefix("CHAT_RELAY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply the conventional environment variables.
    ///
    /// `lookup` returns the value of a variable; blank values count as unset.
    /// Transcription always follows the chat provider.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a valid port: {port}")))?;
        }

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }

        if let Some(provider) = lookup("AI_PROVIDER") {
            self.inference.provider = provider.parse().map_err(ConfigError::Invalid)?;
        }
        self.speech.provider = self.inference.provider;

        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.speech.openai_api_key = Some(SecretString::from(key));
        }
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.speech.gemini_api_key = Some(SecretString::from(key));
        }

        let chat_key = match self.inference.provider {
            Provider::OpenAI => self.speech.openai_key(),
            Provider::Gemini => self.speech.gemini_key(),
        };
        if let Some(key) = chat_key {
            self.inference.api_key = Some(SecretString::from(key.to_string()));
        }

        Ok(())
    }

    /// Check that the server can start with this configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.inference.validate().map_err(ConfigError::Invalid)?;
        self.speech.validate().map_err(ConfigError::Invalid)?;

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }

        if self.server.max_body_size_json_bytes == 0 || self.server.max_body_size_audio_bytes == 0
        {
            return Err(ConfigError::Invalid(
                "Body size limits must be greater than zero".to_string(),
            ));
        }

        if !matches!(self.server.log_format.to_lowercase().as_str(), "text" | "json") {
            return Err(ConfigError::Invalid(format!(
                "Unknown log format: {}. Use 'text' or 'json'",
                self.server.log_format
            )));
        }

        Ok(())
    }
}
