//! Provider selection
//!
//! Builds the inference engine for the configured provider once at startup.

use std::sync::Arc;

use tracing::info;

use crate::{
    config::{InferenceConfig, Provider},
    error::InferenceError,
    gemini::GeminiInferenceEngine,
    openai::OpenAIInferenceEngine,
    ports::InferenceEngine,
};

/// Create the engine for `config.provider`
pub fn engine_for(config: InferenceConfig) -> Result<Arc<dyn InferenceEngine>, InferenceError> {
    let provider = config.provider;
    let engine: Arc<dyn InferenceEngine> = match provider {
        Provider::OpenAI => Arc::new(OpenAIInferenceEngine::new(config)?),
        Provider::Gemini => Arc::new(GeminiInferenceEngine::new(config)?),
    };

    info!(provider = %provider, model = %engine.model(), "Selected inference provider");
    Ok(engine)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_openai() {
        let engine = engine_for(InferenceConfig::for_provider(Provider::OpenAI, "k")).unwrap();
        assert_eq!(engine.provider(), "openai");
    }

    #[test]
    fn selects_gemini_with_model_override() {
        let config = InferenceConfig {
            model: Some("gemini-2.0-flash".to_string()),
            ..InferenceConfig::for_provider(Provider::Gemini, "k")
        };
        let engine = engine_for(config).unwrap();
        assert_eq!(engine.provider(), "gemini");
        assert_eq!(engine.model(), "gemini-2.0-flash");
    }

    #[test]
    fn missing_key_fails() {
        let result = engine_for(InferenceConfig::default());
        assert!(matches!(result, Err(InferenceError::Configuration(_))));
    }
}
