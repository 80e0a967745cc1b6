//! LLM client factory.
//!
//! Centralizes provider-specific logic for creating LLM clients.

use crate::config::LlmConfig;
use crate::error::{MendError, Result};
use crate::llm::ollama::{DEFAULT_OLLAMA_MODEL, DEFAULT_OLLAMA_URL};
use crate::llm::{
    AnthropicClient, AnthropicConfig, LlmClient, LlmProvider, MockLlmClient, OllamaClient,
    OllamaConfig, OpenAiClient, OpenAiConfig,
};

/// Creates an LLM client for the configured provider.
///
/// If `api_key` is provided, it takes precedence over environment variables.
/// For providers that require an API key (OpenAI, Anthropic), the key is resolved in order:
/// 1. Provided `api_key` parameter
/// 2. Environment variable (`OPENAI_API_KEY` or `ANTHROPIC_API_KEY`)
///
/// The model is taken from `config.model`, then from the environment:
/// - `OPENAI_MODEL` (defaults to "gpt-4o")
/// - `ANTHROPIC_MODEL` (defaults to "claude-sonnet-4-20250514")
/// - `OLLAMA_MODEL` (defaults to "llama3.2:3b")
///
/// `config.base_url` overrides the endpoint for OpenAI-compatible gateways and
/// Ollama; `OPENAI_BASE_URL` and `OLLAMA_URL` are consulted otherwise.
pub fn create_client(config: &LlmConfig, api_key: Option<String>) -> Result<Box<dyn LlmClient>> {
    let model_or_env = |var: &str, default: &str| {
        config
            .model
            .clone()
            .or_else(|| std::env::var(var).ok())
            .unwrap_or_else(|| default.to_string())
    };

    match config.provider {
        LlmProvider::OpenAi => {
            let key = api_key
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| {
                    MendError::llm("No API key configured. Set OPENAI_API_KEY.")
                })?;
            let mut openai = OpenAiConfig::new(key, model_or_env("OPENAI_MODEL", "gpt-4o"))
                .with_timeout(config.timeout_secs);
            if let Some(base_url) = config
                .base_url
                .clone()
                .or_else(|| std::env::var("OPENAI_BASE_URL").ok())
            {
                openai = openai.with_base_url(base_url);
            }
            Ok(Box::new(OpenAiClient::new(openai)?))
        }
        LlmProvider::Anthropic => {
            let key = api_key
                .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
                .ok_or_else(|| {
                    MendError::llm("No API key configured. Set ANTHROPIC_API_KEY.")
                })?;
            let model = model_or_env("ANTHROPIC_MODEL", "claude-sonnet-4-20250514");
            Ok(Box::new(AnthropicClient::new(
                AnthropicConfig::new(key, model).with_timeout(config.timeout_secs),
            )?))
        }
        LlmProvider::Ollama => {
            let base_url = config
                .base_url
                .clone()
                .or_else(|| std::env::var("OLLAMA_URL").ok())
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());
            let ollama = OllamaConfig::new(model_or_env("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL))
                .with_url(base_url)
                .with_timeout(config.timeout_secs);
            Ok(Box::new(OllamaClient::new(ollama)?))
        }
        LlmProvider::Mock => Ok(Box::new(MockLlmClient::new())),
    }
}
