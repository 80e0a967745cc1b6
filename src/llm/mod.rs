//! LLM integration for cypher-mend.
//!
//! Provides traits and implementations for communicating with various LLM
//! providers. The repair oracle builds on top of `LlmClient`.

pub mod anthropic;
pub mod factory;
mod http;
pub mod mock;
pub mod ollama;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod types;

pub use anthropic::{AnthropicClient, AnthropicConfig};
pub use factory::create_client;
pub use http::completion_budget;
pub use mock::MockLlmClient;
pub use ollama::{OllamaClient, OllamaConfig};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use parser::extract_statement;
pub use prompt::build_repair_messages;
pub use types::{Message, Role};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{MendError, Result};

/// Trait for LLM clients that can generate completions.
///
/// Implementations must be thread-safe (Send + Sync) to support async operations.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generates a completion for the given messages.
    ///
    /// Returns the complete response as a single string.
    async fn complete(&self, messages: &[Message]) -> Result<String>;
}

/// Backend that answers repair requests. Deserializes from the lowercase name
/// used in `[llm] provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAi,
    Anthropic,
    Ollama,
    /// Canned local replies; no network and no API key.
    Mock,
}

impl LlmProvider {
    pub const ALL: [LlmProvider; 4] = [Self::OpenAi, Self::Anthropic, Self::Ollama, Self::Mock];

    pub fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Ollama => "ollama",
            Self::Mock => "mock",
        }
    }
}

/// Parses a provider given on the command line, ignoring case.
impl FromStr for LlmProvider {
    type Err = MendError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|provider| provider.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|p| p.name()).collect();
                MendError::config(format!(
                    "Unknown LLM provider '{wanted}'. Expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

impl std::fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
