//! The repair oracle: proposes a replacement for a failing statement.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{MendError, Result};
use crate::llm::{build_repair_messages, extract_statement, LlmClient};

/// A service that turns a failing statement and its error into a corrected statement.
///
/// Each call is independent; implementations must not carry history between
/// calls. An `Err` means the oracle itself is unusable and aborts the run.
#[async_trait]
pub trait QueryRepairOracle: Send + Sync {
    /// Returns a complete, directly executable replacement for `failing_statement`.
    async fn repair(&self, error_message: &str, failing_statement: &str) -> Result<String>;
}

/// Repair oracle backed by an LLM completion endpoint.
pub struct LlmRepairOracle {
    client: Box<dyn LlmClient>,
}

impl LlmRepairOracle {
    /// Creates an oracle that asks `client` for corrections.
    pub fn new(client: Box<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueryRepairOracle for LlmRepairOracle {
    async fn repair(&self, error_message: &str, failing_statement: &str) -> Result<String> {
        let messages = build_repair_messages(error_message, failing_statement);
        debug!("Requesting repair for statement: {}", failing_statement);

        let reply = self.client.complete(&messages).await?;
        let statement = extract_statement(&reply);

        if statement.is_empty() {
            return Err(MendError::llm("LLM returned an empty response"));
        }

        Ok(statement)
    }
}
