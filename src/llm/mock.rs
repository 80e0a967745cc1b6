//! Mock LLM client for testing.
//!
//! Provides deterministic replies based on input patterns, so the repair
//! loop can be exercised without API keys.

use async_trait::async_trait;
use std::sync::Mutex;

use crate::error::{MendError, Result};
use crate::llm::types::{Message, Role};
use crate::llm::LlmClient;

/// Mock LLM client that returns canned responses based on input patterns.
///
/// Without a matching pattern it "repairs" the statement in the request by
/// closing any brackets left open, which is what the mock executor's syntax
/// check complains about.
#[derive(Debug, Default)]
pub struct MockLlmClient {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
    /// When set, every call fails with this message.
    failure: Option<String>,
    /// User prompts received, in call order.
    requests: Mutex<Vec<String>>,
}

impl MockLlmClient {
    /// Creates a new mock client with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock client whose every call fails.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Adds a custom response mapping.
    ///
    /// When the input contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Returns the user prompts received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    /// Generates a mock response based on the input.
    fn mock_response(&self, input: &str) -> String {
        let input_lower = input.to_lowercase();

        for (pattern, response) in &self.custom_responses {
            if input_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        match statement_section(input) {
            Some(statement) => close_open_brackets(statement),
            None => "RETURN 1".to_string(),
        }
    }

    /// Extracts the last user message content from a message list.
    fn extract_user_input(messages: &[Message]) -> String {
        messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String> {
        let input = Self::extract_user_input(messages);
        if let Ok(mut log) = self.requests.lock() {
            log.push(input.clone());
        }

        if let Some(message) = &self.failure {
            return Err(MendError::llm(message.clone()));
        }

        Ok(self.mock_response(&input))
    }
}

/// Returns the statement section of a repair prompt.
fn statement_section(prompt: &str) -> Option<&str> {
    let start = prompt.find("STATEMENT:\n")? + "STATEMENT:\n".len();
    let rest = &prompt[start..];
    let end = rest.find("\n\n").unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Appends closers for brackets that are still open, ignoring quoted text.
fn close_open_brackets(statement: &str) -> String {
    let mut open = Vec::new();
    let mut quote: Option<char> = None;

    for c in statement.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => open.push(')'),
            (None, '[') => open.push(']'),
            (None, '{') => open.push('}'),
            (None, ')' | ']' | '}') => {
                open.pop();
            }
            _ => {}
        }
    }

    let mut repaired = statement.to_string();
    if let Some(q) = quote {
        repaired.push(q);
    }
    repaired.extend(open.into_iter().rev());
    repaired
}
