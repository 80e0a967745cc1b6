//! Prompt construction for repair requests.
//!
//! Every request is self-contained: the failing statement and its error,
//! never the history of earlier repairs.

use crate::llm::types::Message;

/// System prompt for the Cypher repair assistant.
const SYSTEM_PROMPT: &str = r#"You are an expert in Neo4j and the Cypher query language. You repair Cypher statements that failed to execute.

INSTRUCTIONS:
- Read the database error and fix the statement so that it executes
- Keep the intent of the original statement: same nodes, relationships and properties
- Do not add statements that delete or detach data unless the original did
- Use syntax supported by Neo4j 5

OUTPUT FORMAT:
Return ONLY the corrected Cypher statement.
No explanations, no comments, no markdown code fences."#;

/// Returns the system prompt used for repairs.
pub fn build_system_prompt() -> &'static str {
    SYSTEM_PROMPT
}

/// Builds the user prompt for one repair.
pub fn build_repair_prompt(error_message: &str, failing_statement: &str) -> String {
    format!(
        "The following Cypher statement failed.\n\nERROR:\n{}\n\nSTATEMENT:\n{}\n\nReturn the corrected statement.",
        error_message.trim(),
        failing_statement.trim()
    )
}

/// Builds the complete message list for a repair request.
pub fn build_repair_messages(error_message: &str, failing_statement: &str) -> Vec<Message> {
    vec![
        Message::system(build_system_prompt()),
        Message::user(build_repair_prompt(error_message, failing_statement)),
    ]
}
