//! Mock executor for testing and dry runs.
//!
//! Provides an in-memory executor that never touches a database. By default
//! it rejects statements with unbalanced brackets or unterminated literals,
//! which is enough to exercise the repair loop end to end.

use super::{ExecutionOutcome, QueryExecutor};
use async_trait::async_trait;
use std::sync::Mutex;

/// A mock executor that fails statements by rule and records every call.
#[derive(Debug)]
pub struct MockExecutor {
    /// Failure rules (pattern -> diagnostic), matched case-insensitively.
    failures: Vec<(String, String)>,
    /// Whether to run the bracket/quote balance check.
    check_syntax: bool,
    /// Every statement passed to `execute`, in call order.
    executed: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Creates a mock executor with the syntax check enabled.
    pub fn new() -> Self {
        Self {
            failures: Vec::new(),
            check_syntax: true,
            executed: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock executor that accepts everything not matched by a rule.
    pub fn permissive() -> Self {
        Self {
            check_syntax: false,
            ..Self::new()
        }
    }

    /// Adds a failure rule.
    ///
    /// When a statement contains `pattern`, execution fails with `message`.
    pub fn with_failure(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.failures.push((pattern.into(), message.into()));
        self
    }

    /// Returns the statements executed so far.
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .map(|log| log.clone())
            .unwrap_or_default()
    }

    fn evaluate(&self, statement: &str) -> ExecutionOutcome {
        let lower = statement.to_lowercase();

        for (pattern, message) in &self.failures {
            if lower.contains(&pattern.to_lowercase()) {
                return ExecutionOutcome::failure(message.clone());
            }
        }

        if self.check_syntax {
            if let Err(message) = check_balanced(statement) {
                return ExecutionOutcome::failure(message);
            }
        }

        ExecutionOutcome::Success
    }
}

impl Default for MockExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    async fn execute(&self, statement: &str) -> ExecutionOutcome {
        if let Ok(mut log) = self.executed.lock() {
            log.push(statement.to_string());
        }
        self.evaluate(statement)
    }
}

/// Checks that brackets pair up and literals are closed.
///
/// Returns a Neo4j-style `SyntaxError` diagnostic on the first problem.
fn check_balanced(statement: &str) -> Result<(), String> {
    let mut stack: Vec<(char, usize)> = Vec::new();
    let mut chars = statement.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                let mut closed = false;
                while let Some((_, inner)) = chars.next() {
                    if inner == '\\' && c != '`' {
                        chars.next();
                    } else if inner == c {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    return Err(format!(
                        "SyntaxError: unterminated {} starting at offset {pos}",
                        if c == '`' { "identifier" } else { "string literal" }
                    ));
                }
            }
            '/' if matches!(chars.peek(), Some((_, '/'))) => {
                for (_, inner) in chars.by_ref() {
                    if inner == '\n' {
                        break;
                    }
                }
            }
            '/' if matches!(chars.peek(), Some((_, '*'))) => {
                chars.next();
                let mut prev = '\0';
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if prev == '*' && inner == '/' {
                        closed = true;
                        break;
                    }
                    prev = inner;
                }
                if !closed {
                    return Err(format!(
                        "SyntaxError: unterminated comment starting at offset {pos}"
                    ));
                }
            }
            '(' | '[' | '{' => stack.push((c, pos)),
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match stack.pop() {
                    Some((open, _)) if open == expected => {}
                    _ => {
                        return Err(format!(
                            "SyntaxError: Invalid input '{c}' at offset {pos}"
                        ))
                    }
                }
            }
            _ => {}
        }
    }

    match stack.pop() {
        Some((open, pos)) => Err(format!(
            "SyntaxError: '{open}' opened at offset {pos} is never closed"
        )),
        None => Ok(()),
    }
}
