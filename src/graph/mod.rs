//! Graph database abstraction layer for cypher-mend.
//!
//! Provides a trait-based interface for executing Cypher statements, so the
//! repair runner can drive a live Neo4j instance or an in-memory mock.

mod mock;
mod neo4j;

pub use mock::MockExecutor;
pub use neo4j::Neo4jExecutor;

use crate::config::GraphConfig;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a single execution attempt.
///
/// A failure is an expected value here, never an error: it is what triggers
/// the repair path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ExecutionOutcome {
    /// The statement ran and its effects are applied.
    Success,
    /// The statement was rejected; `message` is the database diagnostic.
    Failure { message: String },
}

impl ExecutionOutcome {
    /// Creates a failure outcome with the given diagnostic.
    pub fn failure(message: impl Into<String>) -> Self {
        Self::Failure {
            message: message.into(),
        }
    }

    /// Returns true if the attempt succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Trait defining the interface for statement executors.
///
/// Transport problems (dropped connection, auth expiry) are reported as
/// `Failure` as well; the message must be readable by the repair oracle.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Executes one Cypher statement.
    async fn execute(&self, statement: &str) -> ExecutionOutcome;
}

/// Connects to the Neo4j instance described by `config`.
///
/// This is the central factory function for live executors.
pub async fn connect(config: &GraphConfig) -> Result<Box<dyn QueryExecutor>> {
    let executor = Neo4jExecutor::connect(config).await?;
    Ok(Box::new(executor))
}
