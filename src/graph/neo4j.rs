//! Neo4j executor implementation.
//!
//! Provides the `Neo4jExecutor` struct that implements the `QueryExecutor`
//! trait for Neo4j databases using neo4rs over Bolt.

use crate::config::GraphConfig;
use crate::error::{MendError, Result};
use crate::graph::{ExecutionOutcome, QueryExecutor};
use async_trait::async_trait;
use neo4rs::{query, ConfigBuilder, Graph};
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of connection retry attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between retry attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Statement used to verify the connection after the pool is built.
const PING_STATEMENT: &str = "RETURN 1";

/// Neo4j statement executor.
pub struct Neo4jExecutor {
    graph: Graph,
}

impl Neo4jExecutor {
    /// Connects to Neo4j and verifies the connection with a ping.
    ///
    /// Transient failures (refused connections, timeouts) are retried with
    /// exponential backoff; authentication failures are not.
    pub async fn connect(config: &GraphConfig) -> Result<Self> {
        let uri = config.effective_uri();

        let mut last_error = String::new();
        let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);

        for attempt in 1..=MAX_RETRY_ATTEMPTS {
            debug!("Connection attempt {} of {}", attempt, MAX_RETRY_ATTEMPTS);

            let result = match Graph::connect(driver_config(config)?).await {
                Ok(graph) => match graph.run(query(PING_STATEMENT)).await {
                    Ok(()) => Ok(graph),
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            };

            match result {
                Ok(graph) => {
                    debug!("Successfully connected to {}", uri);
                    return Ok(Self { graph });
                }
                Err(e) => {
                    last_error = e.to_string();
                    let is_transient = is_transient_error(&last_error);

                    if attempt < MAX_RETRY_ATTEMPTS && is_transient {
                        warn!(
                            "Connection attempt {} failed (transient error), retrying in {:?}",
                            attempt, delay
                        );
                        tokio::time::sleep(delay).await;
                        delay *= 2; // Exponential backoff
                    } else {
                        break;
                    }
                }
            }
        }

        Err(map_connection_error(&last_error, config))
    }
}

#[async_trait]
impl QueryExecutor for Neo4jExecutor {
    async fn execute(&self, statement: &str) -> ExecutionOutcome {
        match self.graph.run(query(statement)).await {
            Ok(()) => ExecutionOutcome::Success,
            Err(e) => ExecutionOutcome::failure(e.to_string()),
        }
    }
}

/// Builds the driver configuration from the connection settings.
fn driver_config(config: &GraphConfig) -> Result<neo4rs::Config> {
    let mut builder = ConfigBuilder::default()
        .uri(config.effective_uri())
        .user(config.user.as_deref().unwrap_or("neo4j"))
        .password(config.password.as_deref().unwrap_or_default());
    if let Some(database) = &config.database {
        builder = builder.db(database.as_str());
    }
    builder
        .build()
        .map_err(|e| MendError::config(format!("Invalid Neo4j settings: {e}")))
}

/// Returns true for errors worth retrying while connecting.
fn is_transient_error(message: &str) -> bool {
    let lower = message.to_lowercase();
    if lower.contains("auth") || lower.contains("unauthorized") || lower.contains("credentials") {
        return false;
    }
    lower.contains("connection")
        || lower.contains("refused")
        || lower.contains("timed out")
        || lower.contains("timeout")
        || lower.contains("io error")
        || lower.contains("broken pipe")
        || lower.contains("unavailable")
}

/// Maps a driver error string to a user-facing connection error.
fn map_connection_error(message: &str, config: &GraphConfig) -> MendError {
    let lower = message.to_lowercase();
    let target = config.display_string();

    if lower.contains("auth") || lower.contains("unauthorized") || lower.contains("credentials") {
        return MendError::connection(format!(
            "Authentication failed for {target}. Check NEO4J_USERNAME and NEO4J_PASSWORD."
        ));
    }

    if lower.contains("refused") {
        return MendError::connection(format!(
            "Cannot connect to {target}: connection refused. Is Neo4j running?"
        ));
    }

    if lower.contains("database") && lower.contains("not found") {
        return MendError::connection(format!("Database not found on {target}: {message}"));
    }

    MendError::connection(format!("Cannot connect to {target}: {message}"))
}
