//! The statement repair runner.
//!
//! Executes statements strictly in input order. A failing statement is sent
//! to the repair oracle together with its diagnostic, and the reply replaces
//! the statement for the next attempt.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::observer::{NoopObserver, RepairEvent, RepairObserver};
use super::oracle::QueryRepairOracle;
use super::report::{RunReport, StatementOutcome, StatementResult};
use crate::error::{MendError, Result};
use crate::graph::{ExecutionOutcome, QueryExecutor};

/// What to do with the remaining statements once one gives up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GiveUpPolicy {
    /// Record the failure and move on to the next statement.
    #[default]
    Continue,
    /// Stop the run after the failing statement.
    Abort,
}

/// Runner settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Oracle calls allowed per statement. Zero disables repair.
    pub max_repair_attempts: u32,
    pub give_up_policy: GiveUpPolicy,
    /// Limit for one executor call. `None` waits forever.
    pub execute_timeout: Option<Duration>,
    /// Limit for one oracle call. `None` waits forever.
    pub repair_timeout: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_repair_attempts: 5,
            give_up_policy: GiveUpPolicy::Continue,
            execute_timeout: Some(Duration::from_secs(30)),
            repair_timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// Runs a list of statements against an executor, repairing failures.
pub struct StatementRepairRunner<'a> {
    executor: &'a dyn QueryExecutor,
    oracle: &'a dyn QueryRepairOracle,
    observer: &'a dyn RepairObserver,
    config: RunnerConfig,
}

impl<'a> StatementRepairRunner<'a> {
    pub fn new(
        executor: &'a dyn QueryExecutor,
        oracle: &'a dyn QueryRepairOracle,
        config: RunnerConfig,
    ) -> Self {
        Self {
            executor,
            oracle,
            observer: &NoopObserver,
            config,
        }
    }

    /// Sends audit events to `observer`.
    pub fn with_observer(mut self, observer: &'a dyn RepairObserver) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs every statement. See [`Self::run_with_cancel`].
    pub async fn run(&self, statements: &[String]) -> Result<RunReport> {
        self.run_with_cancel(statements, &CancellationToken::new())
            .await
    }

    /// Runs every statement in order, stopping if `cancel` fires.
    ///
    /// Blank statements are skipped and produce no result. If the oracle
    /// fails or times out, or the token fires, returns `RunAborted` wrapping
    /// `OracleUnavailable` or `Cancelled` together with the report of the
    /// statements finished so far; their effects stay applied.
    pub async fn run_with_cancel(
        &self,
        statements: &[String],
        cancel: &CancellationToken,
    ) -> Result<RunReport> {
        info!(
            "Running {} statement(s) with up to {} repair(s) each",
            statements.len(),
            self.config.max_repair_attempts
        );

        let mut report = RunReport::default();

        for (index, statement) in statements.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!("Run cancelled before statement {}", index + 1);
                return Err(abort(MendError::Cancelled, report));
            }

            if statement.trim().is_empty() {
                self.emit(RepairEvent::Skipped { index });
                continue;
            }

            let result = match self.run_statement(index, statement, cancel).await {
                Ok(result) => result,
                Err(e) => return Err(abort(e, report)),
            };
            let gave_up = result.outcome == StatementOutcome::GaveUp;
            report.results.push(result);

            if gave_up && self.config.give_up_policy == GiveUpPolicy::Abort {
                warn!("Stopping run after statement {} gave up", index + 1);
                report.stopped_early = true;
                break;
            }
        }

        info!(
            "Run finished: {} executed, {} gave up",
            report.executed_count(),
            report.gave_up_count()
        );

        Ok(report)
    }

    async fn run_statement(
        &self,
        index: usize,
        original: &str,
        cancel: &CancellationToken,
    ) -> Result<StatementResult> {
        let mut current = original.trim().to_string();
        let mut attempts = 0;
        let mut repairs = 0;

        loop {
            attempts += 1;
            self.emit(RepairEvent::Executing {
                index,
                attempt: attempts,
                statement: current.clone(),
            });

            let message = match self.execute(&current, cancel).await? {
                ExecutionOutcome::Success => {
                    self.emit(RepairEvent::Executed {
                        index,
                        attempt: attempts,
                    });
                    return Ok(StatementResult {
                        index,
                        original_statement: original.to_string(),
                        final_statement: current,
                        outcome: StatementOutcome::Executed,
                        attempts,
                        repairs,
                        last_error: None,
                    });
                }
                ExecutionOutcome::Failure { message } => message,
            };

            self.emit(RepairEvent::Failed {
                index,
                attempt: attempts,
                message: message.clone(),
            });

            if repairs >= self.config.max_repair_attempts {
                self.emit(RepairEvent::GaveUp { index, attempts });
                return Ok(StatementResult {
                    index,
                    original_statement: original.to_string(),
                    final_statement: current,
                    outcome: StatementOutcome::GaveUp,
                    attempts,
                    repairs,
                    last_error: Some(message),
                });
            }

            repairs += 1;
            self.emit(RepairEvent::Repairing {
                index,
                repair: repairs,
            });

            let replacement = self.repair(index, &message, &current, cancel).await?;
            self.emit(RepairEvent::Replaced {
                index,
                previous: std::mem::replace(&mut current, replacement.clone()),
                replacement,
            });
        }
    }

    async fn execute(
        &self,
        statement: &str,
        cancel: &CancellationToken,
    ) -> Result<ExecutionOutcome> {
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MendError::Cancelled),
            outcome = with_timeout(self.config.execute_timeout, self.executor.execute(statement)) => outcome,
        };

        Ok(match (outcome, self.config.execute_timeout) {
            (Some(outcome), _) => outcome,
            (None, limit) => ExecutionOutcome::failure(format!(
                "Query timed out after {:?}",
                limit.unwrap_or_default()
            )),
        })
    }

    async fn repair(
        &self,
        index: usize,
        error_message: &str,
        statement: &str,
        cancel: &CancellationToken,
    ) -> Result<String> {
        let reply = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MendError::Cancelled),
            reply = with_timeout(self.config.repair_timeout, self.oracle.repair(error_message, statement)) => reply,
        };

        let reply = match reply {
            Some(Ok(reply)) => reply,
            Some(Err(e)) => return Err(MendError::oracle_unavailable(index, e.to_string())),
            None => {
                return Err(MendError::oracle_unavailable(
                    index,
                    format!(
                        "Repair timed out after {:?}",
                        self.config.repair_timeout.unwrap_or_default()
                    ),
                ))
            }
        };

        let replacement = reply.trim();
        if replacement.is_empty() {
            return Err(MendError::oracle_unavailable(
                index,
                "Oracle returned an empty statement",
            ));
        }

        Ok(replacement.to_string())
    }

    fn emit(&self, event: RepairEvent) {
        match &event {
            RepairEvent::Skipped { index } => debug!("Skipping blank statement {}", index + 1),
            RepairEvent::Executing {
                index,
                attempt,
                statement,
            } => debug!(
                "Statement {} attempt {}: {}",
                index + 1,
                attempt,
                statement
            ),
            RepairEvent::Executed { index, attempt } => {
                info!("Statement {} executed on attempt {}", index + 1, attempt)
            }
            RepairEvent::Failed {
                index,
                attempt,
                message,
            } => warn!(
                "Statement {} attempt {} failed: {}",
                index + 1,
                attempt,
                message
            ),
            RepairEvent::Repairing { index, repair } => {
                debug!("Requesting repair {} for statement {}", repair, index + 1)
            }
            RepairEvent::Replaced {
                index,
                previous,
                replacement,
            } => info!(
                "Statement {} replaced: {} -> {}",
                index + 1,
                previous,
                replacement
            ),
            RepairEvent::GaveUp { index, attempts } => warn!(
                "Giving up on statement {} after {} attempt(s)",
                index + 1,
                attempts
            ),
        }
        self.observer.on_event(&event);
    }
}

/// Wraps a fatal error with the statements that finished before it.
fn abort(cause: MendError, mut report: RunReport) -> MendError {
    warn!(
        "Run aborted after {} finished statement(s)",
        report.results.len()
    );
    report.stopped_early = true;
    MendError::run_aborted(cause, report)
}

/// Awaits `fut`, returning `None` if `limit` elapses first.
async fn with_timeout<F: Future>(limit: Option<Duration>, fut: F) -> Option<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}
