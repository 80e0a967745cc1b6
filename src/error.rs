//! Error types for cypher-mend.
//!
//! A failing Cypher statement is not an error: it is an
//! `ExecutionOutcome::Failure` and goes through the repair path. Everything
//! here is either fatal to the run or a setup problem.

use thiserror::Error;

use crate::repair::RunReport;

#[derive(Error, Debug)]
pub enum MendError {
    /// The graph database could not be reached or refused the session.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Provider-level failure talking to an LLM: HTTP status, transport, unparseable or empty reply.
    #[error("LLM error: {0}")]
    Llm(String),

    /// The repair oracle failed while repairing the statement at zero-based `index`.
    #[error("Repair oracle unavailable while repairing statement {}: {}", .index + 1, .reason)]
    OracleUnavailable { index: usize, reason: String },

    /// Bad config file, unknown provider, missing key or no statements to run.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading statement scripts or writing output failed.
    #[error("I/O error: {0}")]
    Io(String),

    /// The run was cancelled from outside (Ctrl-C).
    #[error("Run cancelled")]
    Cancelled,

    #[error("Internal error: {0}")]
    Internal(String),

    /// A fatal error cut the run short. `report` lists the statements that ran
    /// before it, whose effects stay applied.
    #[error("{cause}")]
    RunAborted {
        cause: Box<MendError>,
        report: Box<RunReport>,
    },
}

impl MendError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    pub fn oracle_unavailable(index: usize, reason: impl Into<String>) -> Self {
        Self::OracleUnavailable {
            index,
            reason: reason.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self::Io(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn run_aborted(cause: MendError, report: RunReport) -> Self {
        Self::RunAborted {
            cause: Box::new(cause),
            report: Box::new(report),
        }
    }

    /// The underlying error, looking through `RunAborted`.
    pub fn cause(&self) -> &MendError {
        match self {
            Self::RunAborted { cause, .. } => cause.cause(),
            other => other,
        }
    }

    /// The report of a run that stopped on this error, if any.
    pub fn partial_report(&self) -> Option<&RunReport> {
        match self {
            Self::RunAborted { report, .. } => Some(report.as_ref()),
            _ => None,
        }
    }

    /// Short label printed ahead of the message when the run aborts.
    pub fn category(&self) -> &'static str {
        match self {
            Self::RunAborted { cause, .. } => cause.category(),
            Self::Connection(_) => "Connection Error",
            Self::Llm(_) => "LLM Error",
            Self::OracleUnavailable { .. } => "Oracle Error",
            Self::Config(_) => "Configuration Error",
            Self::Io(_) => "I/O Error",
            Self::Cancelled => "Cancelled",
            Self::Internal(_) => "Internal Error",
        }
    }
}

pub type Result<T> = std::result::Result<T, MendError>;
