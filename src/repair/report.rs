//! Per-statement results and the run report.

use serde::{Deserialize, Serialize};

/// Terminal state of one statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementOutcome {
    /// The statement, possibly after repairs, executed successfully.
    Executed,
    /// The repair budget ran out before the statement succeeded.
    GaveUp,
}

/// Result for one non-blank input statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementResult {
    /// Position in the input list (blank entries included).
    pub index: usize,
    /// The statement as supplied.
    pub original_statement: String,
    /// The last text sent to the executor.
    pub final_statement: String,
    /// Terminal state.
    pub outcome: StatementOutcome,
    /// Number of execution attempts.
    pub attempts: u32,
    /// Number of oracle repairs applied.
    pub repairs: u32,
    /// Diagnostic of the last failed attempt, for statements that gave up.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl StatementResult {
    /// Returns true if the oracle rewrote the statement.
    pub fn was_repaired(&self) -> bool {
        self.repairs > 0
    }
}

/// Outcome of a whole run, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// One entry per non-blank statement that was attempted.
    pub results: Vec<StatementResult>,
    /// True if the run stopped after a statement gave up.
    pub stopped_early: bool,
}

impl RunReport {
    /// Number of statements that executed.
    pub fn executed_count(&self) -> usize {
        self.count(StatementOutcome::Executed)
    }

    /// Number of statements that gave up.
    pub fn gave_up_count(&self) -> usize {
        self.count(StatementOutcome::GaveUp)
    }

    /// Number of statements that needed at least one repair.
    pub fn repaired_count(&self) -> usize {
        self.results.iter().filter(|r| r.was_repaired()).count()
    }

    /// True if every attempted statement executed and the run was not cut short.
    pub fn all_executed(&self) -> bool {
        !self.stopped_early && self.gave_up_count() == 0
    }

    fn count(&self, outcome: StatementOutcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }
}
