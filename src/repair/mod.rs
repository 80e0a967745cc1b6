//! Statement repair for cypher-mend.
//!
//! Drives each statement through execute, repair and re-execute until it
//! succeeds or exhausts its repair budget. The database and the oracle are
//! injected behind traits so either can be swapped for a test double.

mod observer;
mod oracle;
mod report;
mod runner;

pub use observer::{NoopObserver, RecordingObserver, RepairEvent, RepairObserver};
pub use oracle::{LlmRepairOracle, QueryRepairOracle};
pub use report::{RunReport, StatementOutcome, StatementResult};
pub use runner::{GiveUpPolicy, RunnerConfig, StatementRepairRunner};
