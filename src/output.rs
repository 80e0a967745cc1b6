//! Console output for cypher-mend.
//!
//! Stdout is the report channel: in text mode every audit event becomes one
//! line, followed by a summary; in JSON mode only the serialized report is
//! printed. Logs go to stderr or a file, never here.

use std::fmt;
use std::io::Write;
use std::str::FromStr;
use std::sync::Mutex;

use crate::error::{MendError, Result};
use crate::repair::{RepairEvent, RepairObserver, RunReport};

/// Format of the final report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = MendError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(MendError::config(format!(
                "Unknown output format: {s} (expected text or json)"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Formats one audit event as a console line. Statement numbers are one-based.
pub fn format_event(event: &RepairEvent) -> String {
    let n = event.index() + 1;
    match event {
        RepairEvent::Skipped { .. } => format!("[{n}] skipped (blank)"),
        RepairEvent::Executing {
            attempt, statement, ..
        } => format!("[{n}] attempt {attempt}: executing {}", single_line(statement)),
        RepairEvent::Executed { .. } => format!("[{n}] ok"),
        RepairEvent::Failed { message, .. } => format!("[{n}] failed: {}", single_line(message)),
        RepairEvent::Repairing { repair, .. } => format!("[{n}] requesting repair {repair}"),
        RepairEvent::Replaced { replacement, .. } => {
            format!("[{n}] replaced with: {}", single_line(replacement))
        }
        RepairEvent::GaveUp { attempts, .. } => {
            format!("[{n}] gave up after {attempts} attempt(s)")
        }
    }
}

/// Formats the one-line run summary.
pub fn format_summary(report: &RunReport) -> String {
    let mut summary = format!(
        "{} statement(s): {} executed ({} repaired), {} gave up",
        report.results.len(),
        report.executed_count(),
        report.repaired_count(),
        report.gave_up_count()
    );
    if report.stopped_early {
        summary.push_str(", run stopped early");
    }
    summary
}

/// Renders the final report for stdout.
pub fn render_report(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_summary(report)),
        OutputFormat::Json => serde_json::to_string_pretty(report)
            .map_err(|e| MendError::internal(format!("Failed to serialize report: {e}"))),
    }
}

/// Collapses newlines so each event stays on one line.
fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Observer that prints every audit event as a line.
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
}

impl ConsoleReporter {
    /// Creates a reporter that writes to stdout.
    pub fn stdout() -> Self {
        Self::new(Box::new(std::io::stdout()))
    }

    /// Creates a reporter that writes to `out`.
    pub fn new(out: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }
}

impl RepairObserver for ConsoleReporter {
    fn on_event(&self, event: &RepairEvent) {
        if let Ok(mut out) = self.out.lock() {
            // A closed stdout must not stop the run.
            let _ = writeln!(out, "{}", format_event(event));
            let _ = out.flush();
        }
    }
}
