//! Audit trail of the repair loop.
//!
//! The runner reports every execution, failure, oracle call and replacement
//! as a `RepairEvent`, so a human can see exactly what the oracle changed.

use serde::Serialize;
use std::sync::Mutex;

/// One step of the repair loop. `index` is the statement's position in the input list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RepairEvent {
    /// A blank statement was skipped.
    Skipped { index: usize },
    /// An execution attempt is starting.
    Executing {
        index: usize,
        attempt: u32,
        statement: String,
    },
    /// The attempt succeeded.
    Executed { index: usize, attempt: u32 },
    /// The attempt failed with a database diagnostic.
    Failed {
        index: usize,
        attempt: u32,
        message: String,
    },
    /// The oracle is being asked for repair number `repair`.
    Repairing { index: usize, repair: u32 },
    /// The oracle's reply replaced the statement.
    Replaced {
        index: usize,
        previous: String,
        replacement: String,
    },
    /// The repair budget is exhausted.
    GaveUp { index: usize, attempts: u32 },
}

impl RepairEvent {
    /// Returns the statement index the event refers to.
    pub fn index(&self) -> usize {
        match self {
            Self::Skipped { index }
            | Self::Executing { index, .. }
            | Self::Executed { index, .. }
            | Self::Failed { index, .. }
            | Self::Repairing { index, .. }
            | Self::Replaced { index, .. }
            | Self::GaveUp { index, .. } => *index,
        }
    }
}

/// Receives the runner's audit events.
pub trait RepairObserver: Send + Sync {
    /// Called synchronously for every event, in order.
    fn on_event(&self, event: &RepairEvent);
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RepairObserver for NoopObserver {
    fn on_event(&self, _event: &RepairEvent) {}
}

/// Observer that keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RepairEvent>>,
}

impl RecordingObserver {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the events recorded so far.
    pub fn events(&self) -> Vec<RepairEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl RepairObserver for RecordingObserver {
    fn on_event(&self, event: &RepairEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
