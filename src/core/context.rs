//! Run context - the explicit state threaded through every execution

use crate::core::state::{plan_line, ExecutionRecord, RunStatus};
use crate::execution::ExecutionEvent;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// State of a single run
///
/// Holds the append-only execution log, from which the command counter and
/// the failure count are derived. Separate contexts never share counters.
#[derive(Clone)]
pub struct RunContext {
    /// Unique run ID
    pub run_id: Uuid,

    pub status: RunStatus,

    pub started_at: DateTime<Utc>,

    pub finished_at: Option<DateTime<Utc>>,

    records: Vec<ExecutionRecord>,

    handlers: Vec<EventHandler>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: RunStatus::Pending,
            started_at: Utc::now(),
            finished_at: None,
            records: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.handlers.push(Arc::new(handler));
    }

    /// Emit an event to all handlers
    pub fn emit(&self, event: ExecutionEvent) {
        for handler in &self.handlers {
            handler(&event);
        }
    }

    /// Sequence number the next executed command will receive
    pub fn next_sequence(&self) -> usize {
        self.records.len() + 1
    }

    /// Append a record and announce it
    pub fn record(&mut self, record: ExecutionRecord) {
        self.records.push(record.clone());
        self.emit(ExecutionEvent::CommandFinished { record });
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    /// Number of commands executed so far
    pub fn executed(&self) -> usize {
        self.records.len()
    }

    /// Number of not-ok commands so far
    pub fn failures(&self) -> usize {
        self.records.iter().filter(|r| !r.outcome.is_ok()).count()
    }

    /// TAP lines emitted so far, in order
    pub fn tap_lines(&self) -> Vec<String> {
        self.records.iter().map(ExecutionRecord::tap_line).collect()
    }

    /// Final TAP plan line
    pub fn plan_line(&self) -> String {
        plan_line(self.executed())
    }

    pub fn start(&mut self) {
        self.status = RunStatus::Running;
        self.started_at = Utc::now();
    }

    /// Close the run with its final status
    pub fn finish(&mut self, succeeded: bool) {
        self.status = if succeeded {
            RunStatus::Completed
        } else {
            RunStatus::Failed
        };
        self.finished_at = Some(Utc::now());
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("run_id", &self.run_id)
            .field("status", &self.status)
            .field("records", &self.records.len())
            .field("handlers", &self.handlers.len())
            .finish()
    }
}
