//! Execution state models

use crate::core::command::Expectation;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Run has not started
    Pending,
    /// Scenarios are executing
    Running,
    /// Every scenario completed
    Completed,
    /// A failure halted the run
    Failed,
}

/// Outcome of one executed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    NotOk,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

/// Record of one executed command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    /// 1-based position in the run
    pub sequence: usize,

    /// Literal command text
    pub command: String,

    pub outcome: Outcome,

    pub expectation: Expectation,

    /// Exit code, if the process ran and exited normally
    pub exit_code: Option<i32>,

    /// Failure detail for not-ok records
    pub error: Option<String>,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,
}

impl ExecutionRecord {
    /// TAP line for this record
    pub fn tap_line(&self) -> String {
        match self.outcome {
            Outcome::Ok => format!("ok {} {}", self.sequence, self.command),
            Outcome::NotOk => format!("not ok {} {}", self.sequence, self.command),
        }
    }
}

/// Trailing TAP plan line for a run of `total` commands
pub fn plan_line(total: usize) -> String {
    format!("1..{}", total)
}
