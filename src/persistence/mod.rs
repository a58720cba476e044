//! Run summary written after a run

use crate::core::{ExecutionRecord, RunContext, RunStatus};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished (if it did)
    pub finished_at: Option<DateTime<Utc>>,

    /// Number of executed commands
    pub executed: usize,

    /// Number of not-ok commands
    pub failures: usize,

    pub status: RunStatus,

    /// Every executed command, in order
    pub records: Vec<ExecutionRecord>,
}

/// Create a summary from a run context
pub fn create_summary(ctx: &RunContext) -> RunSummary {
    RunSummary {
        run_id: ctx.run_id,
        started_at: ctx.started_at,
        finished_at: ctx.finished_at,
        executed: ctx.executed(),
        failures: ctx.failures(),
        status: ctx.status,
        records: ctx.records().to_vec(),
    }
}

/// Write a summary as pretty-printed JSON
pub async fn write_summary(summary: &RunSummary, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(summary)?;
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    Ok(())
}

/// Read a summary back
pub async fn read_summary(path: impl AsRef<Path>) -> Result<RunSummary> {
    let path = path.as_ref();
    let json = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read summary {}", path.display()))?;
    Ok(serde_json::from_str(&json)?)
}
