//! CLI output formatting
//!
//! The TAP report goes to stdout; everything else is diagnostic and goes to
//! stderr.

use crate::{
    core::{Expectation, RunStatus},
    execution::ExecutionEvent,
};
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

/// Prefix every line of trimmed output
pub fn prefix_lines(content: &str, prefix: &str) -> String {
    content
        .trim()
        .lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a run status for display
pub fn format_status(status: RunStatus) -> String {
    match status {
        RunStatus::Pending => style("PENDING").dim().to_string(),
        RunStatus::Running => style("RUNNING").yellow().to_string(),
        RunStatus::Completed => style("COMPLETED").green().to_string(),
        RunStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// TAP text an event contributes to stdout
pub fn format_tap(event: &ExecutionEvent) -> Option<String> {
    match event {
        ExecutionEvent::RunStarted { temp, root, .. } => Some(format!(
            "# testing in {}\n# global prefix = {}",
            temp.display(),
            root.display()
        )),
        ExecutionEvent::CommandFinished { record } => Some(record.tap_line()),
        _ => None,
    }
}

/// Diagnostic text an event contributes to stderr
pub fn format_diagnostic(event: &ExecutionEvent, quiet: bool) -> Option<String> {
    match event {
        ExecutionEvent::CommandStarted {
            command,
            expectation,
        } => {
            let note = match expectation {
                Expectation::Failure => " (expect failure)",
                Expectation::Success => "",
            };
            Some(format!("\n+{}{}", command, note))
        }
        ExecutionEvent::CommandOutput { stdout, stderr, .. } => {
            if quiet {
                return None;
            }
            let mut blocks = Vec::new();
            if !stdout.trim().is_empty() {
                blocks.push(prefix_lines(stdout, " 1> "));
            }
            if !stderr.trim().is_empty() {
                blocks.push(prefix_lines(stderr, " 2> "));
            }
            Some(blocks.join("\n"))
        }
        ExecutionEvent::ScenarioStarted { name } => {
            Some(format!("{} Scenario {}", INFO, style(name).bold()))
        }
        ExecutionEvent::ScenarioSkipped { name, reason } => Some(format!(
            "{} Skipping {}: {}",
            WARN,
            style(name).yellow(),
            reason
        )),
        ExecutionEvent::CleanupSkipped { failures } => Some(format!(
            "{} Leaving isolated root in place after {} failures",
            WARN, failures
        )),
        ExecutionEvent::RunFinished { executed, status } => {
            let icon = match status {
                RunStatus::Completed => CHECK,
                _ => CROSS,
            };
            Some(format!(
                "{} {} commands, {}",
                icon,
                style(executed).cyan(),
                format_status(*status)
            ))
        }
        ExecutionEvent::RunStarted { .. }
        | ExecutionEvent::CommandFinished { .. }
        | ExecutionEvent::CleanupCompleted { .. } => None,
    }
}
