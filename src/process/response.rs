//! Process output types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error types for process spawning
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("cannot start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutput {
    /// Exit code; `None` when terminated by a signal
    pub exit_code: Option<i32>,

    pub stdout: String,

    pub stderr: String,
}

impl ProcessOutput {
    /// Create an output with the given exit code and no captured text
    pub fn with_code(exit_code: i32) -> Self {
        Self {
            exit_code: Some(exit_code),
            ..Self::default()
        }
    }

    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self
    }

    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = stderr.into();
        self
    }

    /// Whether the process exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}
