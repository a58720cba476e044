//! Harness error taxonomy

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a chain or the whole run
#[derive(Debug, Error)]
pub enum HarnessError {
    /// A command's exit status did not match its expectation
    #[error("failed {command}")]
    CommandFailed {
        command: String,
        detail: Option<String>,
    },

    /// A failure that triggered a corrective action which also failed
    #[error("{original}; compensating action also failed: {compensation}")]
    Compensated {
        original: Box<HarnessError>,
        compensation: Box<HarnessError>,
    },

    /// The host environment could not be read
    #[error("cannot read host environment: {0}")]
    Environment(String),

    /// The isolated root could not be removed or recreated
    #[error("cannot reset isolated root {}: {source}", path.display())]
    IsolatedRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The sample package directory could not be listed
    #[error("cannot list sample packages in {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl HarnessError {
    /// Combine a failure with the outcome of its compensating action.
    ///
    /// The original failure is always kept; a successful compensation
    /// leaves it untouched.
    pub fn compensated(original: HarnessError, compensation: Result<()>) -> Self {
        match compensation {
            Ok(()) => original,
            Err(e) => HarnessError::Compensated {
                original: Box::new(original),
                compensation: Box::new(e),
            },
        }
    }

    /// The literal command text of an expectation mismatch, if any
    pub fn failed_command(&self) -> Option<&str> {
        match self {
            HarnessError::CommandFailed { command, .. } => Some(command),
            HarnessError::Compensated { original, .. } => original.failed_command(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
