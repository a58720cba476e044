//! Child process spawner backed by tokio

use crate::process::{ProcessOutput, ProcessSpawner, SpawnError, SpawnRequest};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Runs commands as real child processes
#[derive(Debug, Clone, Default)]
pub struct SubprocessSpawner;

impl SubprocessSpawner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessSpawner for SubprocessSpawner {
    /// Spawn the program with exactly the requested environment and wait for it
    ///
    /// # Errors
    /// Returns `SpawnError` if the program cannot be started or waited on.
    /// A non-zero exit is not an error.
    async fn spawn(&self, request: &SpawnRequest) -> Result<ProcessOutput, SpawnError> {
        debug!(
            "Spawning {} with {} args in {}",
            request.program.display(),
            request.args.len(),
            request.cwd.display()
        );

        let output = Command::new(&request.program)
            .args(&request.args)
            .current_dir(&request.cwd)
            .env_clear()
            .envs(&request.env)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| SpawnError::Spawn {
                program: request.program.display().to_string(),
                source,
            })?;

        let exit_code = output.status.code();
        if exit_code.is_none() {
            warn!("{} terminated by signal", request.program.display());
        }

        Ok(ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
