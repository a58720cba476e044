//! Command executor - runs one command against the isolated environment

use crate::{
    core::{
        error::{HarnessError, Result},
        CommandSpec, EnvironmentDescriptor, ExecutableTable, ExecutionRecord, Expectation,
        Outcome, RunContext,
    },
    execution::ExecutionEvent,
    process::{ProcessSpawner, SpawnRequest},
};
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes single commands and records their outcome
pub struct CommandExecutor<S> {
    spawner: S,
    executables: ExecutableTable,
    env: Arc<EnvironmentDescriptor>,
    working_dir: PathBuf,
}

impl<S: ProcessSpawner> CommandExecutor<S> {
    /// Create an executor whose commands default to `env` and `working_dir`
    pub fn new(spawner: S, env: Arc<EnvironmentDescriptor>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            spawner,
            executables: ExecutableTable::for_environment(&env),
            env,
            working_dir: working_dir.into(),
        }
    }

    /// Default environment of every command
    pub fn env(&self) -> &Arc<EnvironmentDescriptor> {
        &self.env
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn spawner(&self) -> &S {
        &self.spawner
    }

    /// Resolve a command into a concrete process invocation
    pub fn request_for(&self, spec: &CommandSpec) -> SpawnRequest {
        let env = spec.env.as_ref().unwrap_or(&self.env);
        SpawnRequest {
            program: self.executables.resolve(&spec.executable),
            args: spec.args.clone(),
            cwd: spec.cwd.clone().unwrap_or_else(|| self.working_dir.clone()),
            env: env.vars().clone(),
        }
    }

    /// Execute a command and append its result to the run
    ///
    /// Resolves when the exit status matches the command's expectation;
    /// otherwise returns `HarnessError::CommandFailed` carrying the literal
    /// command text. Output content is never inspected.
    pub async fn execute(&self, spec: &CommandSpec, ctx: &mut RunContext) -> Result<()> {
        debug!("Executing command: {}", spec.line);
        ctx.emit(ExecutionEvent::CommandStarted {
            command: spec.line.clone(),
            expectation: spec.expectation,
        });

        let started_at = Utc::now();
        let request = self.request_for(spec);

        let (exited_zero, exit_code, spawn_error) = match self.spawner.spawn(&request).await {
            Ok(output) => {
                if !output.stdout.trim().is_empty() || !output.stderr.trim().is_empty() {
                    ctx.emit(ExecutionEvent::CommandOutput {
                        command: spec.line.clone(),
                        stdout: output.stdout.clone(),
                        stderr: output.stderr.clone(),
                    });
                }
                (output.success(), output.exit_code, None)
            }
            Err(e) => {
                // Counts as a non-zero exit, like a shell that cannot find the program
                warn!("Spawn failed for '{}': {}", spec.line, e);
                (false, None, Some(e.to_string()))
            }
        };

        let met = spec.expectation.is_met(exited_zero);
        let error = if met {
            None
        } else {
            Some(mismatch_detail(spec.expectation, exit_code, spawn_error))
        };

        let record = ExecutionRecord {
            sequence: ctx.next_sequence(),
            command: spec.line.clone(),
            outcome: if met { Outcome::Ok } else { Outcome::NotOk },
            expectation: spec.expectation,
            exit_code,
            error: error.clone(),
            started_at,
            finished_at: Utc::now(),
        };
        debug!("Command {} finished: {:?}", record.sequence, record.outcome);
        ctx.record(record);

        if met {
            Ok(())
        } else {
            Err(HarnessError::CommandFailed {
                command: spec.line.clone(),
                detail: error,
            })
        }
    }
}

fn mismatch_detail(expectation: Expectation, exit_code: Option<i32>, spawn_error: Option<String>) -> String {
    match (expectation, spawn_error, exit_code) {
        (Expectation::Failure, _, _) => "exited with code 0 but failure was expected".to_string(),
        (Expectation::Success, Some(e), _) => e,
        (Expectation::Success, None, Some(code)) => format!("exited with code {}", code),
        (Expectation::Success, None, None) => "terminated by signal".to_string(),
    }
}
