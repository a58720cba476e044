//! Chain runner - executes command chains with fail-fast semantics

use crate::{
    core::{
        command::Expectation,
        error::Result,
        state::{ExecutionRecord, RunStatus},
        Chain, CommandSpec, EnvironmentDescriptor, RunContext,
    },
    execution::CommandExecutor,
    process::ProcessSpawner,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        run_id: Uuid,
        temp: PathBuf,
        root: PathBuf,
    },
    ScenarioStarted {
        name: &'static str,
    },
    ScenarioSkipped {
        name: &'static str,
        reason: String,
    },
    CommandStarted {
        command: String,
        expectation: Expectation,
    },
    CommandOutput {
        command: String,
        stdout: String,
        stderr: String,
    },
    CommandFinished {
        record: ExecutionRecord,
    },
    CleanupSkipped {
        failures: usize,
    },
    CleanupCompleted {
        root: PathBuf,
    },
    RunFinished {
        executed: usize,
        status: RunStatus,
    },
}

/// Runs chains strictly in order, stopping at the first failure
pub struct ChainRunner<S> {
    executor: CommandExecutor<S>,
}

impl<S: ProcessSpawner> ChainRunner<S> {
    pub fn new(executor: CommandExecutor<S>) -> Self {
        Self { executor }
    }

    pub fn executor(&self) -> &CommandExecutor<S> {
        &self.executor
    }

    /// Default environment of the run
    pub fn env(&self) -> &Arc<EnvironmentDescriptor> {
        self.executor.env()
    }

    /// Execute every command of the chain in order
    ///
    /// The first failing command stops the chain; later commands are never
    /// spawned and the failure is returned unchanged.
    pub async fn run(&self, chain: Chain, ctx: &mut RunContext) -> Result<()> {
        let commands = chain.flatten();
        debug!("Running chain of {} commands", commands.len());

        for (index, command) in commands.iter().enumerate() {
            if let Err(e) = self.executor.execute(command, ctx).await {
                let skipped = commands.len() - index - 1;
                if skipped > 0 {
                    warn!("Chain halted at '{}', skipping {} commands", command.line, skipped);
                }
                return Err(e);
            }
        }

        Ok(())
    }

    /// Execute a single command
    pub async fn exec(&self, command: CommandSpec, ctx: &mut RunContext) -> Result<()> {
        self.executor.execute(&command, ctx).await
    }

    /// Destroy and recreate the isolated root
    ///
    /// Skipped once any command has failed, leaving the root in place for
    /// inspection.
    pub async fn cleanup(&self, ctx: &mut RunContext) -> Result<()> {
        let failures = ctx.failures();
        if failures > 0 {
            warn!("Skipping cleanup after {} failures", failures);
            ctx.emit(ExecutionEvent::CleanupSkipped { failures });
            return Ok(());
        }

        let env = self.env();
        env.reset_root().await?;
        info!("Cleaned isolated root {}", env.root().display());
        ctx.emit(ExecutionEvent::CleanupCompleted {
            root: env.root().to_path_buf(),
        });
        Ok(())
    }
}
