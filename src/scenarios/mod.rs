//! Scenario catalog
//!
//! Each scenario builds its commands when it starts, so package discovery
//! and environment state are read at execution time.

pub mod bulk_install;
pub mod dev_dependencies;
pub mod install_each;
pub mod peer_deps;
pub mod publish;
pub mod setup;

use crate::{
    core::{error::Result, CommandSpec, Executable, RunContext},
    execution::{ChainRunner, Harness},
    process::ProcessSpawner,
};
use serde::Serialize;
use tracing::error;

/// Named scenarios, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    BulkInstall,
    InstallEach,
    DevDependencies,
    Publish,
    PeerDependencies,
}

/// The fixed catalog order
pub const CATALOG: &[ScenarioKind] = &[
    ScenarioKind::BulkInstall,
    ScenarioKind::InstallEach,
    ScenarioKind::DevDependencies,
    ScenarioKind::Publish,
    ScenarioKind::PeerDependencies,
];

impl ScenarioKind {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::BulkInstall => "bulk-install",
            ScenarioKind::InstallEach => "install-each",
            ScenarioKind::DevDependencies => "dev-dependencies",
            ScenarioKind::Publish => "publish",
            ScenarioKind::PeerDependencies => "peer-dependencies",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScenarioKind::BulkInstall => "install every package, test each, remove all",
            ScenarioKind::InstallEach => "install, test and remove each package in turn",
            ScenarioKind::DevDependencies => "install and test dev-only packages in place",
            ScenarioKind::Publish => "publish, install and unpublish each package",
            ScenarioKind::PeerDependencies => "refuse an unmet peer dependency, then force it",
        }
    }

    /// Run this scenario against the harness
    pub async fn run<S: ProcessSpawner>(&self, harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
        match self {
            ScenarioKind::BulkInstall => bulk_install::run(harness, ctx).await,
            ScenarioKind::InstallEach => install_each::run(harness, ctx).await,
            ScenarioKind::DevDependencies => dev_dependencies::run(harness, ctx).await,
            ScenarioKind::Publish => publish::run(harness, ctx).await,
            ScenarioKind::PeerDependencies => peer_deps::run(harness, ctx).await,
        }
    }
}

/// A command for the tool under test
pub fn npm<I, A>(args: I) -> CommandSpec
where
    I: IntoIterator<Item = A>,
    A: Into<String>,
{
    CommandSpec::from_parts(Executable::Tool, args.into_iter().map(Into::into).collect())
}

/// Run cleanup after a scenario body, keeping the body's error first
///
/// A cleanup error is returned only when the body succeeded.
pub(crate) async fn finish_with_cleanup<S: ProcessSpawner>(
    runner: &ChainRunner<S>,
    ctx: &mut RunContext,
    outcome: Result<()>,
) -> Result<()> {
    let cleanup = runner.cleanup(ctx).await;
    match (outcome, cleanup) {
        (Err(e), Err(cleanup_err)) => {
            error!("Cleanup failed after earlier error: {}", cleanup_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), cleanup) => cleanup,
    }
}
