//! Run controller - drives the scenario catalog over one isolated environment

use crate::{
    core::{
        config::HarnessConfig,
        env::PUBLISH_OPT_IN_VAR,
        error::Result,
        HostEnvironment, PackageSet, RunContext,
    },
    execution::{ChainRunner, ExecutionEvent},
    process::ProcessSpawner,
    scenarios::{ScenarioKind, CATALOG},
};
use anyhow::Context as _;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Resolved locations and switches for one run
#[derive(Debug, Clone)]
pub struct HarnessSettings {
    /// Default working directory of every command
    pub test_dir: PathBuf,

    /// Source tree of the tool under test
    pub tool_source: PathBuf,

    /// Bootstrap entry point inside the source tree
    pub tool_cli: PathBuf,

    /// Values set with `npm config set` during setup
    pub config_values: BTreeMap<String, String>,

    /// Whether the publish round-trip runs
    pub publish_enabled: bool,
}

impl HarnessSettings {
    /// Resolve settings from configuration and the host environment
    pub fn from_config(config: &HarnessConfig, host: &HostEnvironment) -> anyhow::Result<Self> {
        let test_dir = config.test_dir()?;
        let tool_source = config
            .tool_source()
            .context("Failed to resolve tool source")?;
        let tool_cli = config.tool_cli()?;

        Ok(Self {
            test_dir,
            tool_source,
            tool_cli,
            config_values: config.config_values.clone(),
            publish_enabled: config.publish_test || publish_opted_in(host),
        })
    }
}

/// Whether the host environment opts into the publish round-trip
pub fn publish_opted_in(host: &HostEnvironment) -> bool {
    host.get(PUBLISH_OPT_IN_VAR) == Some("true")
}

/// Owns everything a run needs and executes the catalog in order
pub struct Harness<S> {
    runner: ChainRunner<S>,
    packages: PackageSet,
    settings: HarnessSettings,
}

impl<S: ProcessSpawner> Harness<S> {
    pub fn new(runner: ChainRunner<S>, packages: PackageSet, settings: HarnessSettings) -> Self {
        Self {
            runner,
            packages,
            settings,
        }
    }

    pub fn runner(&self) -> &ChainRunner<S> {
        &self.runner
    }

    /// Packages discovered at run start
    pub fn packages(&self) -> &PackageSet {
        &self.packages
    }

    pub fn settings(&self) -> &HarnessSettings {
        &self.settings
    }

    /// Argument naming a sample package directory for install and publish
    ///
    /// Relative to the test directory when the packages live beneath it.
    pub fn package_arg(&self, name: &str) -> String {
        let path = self.packages.path_of(name);
        let shown = path
            .strip_prefix(&self.settings.test_dir)
            .map(Path::to_path_buf)
            .unwrap_or(path);
        shown.to_string_lossy().replace('\\', "/")
    }

    /// Execute every scenario in catalog order
    ///
    /// The first unrecovered failure halts the run and is returned after the
    /// context is closed; later scenarios never start.
    pub async fn run(&self, ctx: &mut RunContext) -> Result<()> {
        ctx.start();
        let env = self.runner.env();
        info!("Starting run {} in {}", ctx.run_id, env.temp().display());
        ctx.emit(ExecutionEvent::RunStarted {
            run_id: ctx.run_id,
            temp: env.temp().to_path_buf(),
            root: env.root().to_path_buf(),
        });

        let result = self.run_scenarios(CATALOG, ctx).await;
        if let Err(e) = &result {
            error!("Run halted: {}", e);
        }

        ctx.finish(result.is_ok());
        ctx.emit(ExecutionEvent::RunFinished {
            executed: ctx.executed(),
            status: ctx.status,
        });
        result
    }

    /// Execute the given scenarios in order, stopping at the first failure
    pub async fn run_scenarios(&self, scenarios: &[ScenarioKind], ctx: &mut RunContext) -> Result<()> {
        for scenario in scenarios {
            info!("Scenario: {}", scenario.name());
            ctx.emit(ExecutionEvent::ScenarioStarted {
                name: scenario.name(),
            });
            scenario.run(self, ctx).await?;
        }
        Ok(())
    }
}
