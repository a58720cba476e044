//! Setup - fresh isolated root with the tool under test installed

use crate::{
    core::{error::Result, Chain, CommandSpec, Executable, RunContext},
    execution::{Harness, HarnessSettings},
    process::ProcessSpawner,
    scenarios::npm,
};

/// Commands that bootstrap the tool into the isolated root
///
/// The bootstrap line always quotes both paths in the report.
pub fn commands(settings: &HarnessSettings) -> Chain {
    let cli = settings.tool_cli.display().to_string();
    let source = settings.tool_source.display().to_string();
    let line = format!("node \"{}\" install \"{}\"", cli, source);
    let bootstrap =
        CommandSpec::from_parts(Executable::Runtime, vec![cli, "install".to_string(), source])
            .display_as(line);

    let mut chain = Chain::new().then(bootstrap);
    for (key, value) in &settings.config_values {
        chain = chain.then(npm(["config", "set", key.as_str(), value.as_str()]));
    }
    chain
}

/// Clean the root, then install and configure the tool
pub async fn run<S: ProcessSpawner>(harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
    let runner = harness.runner();
    runner.cleanup(ctx).await?;
    runner.run(commands(harness.settings()), ctx).await
}
