//! Bulk install-then-test

use crate::{
    core::{error::Result, Chain, RunContext},
    execution::Harness,
    process::ProcessSpawner,
    scenarios::{npm, setup},
};

pub fn commands<S: ProcessSpawner>(harness: &Harness<S>) -> Chain {
    let packages = harness.packages().main();
    let tool_source = harness.settings().tool_source.display().to_string();

    let installs: Chain = packages
        .iter()
        .map(|p| npm(["install".to_string(), harness.package_arg(p)]))
        .collect();
    let tests: Chain = packages.iter().map(|p| npm(["test", *p])).collect();
    let removals: Chain = packages
        .iter()
        .copied()
        .chain(std::iter::once("npm"))
        .map(|p| npm(["rm", p]))
        .collect();

    Chain::new()
        .then(npm(["install".to_string(), tool_source]))
        .then_chain(installs)
        .then_chain(tests)
        .then_chain(removals)
}

/// Install the tool and every package, test each, remove them all
pub async fn run<S: ProcessSpawner>(harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
    setup::run(harness, ctx).await?;
    harness.runner().run(commands(harness), ctx).await
}
