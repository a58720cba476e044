//! Per-package install/test/remove

use crate::{
    core::{error::Result, Chain, RunContext},
    execution::Harness,
    process::ProcessSpawner,
    scenarios::{npm, setup},
};

pub fn commands<S: ProcessSpawner>(harness: &Harness<S>) -> Chain {
    let per_package: Chain = harness
        .packages()
        .main()
        .into_iter()
        .map(|p| {
            Chain::new()
                .then(npm(["install".to_string(), harness.package_arg(p)]))
                .then(npm(["test", p]))
                .then(npm(["rm", p]))
        })
        .collect();

    Chain::new().then_chain(per_package).then(npm(["rm", "npm"]))
}

/// Install, test and remove each package as its own sub-chain
pub async fn run<S: ProcessSpawner>(harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
    setup::run(harness, ctx).await?;
    harness.runner().run(commands(harness), ctx).await
}
