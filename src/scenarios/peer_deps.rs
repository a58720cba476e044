//! Peer-dependency enforcement

use crate::{
    core::{error::Result, Chain, RunContext},
    execution::Harness,
    process::ProcessSpawner,
    scenarios::{finish_with_cleanup, npm, setup},
};

/// Package whose peer dependency is never satisfied
pub const PEER_DEPS_PACKAGE: &str = "npm-test-peer-deps-fail";

/// Plain install is refused, a forced install then works normally
pub fn commands<S: ProcessSpawner>(harness: &Harness<S>) -> Chain {
    let package = harness.package_arg(PEER_DEPS_PACKAGE);
    Chain::new()
        .then(npm(["install".to_string(), package.clone()]).expect_failure())
        .then_chain(
            Chain::new()
                .then(npm(["install".to_string(), package, "--force".to_string()]))
                .then(npm(["test", PEER_DEPS_PACKAGE]))
                .then(npm(["rm", PEER_DEPS_PACKAGE])),
        )
}

pub async fn run<S: ProcessSpawner>(harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
    setup::run(harness, ctx).await?;
    let outcome = harness.runner().run(commands(harness), ctx).await;
    finish_with_cleanup(harness.runner(), ctx, outcome).await
}
