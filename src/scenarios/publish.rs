//! Publish round-trip against the configured registry

use crate::{
    core::{error::Result, Chain, HarnessError, RunContext},
    execution::{ExecutionEvent, Harness},
    process::ProcessSpawner,
    scenarios::{finish_with_cleanup, npm, setup, ScenarioKind},
};
use tracing::{info, warn};

/// Package that must be refused by the registry
pub const PRIVATE_PACKAGE: &str = "npm-test-private";

/// Shown when the scenario is not enabled
pub const OPT_IN_HINT: &str = "To test publishing: npm config set npm:publishtest true";

pub fn commands<S: ProcessSpawner>(harness: &Harness<S>) -> Chain {
    harness
        .packages()
        .publishable()
        .into_iter()
        .map(|p| {
            Chain::new()
                .then(npm(["publish".to_string(), harness.package_arg(p)]))
                .then(npm(["install", p]))
                .then(npm(["unpublish", p, "--force"]))
        })
        .collect()
}

/// Publish, install and unpublish each package, then check the private one
pub async fn run<S: ProcessSpawner>(harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
    if !harness.settings().publish_enabled {
        info!("Publish scenario not enabled");
        ctx.emit(ExecutionEvent::ScenarioSkipped {
            name: ScenarioKind::Publish.name(),
            reason: OPT_IN_HINT.to_string(),
        });
        return Ok(());
    }

    setup::run(harness, ctx).await?;
    harness.runner().run(commands(harness), ctx).await?;
    private_check(harness, ctx).await
}

/// Publishing the private package must fail
///
/// If it succeeds the package is force-unpublished before the failure is
/// reported, and cleanup is attempted either way.
async fn private_check<S: ProcessSpawner>(harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
    let runner = harness.runner();
    let publish = npm(["publish".to_string(), harness.package_arg(PRIVATE_PACKAGE), "-s".to_string()])
        .expect_failure();

    let outcome = match runner.exec(publish, ctx).await {
        Ok(()) => Ok(()),
        Err(original) => {
            warn!("Private package was published, unpublishing it");
            let compensation = runner
                .exec(npm(["unpublish", PRIVATE_PACKAGE, "--force"]), ctx)
                .await;
            Err(HarnessError::compensated(original, compensation))
        }
    };

    finish_with_cleanup(runner, ctx, outcome).await
}
