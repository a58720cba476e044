//! Dev-dependency install, run in each package's own directory

use crate::{
    core::{error::Result, Chain, PackageSet, RunContext},
    execution::{ExecutionEvent, Harness},
    process::ProcessSpawner,
    scenarios::{npm, setup, ScenarioKind},
};
use std::sync::Arc;
use tracing::info;

pub fn commands<S: ProcessSpawner>(harness: &Harness<S>, packages: &PackageSet) -> Chain {
    let dev_env = Arc::new(harness.runner().env().dev_variant());

    let per_package: Chain = packages
        .dev()
        .into_iter()
        .map(|p| {
            let dir = packages.path_of(p);
            Chain::new()
                .then(npm(["install"]).in_dir(&dir).with_env(dev_env.clone()))
                .then(npm(["test"]).in_dir(&dir).with_env(dev_env.clone()))
                .then(npm(["rm", p]))
        })
        .collect();

    Chain::new().then_chain(per_package).then(npm(["rm", "npm"]))
}

/// Install and test every dev-only package with global mode off
///
/// Packages are listed again here rather than taken from run start. With
/// no dev packages nothing runs, not even setup.
pub async fn run<S: ProcessSpawner>(harness: &Harness<S>, ctx: &mut RunContext) -> Result<()> {
    let packages = PackageSet::discover(harness.packages().dir())?;
    if packages.dev().is_empty() {
        info!("No dev packages found");
        ctx.emit(ExecutionEvent::ScenarioSkipped {
            name: ScenarioKind::DevDependencies.name(),
            reason: "no dev packages".to_string(),
        });
        return Ok(());
    }

    setup::run(harness, ctx).await?;
    harness.runner().run(commands(harness, &packages), ctx).await
}
