//! Test: Per-package install/test/remove

use crate::helpers::*;
use npm_harness::core::RunContext;
use npm_harness::scenarios::install_each;

#[tokio::test]
async fn test_each_package_gets_its_own_triple() {
    let bed = test_bed(&["B", "A", "C-dev", "D-fail"], MockSpawner::healthy(), false);
    let mut ctx = RunContext::new();

    install_each::run(&bed.harness, &mut ctx).await.unwrap();

    let mut expected = bed.setup_lines();
    expected.extend(
        [
            "npm install packages/A",
            "npm test A",
            "npm rm A",
            "npm install packages/B",
            "npm test B",
            "npm rm B",
            "npm rm npm",
        ]
        .iter()
        .map(|s| s.to_string()),
    );

    assert_eq!(bed.spawner.lines(), expected);
    assert_all_ok(&ctx);
    assert_plan(&ctx, 9);
}

#[tokio::test]
async fn test_failure_stops_remaining_packages() {
    let spawner = MockSpawner::healthy().fail_on("npm test A");
    let bed = test_bed(&["A", "B"], spawner, false);
    let mut ctx = RunContext::new();

    let result = install_each::run(&bed.harness, &mut ctx).await;

    assert_failed_on(&result, "npm test A");
    assert!(!bed.spawner.was_invoked("npm rm A"));
    assert!(!bed.spawner.was_invoked("npm install packages/B"));
    assert!(!bed.spawner.was_invoked("npm rm npm"));
    assert_eq!(ctx.tap_lines().last().map(String::as_str), Some("not ok 4 npm test A"));
}
