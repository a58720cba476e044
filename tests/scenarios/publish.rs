//! Test: Publish round-trip

use crate::helpers::*;
use npm_harness::core::error::HarnessError;
use npm_harness::core::RunContext;
use npm_harness::scenarios::publish;

const PRIVATE_PUBLISH: &str = "npm publish packages/npm-test-private -s";
const PRIVATE_UNPUBLISH: &str = "npm unpublish npm-test-private --force";

fn publish_spawner() -> MockSpawner {
    MockSpawner::healthy().fail_on(PRIVATE_PUBLISH)
}

#[tokio::test]
async fn test_skipped_without_opt_in() {
    let bed = test_bed(&["A", "B"], MockSpawner::healthy(), false);
    let (mut ctx, events) = recording_context();

    publish::run(&bed.harness, &mut ctx).await.unwrap();

    assert_eq!(ctx.executed(), 0);
    assert!(bed.spawner.invocations().is_empty());
    assert_eq!(*events.lock().unwrap(), vec!["skipped:publish"]);
}

#[tokio::test]
async fn test_round_trip_for_publishable_packages() {
    let bed = test_bed(&["A", "B", "D-fail", "npm-test-private"], publish_spawner(), true);
    let mut ctx = RunContext::new();

    publish::run(&bed.harness, &mut ctx).await.unwrap();

    let mut expected = bed.setup_lines();
    expected.extend(
        [
            "npm publish packages/A",
            "npm install A",
            "npm unpublish A --force",
            "npm publish packages/B",
            "npm install B",
            "npm unpublish B --force",
            PRIVATE_PUBLISH,
        ]
        .iter()
        .map(|s| s.to_string()),
    );
    assert_eq!(bed.spawner.lines(), expected);
    assert_all_ok(&ctx);
    assert_plan(&ctx, 9);
    assert_eq!(ctx.tap_lines()[8], format!("ok 9 {}", PRIVATE_PUBLISH));
    assert!(bed.root().is_dir(), "cleanup should leave a fresh root");
}

#[tokio::test]
async fn test_private_publish_success_is_compensated() {
    let bed = test_bed(&["A"], MockSpawner::healthy(), true);
    let mut ctx = RunContext::new();

    let result = publish::run(&bed.harness, &mut ctx).await;

    // Compensation succeeded, so the original failure comes back as is
    assert!(matches!(result, Err(HarnessError::CommandFailed { .. })));
    assert_failed_on(&result, PRIVATE_PUBLISH);
    assert_eq!(
        bed.spawner.lines().last().map(String::as_str),
        Some(PRIVATE_UNPUBLISH)
    );
    assert_eq!(ctx.failures(), 1);
}

#[tokio::test]
async fn test_failed_compensation_keeps_both_errors() {
    let spawner = MockSpawner::healthy().fail_on(PRIVATE_UNPUBLISH);
    let bed = test_bed(&["A"], spawner, true);
    let mut ctx = RunContext::new();

    let result = publish::run(&bed.harness, &mut ctx).await;

    match &result {
        Err(HarnessError::Compensated {
            original,
            compensation,
        }) => {
            assert_eq!(original.failed_command(), Some(PRIVATE_PUBLISH));
            assert_eq!(compensation.failed_command(), Some(PRIVATE_UNPUBLISH));
        }
        other => panic!("expected compensated failure, got {:?}", other),
    }
    assert_failed_on(&result, PRIVATE_PUBLISH);
    assert_eq!(ctx.failures(), 2);
}

#[tokio::test]
async fn test_cleanup_skipped_after_private_failure() {
    let bed = test_bed(&["A"], MockSpawner::healthy(), true);
    let (mut ctx, events) = recording_context();

    let _ = publish::run(&bed.harness, &mut ctx).await;

    let events = events.lock().unwrap();
    assert_eq!(events.last().map(String::as_str), Some("cleanup-skipped"));
    assert!(bed.root().is_dir(), "forensic state should be left in place");
}

#[tokio::test]
async fn test_package_failure_skips_private_check() {
    let spawner = publish_spawner().fail_on("npm install A");
    let bed = test_bed(&["A", "B"], spawner, true);
    let mut ctx = RunContext::new();

    let result = publish::run(&bed.harness, &mut ctx).await;

    assert_failed_on(&result, "npm install A");
    assert!(!bed.spawner.was_invoked("npm unpublish A --force"));
    assert!(!bed.spawner.was_invoked(PRIVATE_PUBLISH));
}
