//! Test: Bulk install-then-test

use crate::helpers::*;
use npm_harness::core::RunContext;
use npm_harness::scenarios::bulk_install;

#[tokio::test]
async fn test_bulk_install_order() {
    let bed = test_bed(&["A", "B", "C-dev", "D-fail"], MockSpawner::healthy(), false);
    let mut ctx = RunContext::new();

    bulk_install::run(&bed.harness, &mut ctx).await.unwrap();

    let mut expected = bed.setup_lines();
    expected.extend(
        [
            format!("npm install {}", bed.tool_source().display()),
            "npm install packages/A".to_string(),
            "npm install packages/B".to_string(),
            "npm test A".to_string(),
            "npm test B".to_string(),
            "npm rm A".to_string(),
            "npm rm B".to_string(),
            "npm rm npm".to_string(),
        ]
        .into_iter(),
    );

    assert_eq!(bed.spawner.lines(), expected);
    assert_all_ok(&ctx);
    assert_plan(&ctx, 10);
    assert_sequential(&ctx);
}

#[tokio::test]
async fn test_bootstrap_report_line_is_quoted() {
    let bed = test_bed(&["A"], MockSpawner::healthy(), false);
    let mut ctx = RunContext::new();

    bulk_install::run(&bed.harness, &mut ctx).await.unwrap();

    let cli = bed.tool_source().join("bin").join("npm-cli.js");
    assert_eq!(
        ctx.tap_lines()[0],
        format!("ok 1 node \"{}\" install \"{}\"", cli.display(), bed.tool_source().display())
    );
    // The spawned arguments carry no quotes
    assert_eq!(bed.spawner.lines()[0], bed.bootstrap_line());
}

#[tokio::test]
async fn test_bulk_install_excludes_variants() {
    let bed = test_bed(&["A", "B", "C-dev", "D-fail", ".hidden"], MockSpawner::healthy(), false);
    let mut ctx = RunContext::new();

    bulk_install::run(&bed.harness, &mut ctx).await.unwrap();

    for line in bed.spawner.lines() {
        assert!(!line.contains("C-dev"), "dev package leaked into bulk: {}", line);
        assert!(!line.contains("D-fail"), "failing package leaked into bulk: {}", line);
        assert!(!line.contains(".hidden"), "hidden entry leaked into bulk: {}", line);
    }
}

#[tokio::test]
async fn test_bulk_install_uses_isolated_environment() {
    let bed = test_bed(&["A"], MockSpawner::healthy(), false);
    let mut ctx = RunContext::new();

    bulk_install::run(&bed.harness, &mut ctx).await.unwrap();

    let invocations = bed.spawner.invocations();
    let root = bed.root().to_path_buf();

    // Bootstrap goes through the runtime, everything else through the installed tool
    assert_eq!(invocations[0].program, std::path::PathBuf::from("/usr/bin/node"));
    for request in &invocations[1..] {
        assert_eq!(request.program, root.join("bin").join("npm"));
    }

    for request in &invocations {
        assert_eq!(request.cwd, bed.test_dir());
        assert_eq!(
            request.var("npm_config_prefix"),
            Some(root.to_str().unwrap())
        );
        assert_eq!(request.var("npm_config_global"), Some("true"));
        assert_eq!(request.var("npm_config_npat"), Some("false"));
    }

    assert!(root.is_dir(), "setup should recreate the isolated root");
}

#[tokio::test]
async fn test_bulk_install_with_no_packages() {
    let bed = test_bed(&[], MockSpawner::healthy(), false);
    let mut ctx = RunContext::new();

    bulk_install::run(&bed.harness, &mut ctx).await.unwrap();

    // setup, tool install, tool removal
    assert_plan(&ctx, 4);
    assert_eq!(bed.spawner.lines().last().map(String::as_str), Some("npm rm npm"));
}
