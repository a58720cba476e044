//! Test utility functions for npm-harness
#![allow(dead_code)]

use npm_harness::core::error::HarnessError;
use npm_harness::core::{EnvironmentBuilder, HostEnvironment, PackageSet, Platform, RunContext};
use npm_harness::execution::{ChainRunner, CommandExecutor, ExecutionEvent, Harness, HarnessSettings};
use npm_harness::process::{ProcessOutput, ProcessSpawner, SpawnError, SpawnRequest};

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Peer-dependency package whose plain install must be refused
pub const PEER_DEPS_INSTALL: &str = "npm install packages/npm-test-peer-deps-fail";

/// Mock spawner with scripted exit codes keyed by command text
///
/// Every command exits 0 unless scripted otherwise. Clones share the
/// invocation log.
#[derive(Clone, Default)]
pub struct MockSpawner {
    exit_codes: Arc<HashMap<String, i32>>,
    invocations: Arc<Mutex<Vec<SpawnRequest>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the given command exit with `code`
    pub fn exit_with(mut self, line: &str, code: i32) -> Self {
        let mut codes = (*self.exit_codes).clone();
        codes.insert(line.to_string(), code);
        self.exit_codes = Arc::new(codes);
        self
    }

    /// Make the given command exit 1
    pub fn fail_on(self, line: &str) -> Self {
        self.exit_with(line, 1)
    }

    /// Spawner under which a full run is all-ok
    pub fn healthy() -> Self {
        Self::new().fail_on(PEER_DEPS_INSTALL)
    }

    /// Every spawned command, in order
    pub fn invocations(&self) -> Vec<SpawnRequest> {
        self.invocations.lock().unwrap().clone()
    }

    /// Command text of every spawned command, in order
    pub fn lines(&self) -> Vec<String> {
        self.invocations().iter().map(command_line).collect()
    }

    pub fn was_invoked(&self, line: &str) -> bool {
        self.lines().iter().any(|l| l == line)
    }

    /// Highest number of commands ever running at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessSpawner for MockSpawner {
    async fn spawn(&self, request: &SpawnRequest) -> Result<ProcessOutput, SpawnError> {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(running, Ordering::SeqCst);
        self.invocations.lock().unwrap().push(request.clone());

        // Give any concurrently scheduled command a chance to overlap
        tokio::task::yield_now().await;

        let line = command_line(request);
        let code = self.exit_codes.get(&line).copied().unwrap_or(0);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(ProcessOutput::with_code(code).with_stdout(format!("ran {}", line)))
    }
}

/// Reconstruct command text from a resolved request
///
/// The program is shown by file name, so the installed tool reads as `npm`
/// and the runtime as `node`.
pub fn command_line(request: &SpawnRequest) -> String {
    let program = request
        .program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    std::iter::once(program)
        .chain(request.args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Temporary tool source tree, test directory and isolated temp root
pub struct TestBed {
    pub dir: TempDir,
    pub spawner: MockSpawner,
    pub harness: Harness<MockSpawner>,
}

impl TestBed {
    pub fn tool_source(&self) -> PathBuf {
        self.dir.path().join("src")
    }

    pub fn test_dir(&self) -> PathBuf {
        self.tool_source().join("test")
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.test_dir().join("packages")
    }

    /// Isolated root the harness installs into
    pub fn root(&self) -> &Path {
        self.harness.runner().env().root()
    }

    /// `node <cli> install <source>` as spawned
    pub fn bootstrap_line(&self) -> String {
        format!(
            "node {} install {}",
            self.tool_source().join("bin").join("npm-cli.js").display(),
            self.tool_source().display()
        )
    }

    /// Setup commands as spawned
    pub fn setup_lines(&self) -> Vec<String> {
        vec![self.bootstrap_line(), "npm config set package-config:foo boo".to_string()]
    }

    /// Add a package directory after the harness was built
    pub fn add_package(&self, name: &str) {
        std::fs::create_dir_all(self.packages_dir().join(name)).unwrap();
    }
}

/// Build a harness over the given sample packages
pub fn test_bed(packages: &[&str], spawner: MockSpawner, publish: bool) -> TestBed {
    let dir = tempfile::tempdir().unwrap();
    let tool_source = dir.path().join("src");
    let test_dir = tool_source.join("test");
    let packages_dir = test_dir.join("packages");
    let temp = dir.path().join("tmp");
    std::fs::create_dir_all(&packages_dir).unwrap();
    std::fs::create_dir_all(&temp).unwrap();
    for name in packages {
        std::fs::create_dir_all(packages_dir.join(name)).unwrap();
    }

    let host = HostEnvironment::from_vars([
        ("PATH".to_string(), "/usr/bin:/bin".to_string()),
        ("TMPDIR".to_string(), temp.display().to_string()),
    ]);
    let env = EnvironmentBuilder::new(host, "/usr/bin/node")
        .with_platform(Platform::Posix)
        .with_pid(4242)
        .build()
        .unwrap();

    let settings = HarnessSettings {
        test_dir: test_dir.clone(),
        tool_cli: tool_source.join("bin").join("npm-cli.js"),
        tool_source,
        config_values: BTreeMap::from([("package-config:foo".to_string(), "boo".to_string())]),
        publish_enabled: publish,
    };

    let packages = PackageSet::discover(&packages_dir).unwrap();
    let executor = CommandExecutor::new(spawner.clone(), Arc::new(env), &test_dir);
    let harness = Harness::new(ChainRunner::new(executor), packages, settings);

    TestBed {
        dir,
        spawner,
        harness,
    }
}

/// Context that records a short tag for every event
pub fn recording_context() -> (RunContext, Arc<Mutex<Vec<String>>>) {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    let mut ctx = RunContext::new();
    ctx.add_event_handler(move |event| {
        let tag = match event {
            ExecutionEvent::RunStarted { .. } => "run-started".to_string(),
            ExecutionEvent::ScenarioStarted { name } => format!("scenario:{}", name),
            ExecutionEvent::ScenarioSkipped { name, .. } => format!("skipped:{}", name),
            ExecutionEvent::CommandStarted { .. } => return,
            ExecutionEvent::CommandOutput { .. } => return,
            ExecutionEvent::CommandFinished { record } => record.tap_line(),
            ExecutionEvent::CleanupSkipped { .. } => "cleanup-skipped".to_string(),
            ExecutionEvent::CleanupCompleted { .. } => "cleanup".to_string(),
            ExecutionEvent::RunFinished { executed, .. } => format!("run-finished:{}", executed),
        };
        sink.lock().unwrap().push(tag);
    });
    (ctx, events)
}

/// Run the whole catalog
pub async fn run_all(bed: &TestBed) -> (RunContext, Result<(), HarnessError>) {
    let mut ctx = RunContext::new();
    let result = bed.harness.run(&mut ctx).await;
    (ctx, result)
}

/// Assert every record is ok
pub fn assert_all_ok(ctx: &RunContext) {
    let failed: Vec<_> = ctx
        .records()
        .iter()
        .filter(|r| !r.outcome.is_ok())
        .map(|r| r.tap_line())
        .collect();
    assert!(failed.is_empty(), "Expected no failures, got: {:?}", failed);
}

/// Assert the plan line matches the number of report lines
pub fn assert_plan(ctx: &RunContext, expected: usize) {
    assert_eq!(ctx.tap_lines().len(), expected, "Report lines: {:#?}", ctx.tap_lines());
    assert_eq!(ctx.plan_line(), format!("1..{}", expected));
}

/// Assert sequence numbers run 1..=n without gaps
pub fn assert_sequential(ctx: &RunContext) {
    for (index, record) in ctx.records().iter().enumerate() {
        assert_eq!(record.sequence, index + 1, "Out of order: {}", record.tap_line());
        assert!(record.finished_at >= record.started_at);
        if index > 0 {
            assert!(
                record.started_at >= ctx.records()[index - 1].finished_at,
                "{} started before its predecessor finished",
                record.command
            );
        }
    }
}

/// Assert the run failed on exactly this command
pub fn assert_failed_on(result: &Result<(), HarnessError>, command: &str) {
    match result {
        Err(e) => assert_eq!(e.failed_command(), Some(command), "Unexpected error: {}", e),
        Ok(()) => panic!("Expected failure on '{}', run succeeded", command),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_line_uses_program_file_name() {
        let request = SpawnRequest {
            program: PathBuf::from("/tmp/npm-test-1/root/bin/npm"),
            args: vec!["install".to_string(), "packages/A".to_string()],
            cwd: PathBuf::from("/"),
            env: BTreeMap::new(),
        };
        assert_eq!(command_line(&request), "npm install packages/A");
    }

    #[tokio::test]
    async fn test_mock_spawner_scripted_codes() {
        let spawner = MockSpawner::new().fail_on("npm test B");
        let request = |args: &[&str]| SpawnRequest {
            program: PathBuf::from("/x/npm"),
            args: args.iter().map(|s| s.to_string()).collect(),
            cwd: PathBuf::from("/"),
            env: BTreeMap::new(),
        };

        let ok = spawner.spawn(&request(&["test", "A"])).await.unwrap();
        let bad = spawner.spawn(&request(&["test", "B"])).await.unwrap();
        assert!(ok.success());
        assert_eq!(bad.exit_code, Some(1));
        assert_eq!(spawner.lines(), vec!["npm test A", "npm test B"]);
    }
}
