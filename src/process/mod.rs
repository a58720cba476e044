//! Process spawning seam
//!
//! The executor never touches `tokio::process` directly; it goes through
//! [`ProcessSpawner`] so scenarios can be driven by scripted exit codes.

pub mod response;
pub mod subprocess;

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

pub use response::{ProcessOutput, SpawnError};
pub use subprocess::SubprocessSpawner;

/// A fully resolved process invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Absolute path (or PATH-relative name) of the program
    pub program: PathBuf,

    pub args: Vec<String>,

    pub cwd: PathBuf,

    /// Complete environment; nothing else is inherited
    pub env: BTreeMap<OsString, OsString>,
}

impl SpawnRequest {
    /// Look up a variable that holds valid UTF-8
    pub fn var(&self, key: &str) -> Option<&str> {
        self.env.get(OsStr::new(key)).and_then(|v| v.to_str())
    }
}

/// Trait for running one child process to completion
#[async_trait]
pub trait ProcessSpawner: Send + Sync {
    /// Run the process and capture its exit status and output
    async fn spawn(&self, request: &SpawnRequest) -> Result<ProcessOutput, SpawnError>;
}
