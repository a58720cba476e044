//! npm-harness - sequential integration tests for the npm command-line tool

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod process;
pub mod scenarios;

// Re-export commonly used types
pub use crate::core::{Chain, CommandSpec, EnvironmentDescriptor, HarnessError, PackageSet, RunContext};
pub use crate::execution::{ChainRunner, CommandExecutor, ExecutionEvent, Harness, HarnessSettings};
pub use crate::process::{ProcessSpawner, SpawnRequest, SubprocessSpawner};
pub use crate::scenarios::{ScenarioKind, CATALOG};
