//! Command execution, chain running and run control

pub mod controller;
pub mod engine;
pub mod executor;

pub use controller::{publish_opted_in, Harness, HarnessSettings};
pub use engine::{ChainRunner, ExecutionEvent};
pub use executor::CommandExecutor;
