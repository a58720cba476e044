//! Core domain models for the harness
//!
//! This module defines the environment, command, chain and package data
//! the scenarios are built from, plus the run context that records results.

pub mod chain;
pub mod command;
pub mod config;
pub mod context;
pub mod env;
pub mod error;
pub mod packages;
pub mod state;

pub use chain::*;
pub use command::*;
pub use context::*;
pub use env::{EnvironmentBuilder, EnvironmentDescriptor, HostEnvironment, Platform};
pub use error::HarnessError;
pub use packages::PackageSet;
pub use state::*;
