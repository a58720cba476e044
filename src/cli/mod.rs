//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{ListCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;
use tracing_subscriber::EnvFilter;

/// Integration test harness for the npm command-line tool
#[derive(Debug, Parser, Clone)]
#[command(name = "npm-harness")]
#[command(version = "0.1.0")]
#[command(about = "Runs npm install/test/remove scenarios in an isolated prefix", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to harness configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Don't echo captured child output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run every scenario
    Run(RunCommand),

    /// Validate the harness configuration
    Validate(ValidateCommand),

    /// List scenarios and discovered packages
    List(ListCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

/// Log filter from `RUST_LOG` directives, falling back to the verbosity flag
pub fn log_filter(verbose: bool, directives: Option<&str>) -> EnvFilter {
    let default = if verbose { "debug" } else { "info" };
    directives
        .filter(|d| !d.trim().is_empty())
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}
