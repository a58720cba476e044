//! CLI command definitions

use crate::core::config::HarnessConfig;
use clap::Args;
use std::path::PathBuf;

/// Run every scenario
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Directory commands run in (defaults to the current directory)
    #[arg(long)]
    pub test_dir: Option<PathBuf>,

    /// Sample package directory
    #[arg(long)]
    pub packages_dir: Option<PathBuf>,

    /// Source tree of the tool under test
    #[arg(long)]
    pub tool_source: Option<PathBuf>,

    /// Runtime executable name or path
    #[arg(long)]
    pub runtime: Option<String>,

    /// Run the publish round-trip
    #[arg(long)]
    pub publish: bool,

    /// Config values set during setup (key=value)
    #[arg(long, value_parser = parse_key_value)]
    pub config_value: Vec<(String, String)>,

    /// Write a JSON run summary to this file
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

impl RunCommand {
    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply(&self, config: &mut HarnessConfig) {
        if let Some(dir) = &self.test_dir {
            config.test_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.packages_dir {
            config.packages_dir = Some(dir.clone());
        }
        if let Some(dir) = &self.tool_source {
            config.tool_source = Some(dir.clone());
        }
        if let Some(runtime) = &self.runtime {
            config.runtime = runtime.clone();
        }
        if self.publish {
            config.publish_test = true;
        }
        for (key, value) in &self.config_value {
            config.config_values.insert(key.clone(), value.clone());
        }
    }
}

/// Validate the harness configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List scenarios and discovered packages
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Parse key=value pairs
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let parts: Vec<&str> = s.splitn(2, '=').collect();
    if parts.len() != 2 || parts[0].is_empty() {
        return Err(format!("Invalid key=value pair: {}", s));
    }
    Ok((parts[0].to_string(), parts[1].to_string()))
}
