//! Harness configuration from YAML and command-line overrides

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Top-level harness configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Directory commands run in by default
    #[serde(default)]
    pub test_dir: Option<PathBuf>,

    /// Sample package directory (defaults to `<test_dir>/packages`)
    #[serde(default)]
    pub packages_dir: Option<PathBuf>,

    /// Source tree of the tool under test (defaults to the parent of `test_dir`)
    #[serde(default)]
    pub tool_source: Option<PathBuf>,

    /// Runtime executable name or path
    #[serde(default = "default_runtime")]
    pub runtime: String,

    /// Prefix of the per-run temp directory
    #[serde(default = "default_runner_name")]
    pub runner_name: String,

    /// Force the publish round-trip scenario on
    #[serde(default)]
    pub publish_test: bool,

    /// Values written with `npm config set` during setup
    #[serde(default = "default_config_values")]
    pub config_values: BTreeMap<String, String>,
}

fn default_runtime() -> String {
    "node".to_string()
}

fn default_runner_name() -> String {
    "npm-test".to_string()
}

fn default_config_values() -> BTreeMap<String, String> {
    BTreeMap::from([("package-config:foo".to_string(), "boo".to_string())])
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            test_dir: None,
            packages_dir: None,
            tool_source: None,
            runtime: default_runtime(),
            runner_name: default_runner_name(),
            publish_test: false,
            config_values: default_config_values(),
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: HarnessConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Resolved test directory, always absolute
    pub fn test_dir(&self) -> Result<PathBuf> {
        match &self.test_dir {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => {
                let mut resolved = current_dir()?;
                resolved.extend(dir.components().filter(|c| !matches!(c, Component::CurDir)));
                Ok(resolved)
            }
            None => current_dir(),
        }
    }

    /// Resolved sample package directory
    pub fn packages_dir(&self) -> Result<PathBuf> {
        match &self.packages_dir {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => Ok(self.test_dir()?.join(dir)),
            None => Ok(self.test_dir()?.join("packages")),
        }
    }

    /// Resolved source tree of the tool under test
    pub fn tool_source(&self) -> Result<PathBuf> {
        match &self.tool_source {
            Some(dir) if dir.is_absolute() => Ok(dir.clone()),
            Some(dir) => Ok(self.test_dir()?.join(dir)),
            None => {
                let test_dir = self.test_dir()?;
                let parent = test_dir
                    .parent()
                    .map(Path::to_path_buf)
                    .with_context(|| format!("{} has no parent directory", test_dir.display()))?;
                Ok(parent)
            }
        }
    }

    /// Bootstrap entry point inside the tool source
    pub fn tool_cli(&self) -> Result<PathBuf> {
        Ok(self.tool_source()?.join("bin").join("npm-cli.js"))
    }

    /// Resolve the runtime executable to an absolute path
    pub fn resolve_runtime(&self) -> Result<PathBuf> {
        which::which(&self.runtime)
            .with_context(|| format!("Runtime '{}' not found on PATH", self.runtime))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.runner_name.trim().is_empty() {
            anyhow::bail!("runner_name must not be empty");
        }
        if self.runtime.trim().is_empty() {
            anyhow::bail!("runtime must not be empty");
        }
        for key in self.config_values.keys() {
            if key.trim().is_empty() {
                anyhow::bail!("config_values contains an empty key");
            }
        }

        let test_dir = self.test_dir()?;
        if !test_dir.is_dir() {
            anyhow::bail!("Test directory doesn't exist: {}", test_dir.display());
        }
        let packages_dir = self.packages_dir()?;
        if !packages_dir.is_dir() {
            anyhow::bail!(
                "Sample package directory doesn't exist: {}",
                packages_dir.display()
            );
        }

        Ok(())
    }
}

fn current_dir() -> Result<PathBuf> {
    std::env::current_dir().context("Failed to read current directory")
}
