//! Isolated environment construction
//!
//! Every command the harness spawns runs against an [`EnvironmentDescriptor`]:
//! a copy of the host environment whose install prefix points at a
//! disposable root directory and whose `PATH` finds the installed tool
//! before any system-wide copy.

use crate::core::error::{HarnessError, Result};
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Install prefix for the tool under test
pub const PREFIX_VAR: &str = "npm_config_prefix";
/// Forces colored output
pub const COLOR_VAR: &str = "npm_config_color";
/// Global-install mode flag
pub const GLOBAL_VAR: &str = "npm_config_global";
/// Self-test flag; left on, the tool would test itself forever
pub const META_TEST_VAR: &str = "npm_config_npat";
/// Additional module resolution path
pub const MODULE_PATH_VAR: &str = "NODE_PATH";
/// Opt-in for the publish scenario
pub const PUBLISH_OPT_IN_VAR: &str = "npm_package_config_publishtest";

/// Temp directory variables, in lookup order
const TEMP_VARS: [&str; 3] = ["TMPDIR", "TMP", "TEMP"];

/// Host platform class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Posix,
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Separator between `PATH` entries
    pub fn path_separator(&self) -> char {
        match self {
            Platform::Windows => ';',
            Platform::Posix => ':',
        }
    }

    /// Where the tool's own executable lands inside the isolated root
    pub fn tool_bin(&self, root: &Path) -> PathBuf {
        match self {
            Platform::Windows => root.to_path_buf(),
            Platform::Posix => root.join("bin"),
        }
    }

    /// File name of the installed tool executable
    pub fn tool_executable(&self) -> &'static str {
        match self {
            Platform::Windows => "npm.cmd",
            Platform::Posix => "npm",
        }
    }

    fn default_temp(&self) -> &'static str {
        match self {
            Platform::Windows => "c:\\windows\\temp",
            Platform::Posix => "/tmp",
        }
    }
}

/// Snapshot of the host process environment
///
/// Names and values are kept as OS strings, so variables that are not valid
/// UTF-8 still reach the spawned commands untouched.
#[derive(Debug, Clone, Default)]
pub struct HostEnvironment {
    vars: BTreeMap<OsString, OsString>,
}

impl HostEnvironment {
    /// Read the environment of the running process
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars_os().collect(),
        }
    }

    /// Build a host environment from explicit pairs
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up a variable holding valid UTF-8
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    pub fn get_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    /// Key actually holding the search path (`Path` is common on Windows)
    fn path_key(&self, platform: Platform) -> Option<String> {
        if self.vars.contains_key(OsStr::new("PATH")) {
            return Some("PATH".to_string());
        }
        match platform {
            Platform::Windows => self
                .vars
                .keys()
                .filter_map(|k| k.to_str())
                .find(|k| k.eq_ignore_ascii_case("PATH"))
                .map(str::to_string),
            Platform::Posix => None,
        }
    }
}

/// Builds the isolated environment for a run
#[derive(Debug, Clone)]
pub struct EnvironmentBuilder {
    host: HostEnvironment,
    platform: Platform,
    runner_name: String,
    pid: u32,
    runtime: PathBuf,
}

impl EnvironmentBuilder {
    /// Create a builder for the given host snapshot and runtime executable
    pub fn new(host: HostEnvironment, runtime: impl Into<PathBuf>) -> Self {
        Self {
            host,
            platform: Platform::current(),
            runner_name: "npm-test".to_string(),
            pid: std::process::id(),
            runtime: runtime.into(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_runner_name(mut self, name: impl Into<String>) -> Self {
        self.runner_name = name.into();
        self
    }

    pub fn with_pid(mut self, pid: u32) -> Self {
        self.pid = pid;
        self
    }

    /// Temp directory: first non-empty of TMPDIR, TMP, TEMP, else the platform default
    fn temp_base(&self) -> PathBuf {
        TEMP_VARS
            .iter()
            .filter_map(|var| self.host.get_os(var))
            .find(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(self.platform.default_temp()))
    }

    /// Produce the environment descriptor. Creates nothing on disk.
    pub fn build(self) -> Result<EnvironmentDescriptor> {
        let path_key = self
            .host
            .path_key(self.platform)
            .ok_or_else(|| HarnessError::Environment("PATH is not set".to_string()))?;

        let temp = self
            .temp_base()
            .join(format!("{}-{}", self.runner_name, self.pid));
        let root = temp.join("root");
        let tool_bin = self.platform.tool_bin(&root);

        let runtime_dir = self
            .runtime
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let inherited = match self.host.get_os(&path_key) {
            Some(value) => value.to_str().ok_or_else(|| {
                HarnessError::Environment(format!("{} is not valid UTF-8", path_key))
            })?,
            None => "",
        };

        let separator = self.platform.path_separator();
        let mut entries = vec![
            runtime_dir.display().to_string(),
            root.join("node_modules").join(".bin").display().to_string(),
            tool_bin.display().to_string(),
        ];
        if !inherited.is_empty() {
            entries.extend(inherited.split(separator).map(str::to_string));
        }
        let search_path = entries.join(&separator.to_string());

        let mut vars = self.host.vars;
        vars.insert(PREFIX_VAR.into(), root.clone().into_os_string());
        vars.insert(COLOR_VAR.into(), "always".into());
        vars.insert(GLOBAL_VAR.into(), "true".into());
        vars.insert(META_TEST_VAR.into(), "false".into());
        vars.insert(path_key.into(), search_path.into());
        vars.insert(
            MODULE_PATH_VAR.into(),
            root.join("node_modules").into_os_string(),
        );

        debug!("Isolated root: {}", root.display());

        Ok(EnvironmentDescriptor {
            platform: self.platform,
            temp,
            root,
            tool_bin,
            runtime: self.runtime,
            vars,
        })
    }
}

/// Immutable environment shared by every command of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentDescriptor {
    platform: Platform,
    temp: PathBuf,
    root: PathBuf,
    tool_bin: PathBuf,
    runtime: PathBuf,
    vars: BTreeMap<OsString, OsString>,
}

impl EnvironmentDescriptor {
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Per-run temp directory (`<temp>/<runner>-<pid>`)
    pub fn temp(&self) -> &Path {
        &self.temp
    }

    /// Isolated install prefix
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding the installed tool executable
    pub fn tool_bin(&self) -> &Path {
        &self.tool_bin
    }

    /// Absolute path of the installed tool under test
    pub fn tool_path(&self) -> PathBuf {
        self.tool_bin.join(self.platform.tool_executable())
    }

    /// Runtime executable used to bootstrap the tool
    pub fn runtime(&self) -> &Path {
        &self.runtime
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.var_os(key).and_then(OsStr::to_str)
    }

    pub fn var_os(&self, key: &str) -> Option<&OsStr> {
        self.vars.get(OsStr::new(key)).map(OsString::as_os_str)
    }

    pub fn vars(&self) -> &BTreeMap<OsString, OsString> {
        &self.vars
    }

    /// Copy of this environment with global-install mode disabled
    pub fn dev_variant(&self) -> Self {
        let mut dev = self.clone();
        dev.vars.insert(GLOBAL_VAR.into(), OsString::new());
        dev
    }

    /// Delete the isolated root and recreate it empty
    pub async fn reset_root(&self) -> Result<()> {
        let to_err = |source| HarnessError::IsolatedRoot {
            path: self.root.clone(),
            source,
        };

        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(to_err(e)),
        }

        let mut builder = tokio::fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);
        builder.create(&self.root).await.map_err(to_err)?;

        debug!("Reset isolated root {}", self.root.display());
        Ok(())
    }
}
