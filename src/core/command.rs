//! Command specifications

use crate::core::env::EnvironmentDescriptor;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Leading token naming the tool under test
pub const TOOL_TOKEN: &str = "npm";
/// Leading token naming the runtime the tool runs on
pub const RUNTIME_TOKEN: &str = "node";

/// Whether a command is expected to succeed or fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expectation {
    #[default]
    Success,
    Failure,
}

impl Expectation {
    /// Whether an exit status satisfies this expectation
    pub fn is_met(&self, exited_zero: bool) -> bool {
        match self {
            Expectation::Success => exited_zero,
            Expectation::Failure => !exited_zero,
        }
    }
}

/// The program a command runs, before resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Executable {
    /// The installed tool under test
    Tool,
    /// The runtime executable
    Runtime,
    /// Anything else, found on PATH
    Other(String),
}

impl Executable {
    fn from_token(token: &str) -> Self {
        match token {
            TOOL_TOKEN => Executable::Tool,
            RUNTIME_TOKEN => Executable::Runtime,
            other => Executable::Other(other.to_string()),
        }
    }

    fn token(&self) -> &str {
        match self {
            Executable::Tool => TOOL_TOKEN,
            Executable::Runtime => RUNTIME_TOKEN,
            Executable::Other(name) => name,
        }
    }
}

/// Maps symbolic executables to absolute paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableTable {
    pub tool: PathBuf,
    pub runtime: PathBuf,
}

impl ExecutableTable {
    /// Lookup table for an isolated environment
    pub fn for_environment(env: &EnvironmentDescriptor) -> Self {
        Self {
            tool: env.tool_path(),
            runtime: env.runtime().to_path_buf(),
        }
    }

    pub fn resolve(&self, executable: &Executable) -> PathBuf {
        match executable {
            Executable::Tool => self.tool.clone(),
            Executable::Runtime => self.runtime.clone(),
            Executable::Other(name) => PathBuf::from(name),
        }
    }
}

/// Error parsing a command line
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandParseError {
    #[error("empty command line")]
    Empty,

    #[error("cannot split command line '{line}': {reason}")]
    Malformed { line: String, reason: String },
}

/// A single command to execute
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// Literal command text, as shown in the report
    pub line: String,

    /// Program to run
    pub executable: Executable,

    /// Arguments after the program
    pub args: Vec<String>,

    /// Working directory override
    pub cwd: Option<PathBuf>,

    /// Environment override
    pub env: Option<Arc<EnvironmentDescriptor>>,

    /// Expected outcome
    pub expectation: Expectation,
}

impl CommandSpec {
    /// Parse a command line, splitting it the way a POSIX shell would
    pub fn parse(line: impl Into<String>) -> Result<Self, CommandParseError> {
        let line = line.into();
        let mut words = shell_words::split(&line).map_err(|e| CommandParseError::Malformed {
            line: line.clone(),
            reason: e.to_string(),
        })?;
        if words.is_empty() {
            return Err(CommandParseError::Empty);
        }
        let program = words.remove(0);

        Ok(Self {
            executable: Executable::from_token(&program),
            args: words,
            line,
            cwd: None,
            env: None,
            expectation: Expectation::Success,
        })
    }

    /// Build a command from an already-split argument list
    ///
    /// Arguments containing whitespace are double-quoted in the displayed line.
    pub fn from_parts(executable: Executable, args: Vec<String>) -> Self {
        let mut line = executable.token().to_string();
        for arg in &args {
            line.push(' ');
            if arg.chars().any(char::is_whitespace) || arg.is_empty() {
                line.push_str(&format!("\"{}\"", arg));
            } else {
                line.push_str(arg);
            }
        }

        Self {
            line,
            executable,
            args,
            cwd: None,
            env: None,
            expectation: Expectation::Success,
        }
    }

    /// Replace the literal text shown in the report
    pub fn display_as(mut self, line: impl Into<String>) -> Self {
        self.line = line.into();
        self
    }

    /// Expect a non-zero exit
    pub fn expect_failure(mut self) -> Self {
        self.expectation = Expectation::Failure;
        self
    }

    pub fn in_dir(mut self, cwd: impl AsRef<Path>) -> Self {
        self.cwd = Some(cwd.as_ref().to_path_buf());
        self
    }

    pub fn with_env(mut self, env: Arc<EnvironmentDescriptor>) -> Self {
        self.env = Some(env);
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.line)
    }
}
