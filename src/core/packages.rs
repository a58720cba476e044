//! Sample package discovery

use crate::core::error::{HarnessError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Hidden entries and intentionally-failing or dev-only variants
fn excluded_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\.|-(fail|dev)$").expect("valid regex"))
}

fn dev_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"-dev$").expect("valid regex"))
}

/// Packages that must never be published by the round-trip scenario
fn unpublishable_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"private|fail").expect("valid regex"))
}

/// The set of sample packages found in the packages directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSet {
    dir: PathBuf,
    names: Vec<String>,
}

impl PackageSet {
    /// List the packages directory
    pub fn discover(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        let entries = std::fs::read_dir(&dir).map_err(|source| HarnessError::Discovery {
            path: dir.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| HarnessError::Discovery {
                path: dir.clone(),
                source,
            })?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }

        Ok(Self::from_names(dir, names))
    }

    /// Build a set from known entry names
    pub fn from_names<I, S>(dir: impl Into<PathBuf>, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names
            .into_iter()
            .map(Into::into)
            .filter(|n| !n.is_empty())
            .collect();
        names.sort();
        Self {
            dir: dir.into(),
            names,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every entry, including hidden and variant ones
    pub fn all(&self) -> &[String] {
        &self.names
    }

    /// Ordinary packages used by the bulk and per-package scenarios
    pub fn main(&self) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| !excluded_pattern().is_match(n))
            .collect()
    }

    /// Dev-only variants
    pub fn dev(&self) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|n| dev_pattern().is_match(n))
            .collect()
    }

    /// Main packages that may be published
    pub fn publishable(&self) -> Vec<&str> {
        self.main()
            .into_iter()
            .filter(|n| !unpublishable_pattern().is_match(n))
            .collect()
    }

    /// Absolute directory of a package
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}
