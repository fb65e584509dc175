//! Configuration management for dirsnap
//!
//! This module provides configuration structures and defaults for diff
//! rendering and directory entry filtering.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::diff::{DiffAlgorithmType, DEFAULT_CONTEXT_LINES};
use crate::error::{Result, SnapshotError};
use crate::filter::{validate_patterns, DEFAULT_HIDE};

/// Global configuration for dirsnap
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirsnapConfig {
    /// Diff rendering configuration
    pub diff: DiffSettings,
    /// Directory entry filtering configuration
    pub filter: FilterSettings,
}

/// Configuration for diff rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffSettings {
    /// Lines of context around each hunk
    pub context_lines: usize,
    /// Line diff algorithm
    pub algorithm: DiffAlgorithmType,
}

/// Configuration for directory entry filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    /// Glob patterns the user asked to exclude
    pub ignore: Vec<String>,
    /// Glob patterns for housekeeping entries (VCS metadata, caches)
    pub hide: Vec<String>,
}

impl Default for DiffSettings {
    fn default() -> Self {
        Self {
            context_lines: DEFAULT_CONTEXT_LINES,
            algorithm: DiffAlgorithmType::default(),
        }
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            hide: DEFAULT_HIDE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl DirsnapConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override values from environment variables if present
    pub fn apply_env(&mut self) {
        if let Ok(val) = std::env::var("DIRSNAP_CONTEXT_LINES") {
            if let Ok(lines) = val.parse::<usize>() {
                self.diff.context_lines = lines;
            }
        }

        if let Ok(val) = std::env::var("DIRSNAP_ALGORITHM") {
            if let Ok(algorithm) = val.parse::<DiffAlgorithmType>() {
                self.diff.algorithm = algorithm;
            }
        }

        if let Ok(val) = std::env::var("DIRSNAP_IGNORE") {
            self.filter.ignore = split_list(&val);
        }

        if let Ok(val) = std::env::var("DIRSNAP_HIDE") {
            self.filter.hide = split_list(&val);
        }
    }

    /// Load configuration from a TOML file, missing keys keep their defaults
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| SnapshotError::io(path, err))?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        validate_patterns(self.filter.ignore.as_slice())?;
        validate_patterns(self.filter.hide.as_slice())?;

        if self.diff.context_lines > 10_000 {
            return Err(SnapshotError::Config(format!(
                "context_lines must be at most 10000, got {}",
                self.diff.context_lines
            )));
        }

        Ok(())
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
