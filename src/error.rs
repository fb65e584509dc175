//! Error types for snapshot comparison and storage.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for snapshot operations.
pub type Result<T> = std::result::Result<T, SnapshotError>;

/// Errors that can occur while comparing or storing snapshots.
#[derive(Error, Debug)]
pub enum SnapshotError {
    /// An entry could not be read, listed, copied or removed.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A name filter pattern is not a valid glob.
    #[error("Invalid name pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// The snapshot to delete or copy does not exist.
    #[error("Snapshot not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A directory was compared against something that is not one.
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file parsing error.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl SnapshotError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// The path this error is about, when there is one.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Io { path, .. } | Self::NotFound(path) | Self::NotADirectory(path) => Some(path),
            _ => None,
        }
    }
}
