//! Structural comparison of received output against a stored snapshot
//!
//! A [`Comparison`] is either a single file pair or a whole directory tree.
//! Both render their differences as a lazy sequence of plain text lines.

pub mod file;
pub mod pair;
pub mod tree;

use std::iter;
use std::path::Path;

pub use file::{ContentKind, FileComparison, FileReport};
pub use pair::PathPair;
pub use tree::{render_all, DiffLines, TreeComparison, TreeReport};

use crate::config::DirsnapConfig;
use crate::diff::{DiffConfig, DiffGenerator};
use crate::error::{Result, SnapshotError};
use crate::filter::NameFilter;

/// Settings shared by every node of a comparison
#[derive(Debug, Clone, Default)]
pub struct CompareOptions {
    pub filter: NameFilter,
    pub generator: DiffGenerator,
}

impl CompareOptions {
    pub fn from_config(config: &DirsnapConfig) -> Result<Self> {
        Ok(Self {
            filter: NameFilter::new(
                config.filter.ignore.as_slice(),
                config.filter.hide.as_slice(),
            )?,
            generator: DiffConfig::new()
                .algorithm(config.diff.algorithm)
                .context_lines(config.diff.context_lines)
                .build(),
        })
    }
}

/// Anything that can be compared against a snapshot.
#[derive(Debug)]
pub enum Comparison {
    File(FileComparison),
    Tree(TreeComparison),
}

impl Comparison {
    /// Compare `received` against `snapshot`.
    ///
    /// A directory on one side must be matched by a directory on the other.
    pub fn new(received: &Path, snapshot: &Path, options: &CompareOptions) -> Result<Self> {
        let pair = PathPair::new(received, snapshot);
        match (received.is_dir(), snapshot.is_dir()) {
            (true, true) => Ok(Self::Tree(TreeComparison::with_generator(
                pair,
                &options.filter,
                options.generator,
            )?)),
            (false, false) => Ok(Self::File(FileComparison::with_generator(
                pair,
                options.generator,
            ))),
            (true, false) => Err(SnapshotError::NotADirectory(snapshot.to_path_buf())),
            (false, true) => Err(SnapshotError::NotADirectory(received.to_path_buf())),
        }
    }

    pub fn is_different(&self) -> Result<bool> {
        match self {
            Self::File(file) => file.is_different(),
            Self::Tree(tree) => Ok(tree.is_different()),
        }
    }

    pub fn diff_lines(&self) -> DiffLines<'_> {
        match self {
            Self::File(file) => match file.diff_lines() {
                Ok(lines) => Box::new(lines.map(Ok)),
                Err(err) => Box::new(iter::once(Err(err))),
            },
            Self::Tree(tree) => tree.diff_lines(),
        }
    }
}
