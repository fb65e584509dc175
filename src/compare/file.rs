use std::fs;
use std::path::Path;

use serde::Serialize;

use super::pair::PathPair;
use crate::diff::{DiffFormatter, DiffGenerator, DiffResult, DiffStats};
use crate::error::{Result, SnapshotError};

/// How a differing file pair was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Binary,
}

/// Serialisable summary of a file comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub name: String,
    pub different: bool,
    pub content: ContentKind,
    /// `None` for binary content
    pub stats: Option<DiffStats>,
    pub total_changes: Option<usize>,
    /// Human readable form of `stats`, e.g. `1 insertion, 1 hunk`
    pub summary: Option<String>,
}

/// Comparison of two regular files.
#[derive(Debug, Clone)]
pub struct FileComparison {
    pair: PathPair,
    generator: DiffGenerator,
}

impl FileComparison {
    pub fn new(pair: PathPair) -> Self {
        Self::with_generator(pair, DiffGenerator::default())
    }

    pub fn with_generator(pair: PathPair, generator: DiffGenerator) -> Self {
        Self { pair, generator }
    }

    pub fn pair(&self) -> &PathPair {
        &self.pair
    }

    /// Display identity of the pair, see [`PathPair::name`].
    pub fn name(&self) -> String {
        self.pair.name()
    }

    /// Exact byte-for-byte equality of both files.
    pub fn identical(&self) -> Result<bool> {
        files_identical(&self.pair.received, &self.pair.snapshot)
    }

    pub fn is_different(&self) -> Result<bool> {
        self.identical().map(|same| !same)
    }

    /// Whether the pair renders as a text or a binary diff.
    pub fn content_kind(&self) -> Result<ContentKind> {
        let received = read(&self.pair.received)?;
        let snapshot = read(&self.pair.snapshot)?;
        Ok(match (String::from_utf8(received), String::from_utf8(snapshot)) {
            (Ok(_), Ok(_)) => ContentKind::Text,
            _ => ContentKind::Binary,
        })
    }

    /// Line statistics, `None` for binary content.
    pub fn stats(&self) -> Result<Option<DiffStats>> {
        Ok(self.text_diff()?.map(|result| result.stats))
    }

    pub fn report(&self) -> Result<FileReport> {
        let stats = self.stats()?;
        Ok(FileReport {
            name: self.name(),
            different: self.is_different()?,
            content: self.content_kind()?,
            total_changes: stats.as_ref().map(DiffStats::total_changes),
            summary: stats.as_ref().map(DiffFormatter::format_stats),
            stats,
        })
    }

    /// Render the differences as plain unified-diff lines.
    ///
    /// Identical files yield nothing. Content that is not valid UTF-8 on
    /// either side yields one line describing the binary difference, never
    /// the bytes themselves.
    pub fn diff_lines(&self) -> Result<std::vec::IntoIter<String>> {
        let received = read(&self.pair.received)?;
        let snapshot = read(&self.pair.snapshot)?;
        if received == snapshot {
            return Ok(Vec::new().into_iter());
        }

        let name = self.name();
        let lines = match (String::from_utf8(received), String::from_utf8(snapshot)) {
            (Ok(received), Ok(snapshot)) => {
                let result = self.generator.generate(&snapshot, &received);
                DiffFormatter::format_unified(
                    &result,
                    &format!("<snapshot>/{}", name),
                    &format!("<received>/{}", name),
                )
            }
            (received, snapshot) => {
                let received_len = byte_len(received);
                let snapshot_len = byte_len(snapshot);
                tracing::debug!("Binary comparison of {}", name);
                if received_len != snapshot_len {
                    vec![format!("{}: binary files sizes differ", name)]
                } else {
                    vec![format!("{}: binary files content differs", name)]
                }
            }
        };

        Ok(lines.into_iter())
    }

    fn text_diff(&self) -> Result<Option<DiffResult>> {
        let received = read(&self.pair.received)?;
        let snapshot = read(&self.pair.snapshot)?;
        match (String::from_utf8(received), String::from_utf8(snapshot)) {
            (Ok(received), Ok(snapshot)) => {
                Ok(Some(self.generator.generate(&snapshot, &received)))
            }
            _ => Ok(None),
        }
    }
}

fn byte_len(decoded: std::result::Result<String, std::string::FromUtf8Error>) -> usize {
    match decoded {
        Ok(text) => text.len(),
        Err(err) => err.as_bytes().len(),
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|err| SnapshotError::io(path, err))
}

/// Byte-for-byte comparison of two files, checking sizes first.
pub(crate) fn files_identical(left: &Path, right: &Path) -> Result<bool> {
    let left_meta = fs::metadata(left).map_err(|err| SnapshotError::io(left, err))?;
    let right_meta = fs::metadata(right).map_err(|err| SnapshotError::io(right, err))?;
    if left_meta.len() != right_meta.len() {
        return Ok(false);
    }
    Ok(read(left)? == read(right)?)
}
