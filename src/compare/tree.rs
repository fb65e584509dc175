use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::file::{files_identical, FileComparison};
use super::pair::PathPair;
use crate::diff::DiffGenerator;
use crate::error::{Result, SnapshotError};
use crate::filter::NameFilter;

/// Lazy sequence of rendered diff lines.
pub type DiffLines<'a> = Box<dyn Iterator<Item = Result<String>> + 'a>;

/// Recursive comparison of two directories.
///
/// Built in two passes: the filtered, sorted listings first, then the
/// classification of common entries and the child comparisons. The result is
/// immutable. `received` is the left side and `snapshot` the right side.
#[derive(Debug)]
pub struct TreeComparison {
    pair: PathPair,
    generator: DiffGenerator,
    left_names: Vec<String>,
    right_names: Vec<String>,
    left_only: Vec<String>,
    right_only: Vec<String>,
    common_names: Vec<String>,
    common_dirs: Vec<String>,
    common_files: Vec<String>,
    common_funny: Vec<String>,
    same_files: Vec<String>,
    diff_files: Vec<String>,
    funny_files: Vec<String>,
    subdirs: BTreeMap<String, TreeComparison>,
    failures: Vec<SnapshotError>,
    different: bool,
}

enum EntryKind {
    Dir,
    File,
    Other,
}

impl TreeComparison {
    /// Compare two directories with the default diff settings.
    pub fn new(pair: PathPair, filter: &NameFilter) -> Result<Self> {
        Self::with_generator(pair, filter, DiffGenerator::default())
    }

    /// Compare two directories.
    ///
    /// Fails only when either root cannot be listed. Entries below the roots
    /// that cannot be inspected are recorded as funny and the walk goes on.
    pub fn with_generator(
        pair: PathPair,
        filter: &NameFilter,
        generator: DiffGenerator,
    ) -> Result<Self> {
        let left_names = list_dir(&pair.received, filter)?;
        let right_names = list_dir(&pair.snapshot, filter)?;
        Ok(Self::classify(pair, filter, generator, left_names, right_names))
    }

    fn classify(
        pair: PathPair,
        filter: &NameFilter,
        generator: DiffGenerator,
        left_names: Vec<String>,
        right_names: Vec<String>,
    ) -> Self {
        let (common_names, left_only) = partition_by(&left_names, &right_names);
        let (_, right_only) = partition_by(&right_names, &left_names);

        let mut failures = Vec::new();
        let mut common_dirs = Vec::new();
        let mut common_files = Vec::new();
        let mut common_funny = Vec::new();

        for name in &common_names {
            let child = pair.join(name);
            let kinds = entry_kind(&child.received)
                .and_then(|left| Ok((left, entry_kind(&child.snapshot)?)));
            match kinds {
                Ok((EntryKind::Dir, EntryKind::Dir)) => common_dirs.push(name.clone()),
                Ok((EntryKind::File, EntryKind::File)) => common_files.push(name.clone()),
                Ok(_) => {
                    tracing::warn!("Type mismatch for {}", child.received.display());
                    common_funny.push(name.clone());
                }
                Err(err) => {
                    tracing::warn!("Cannot inspect {}", err);
                    common_funny.push(name.clone());
                    failures.push(err);
                }
            }
        }

        let mut same_files = Vec::new();
        let mut diff_files = Vec::new();
        let mut funny_files = Vec::new();

        for name in &common_files {
            let child = pair.join(name);
            match files_identical(&child.received, &child.snapshot) {
                Ok(true) => same_files.push(name.clone()),
                Ok(false) => diff_files.push(name.clone()),
                Err(err) => {
                    tracing::warn!("Cannot compare {}", err);
                    funny_files.push(name.clone());
                    failures.push(err);
                }
            }
        }

        let mut subdirs = BTreeMap::new();
        for name in &common_dirs {
            match Self::with_generator(pair.join(name), filter, generator) {
                Ok(child) => {
                    subdirs.insert(name.clone(), child);
                }
                Err(err) => {
                    tracing::warn!("Cannot list {}", err);
                    common_funny.push(name.clone());
                    failures.push(err);
                }
            }
        }
        common_funny.sort();

        let different = !left_only.is_empty()
            || !right_only.is_empty()
            || !common_funny.is_empty()
            || !diff_files.is_empty()
            || !funny_files.is_empty()
            || subdirs.values().any(TreeComparison::is_different);

        tracing::debug!(
            "Compared {}: {} same, {} differ, {} added, {} missing",
            pair.received.display(),
            same_files.len(),
            diff_files.len(),
            left_only.len(),
            right_only.len()
        );

        Self {
            pair,
            generator,
            left_names,
            right_names,
            left_only,
            right_only,
            common_names,
            common_dirs,
            common_files,
            common_funny,
            same_files,
            diff_files,
            funny_files,
            subdirs,
            failures,
            different,
        }
    }

    pub fn pair(&self) -> &PathPair {
        &self.pair
    }

    /// Whether anything differs in this tree or any descendant.
    pub fn is_different(&self) -> bool {
        self.different
    }

    /// Filtered, sorted names on the received side.
    pub fn left_names(&self) -> &[String] {
        &self.left_names
    }

    /// Filtered, sorted names on the snapshot side.
    pub fn right_names(&self) -> &[String] {
        &self.right_names
    }

    /// Names only present on the received side.
    pub fn left_only(&self) -> &[String] {
        &self.left_only
    }

    /// Names only present on the snapshot side.
    pub fn right_only(&self) -> &[String] {
        &self.right_only
    }

    pub fn common_names(&self) -> &[String] {
        &self.common_names
    }

    pub fn common_dirs(&self) -> &[String] {
        &self.common_dirs
    }

    pub fn common_files(&self) -> &[String] {
        &self.common_files
    }

    /// Common names whose kinds differ or could not be inspected.
    pub fn common_funny(&self) -> &[String] {
        &self.common_funny
    }

    pub fn same_files(&self) -> &[String] {
        &self.same_files
    }

    pub fn diff_files(&self) -> &[String] {
        &self.diff_files
    }

    /// Common files whose contents could not be compared.
    pub fn funny_files(&self) -> &[String] {
        &self.funny_files
    }

    pub fn subdirs(&self) -> &BTreeMap<String, TreeComparison> {
        &self.subdirs
    }

    /// Errors recorded for entries of this tree and all descendants.
    pub fn failures(&self) -> Vec<&SnapshotError> {
        self.failures
            .iter()
            .chain(self.subdirs.values().flat_map(|sub| sub.failures()))
            .collect()
    }

    /// Rendered differences, depth-first with names sorted at every level.
    ///
    /// Changed files come first, then entries only in the received tree,
    /// then entries only in the snapshot, then subdirectories. Funny entries
    /// count as differences but render no lines.
    pub fn diff_lines(&self) -> DiffLines<'_> {
        self.diff_lines_at(PathBuf::new())
    }

    fn diff_lines_at(&self, prefix: PathBuf) -> DiffLines<'_> {
        let files = self.diff_files.iter().flat_map(move |name| -> Vec<Result<String>> {
            let file = FileComparison::with_generator(self.pair.join(name), self.generator);
            match file.diff_lines() {
                Ok(lines) => lines.map(Ok).collect(),
                Err(err) => vec![Err(err)],
            }
        });

        let added_prefix = prefix.clone();
        let added = self.left_only.iter().flat_map(move |name| -> [Result<String>; 2] {
            [
                Ok(format!("+++ added: <received>/{}", added_prefix.join(name).display())),
                Ok("--- N/A".to_string()),
            ]
        });

        let missing_prefix = prefix.clone();
        let missing = self.right_only.iter().flat_map(move |name| -> [Result<String>; 2] {
            [
                Ok("+++ N/A".to_string()),
                Ok(format!("--- missing: <snapshot>/{}", missing_prefix.join(name).display())),
            ]
        });

        let nested = self
            .subdirs
            .iter()
            .flat_map(move |(name, sub)| sub.diff_lines_at(prefix.join(name)));

        Box::new(files.chain(added).chain(missing).chain(nested))
    }

    /// Flattened summary with paths relative to the compared roots.
    pub fn report(&self) -> TreeReport {
        let mut report = TreeReport {
            different: self.different,
            ..TreeReport::default()
        };
        self.collect_report(Path::new(""), &mut report);
        report
    }

    fn collect_report(&self, prefix: &Path, report: &mut TreeReport) {
        let rel = |name: &String| prefix.join(name).display().to_string();
        report.changed.extend(self.diff_files.iter().map(rel));
        report.added.extend(self.left_only.iter().map(rel));
        report.missing.extend(self.right_only.iter().map(rel));
        report.funny.extend(self.common_funny.iter().chain(&self.funny_files).map(rel));
        report.same += self.same_files.len();

        for (name, sub) in &self.subdirs {
            sub.collect_report(&prefix.join(name), report);
        }
    }
}

/// Serializable summary of a tree comparison
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeReport {
    pub different: bool,
    pub same: usize,
    pub changed: Vec<String>,
    pub added: Vec<String>,
    pub missing: Vec<String>,
    pub funny: Vec<String>,
}

fn list_dir(dir: &Path, filter: &NameFilter) -> Result<Vec<String>> {
    let entries = fs::read_dir(dir).map_err(|err| SnapshotError::io(dir, err))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| SnapshotError::io(dir, err))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    let mut names = filter.apply(names);
    names.sort();
    Ok(names)
}

/// Split `names` into those also in `other` and those only in `names`.
///
/// Both inputs are sorted, so are both outputs.
fn partition_by(names: &[String], other: &[String]) -> (Vec<String>, Vec<String>) {
    names
        .iter()
        .cloned()
        .partition(|name| other.binary_search(name).is_ok())
}

fn entry_kind(path: &Path) -> Result<EntryKind> {
    let meta = fs::metadata(path).map_err(|err| SnapshotError::io(path, err))?;
    Ok(if meta.is_dir() {
        EntryKind::Dir
    } else if meta.is_file() {
        EntryKind::File
    } else {
        EntryKind::Other
    })
}

/// Collect every rendered line of a tree, stopping at the first error.
pub fn render_all(tree: &TreeComparison) -> Result<Vec<String>> {
    tree.diff_lines().collect()
}
