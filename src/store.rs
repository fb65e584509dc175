//! Snapshot persistence
//!
//! Accepted output is copied into a collection's storage location. Stored
//! directories that end up empty receive a zero-byte marker file so they
//! survive storage that does not track empty directories (git, archives).

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::error::{Result, SnapshotError};
use crate::filter::MARKER_FILE;

/// A named accepted file or directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub name: String,
    /// Path of the accepted data, either a file or a directory
    pub data: PathBuf,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, data: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }
}

/// A storage location and the snapshots to write into it.
#[derive(Debug, Clone)]
pub struct SnapshotCollection {
    location: PathBuf,
    snapshots: BTreeMap<String, Snapshot>,
}

impl SnapshotCollection {
    pub fn new(location: impl Into<PathBuf>) -> Self {
        Self {
            location: location.into(),
            snapshots: BTreeMap::new(),
        }
    }

    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Add a snapshot, replacing any previous one with the same name.
    pub fn add(&mut self, snapshot: Snapshot) {
        self.snapshots.insert(snapshot.name.clone(), snapshot);
    }

    pub fn get(&self, name: &str) -> Option<&Snapshot> {
        self.snapshots.get(name)
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.values()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Writes, reads and deletes stored snapshots.
///
/// Nothing is locked: concurrent writers must target distinct locations.
pub struct SnapshotStore;

impl SnapshotStore {
    /// Write every snapshot of the collection to `location/<name>`.
    ///
    /// Returns the stored paths in name order.
    pub fn write(collection: &SnapshotCollection) -> Result<Vec<PathBuf>> {
        collection
            .snapshots()
            .map(|snapshot| Self::write_snapshot(collection.location(), snapshot))
            .collect()
    }

    /// Copy one snapshot's data to `location/<name>`.
    ///
    /// Directories are merged into an existing destination. A failure part
    /// way through leaves the entries copied so far in place.
    pub fn write_snapshot(location: &Path, snapshot: &Snapshot) -> Result<PathBuf> {
        let source = snapshot.data.as_path();
        let target = location.join(&snapshot.name);

        let meta = fs::metadata(source).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SnapshotError::NotFound(source.to_path_buf()),
            _ => SnapshotError::io(source, err),
        })?;

        if meta.is_dir() {
            copy_tree(source, &target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|err| SnapshotError::io(parent, err))?;
            }
            fs::copy(source, &target).map_err(|err| SnapshotError::io(&target, err))?;
        }

        tracing::info!(
            "Stored snapshot {} from {} at {}",
            snapshot.name,
            source.display(),
            target.display()
        );
        Ok(target)
    }

    /// Path of a stored snapshot, or `None` when nothing is stored under `name`.
    pub fn read(location: &Path, name: &str) -> Option<PathBuf> {
        let path = location.join(name);
        path.exists().then_some(path)
    }

    /// Remove a stored snapshot location, recursively for directories.
    ///
    /// `location` is the storage path of the snapshots named in `names`.
    /// Deleting a location that does not exist is an error.
    pub fn delete<S: AsRef<str>>(location: &Path, names: &[S]) -> Result<()> {
        let meta = fs::symlink_metadata(location).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => SnapshotError::NotFound(location.to_path_buf()),
            _ => SnapshotError::io(location, err),
        })?;

        if meta.is_dir() {
            fs::remove_dir_all(location)
        } else {
            fs::remove_file(location)
        }
        .map_err(|err| SnapshotError::io(location, err))?;

        let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
        tracing::info!("Deleted snapshot {} ({})", location.display(), names.join(", "));
        Ok(())
    }
}

/// Recursively copy `source` into `target`, placing the marker file in every
/// copied directory that has no entries.
fn copy_tree(source: &Path, target: &Path) -> Result<()> {
    let walker = WalkBuilder::new(source)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .build();

    for result in walker {
        let entry = result.map_err(|err| walk_error(source, err))?;
        let path = entry.path();
        let rel = path.strip_prefix(source).unwrap_or(path);
        let dest = target.join(rel);

        match entry.file_type() {
            Some(kind) if kind.is_dir() => {
                fs::create_dir_all(&dest).map_err(|err| SnapshotError::io(&dest, err))?;
                if is_empty_dir(path)? {
                    let marker = dest.join(MARKER_FILE);
                    tracing::debug!("Marking empty directory {}", dest.display());
                    fs::write(&marker, b"").map_err(|err| SnapshotError::io(&marker, err))?;
                }
            }
            _ => {
                fs::copy(path, &dest).map_err(|err| SnapshotError::io(&dest, err))?;
            }
        }
    }

    Ok(())
}

/// Label a walker error with the entry it is about, falling back to `root`.
fn walk_error(root: &Path, err: ignore::Error) -> SnapshotError {
    let path = error_path(&err).unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, message));
    SnapshotError::Io { path, source }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::Loop { child, .. } => Some(child.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(error_path),
        _ => None,
    }
}

fn is_empty_dir(dir: &Path) -> Result<bool> {
    let mut entries = fs::read_dir(dir).map_err(|err| SnapshotError::io(dir, err))?;
    Ok(entries.next().is_none())
}
