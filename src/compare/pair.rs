use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

/// Two paths believed to hold the same logical artifact.
///
/// `received` is the freshly produced side, `snapshot` the stored baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    pub received: PathBuf,
    pub snapshot: PathBuf,
}

impl PathPair {
    pub fn new(received: impl Into<PathBuf>, snapshot: impl Into<PathBuf>) -> Self {
        Self {
            received: received.into(),
            snapshot: snapshot.into(),
        }
    }

    /// Display identity used in diff headers.
    ///
    /// This is the longest run of trailing path segments shared by both
    /// paths, or `received<>snapshot` file names when nothing is shared.
    pub fn name(&self) -> String {
        let suffix = common_suffix(&self.received, &self.snapshot);
        if suffix.as_os_str().is_empty() {
            format!(
                "{}<>{}",
                file_name(&self.received),
                file_name(&self.snapshot)
            )
        } else {
            suffix.display().to_string()
        }
    }

    /// The pair for a child entry present on both sides.
    pub fn join(&self, name: &str) -> Self {
        Self {
            received: self.received.join(name),
            snapshot: self.snapshot.join(name),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(OsStr::to_string_lossy)
        .unwrap_or_default()
        .into_owned()
}

fn common_suffix(left: &Path, right: &Path) -> PathBuf {
    let mut common: Vec<Component<'_>> = left
        .components()
        .rev()
        .zip(right.components().rev())
        .take_while(|(l, r)| l == r)
        .map(|(l, _)| l)
        .filter(|c| matches!(c, Component::Normal(_)))
        .collect();
    common.reverse();
    common.into_iter().collect()
}
