use glob::Pattern;

use crate::error::{Result, SnapshotError};

/// Reserved name of the zero-byte file placed in stored empty directories.
///
/// Other tooling special-cases this exact name, so it must not change.
pub const MARKER_FILE: &str = "syrupy.gitkeep";

/// Version-control and cache entries hidden from comparisons by default.
pub const DEFAULT_HIDE: &[&str] = &[
    "RCS", "CVS", "tags", ".git", ".hg", ".bzr", "_darcs", "__pycache__",
];

/// Removes directory entry names matching any of a set of glob patterns.
///
/// The marker file is always excluded on top of the caller's `ignore` and
/// `hide` lists.
#[derive(Debug, Clone)]
pub struct NameFilter {
    excluded: &'static [&'static str],
    patterns: Vec<Pattern>,
}

impl NameFilter {
    /// Build a filter from the caller's `ignore` and `hide` lists.
    pub fn new<S: AsRef<str>>(ignore: &[S], hide: &[S]) -> Result<Self> {
        let mut patterns = Vec::with_capacity(ignore.len() + hide.len());
        for pattern in ignore.iter().chain(hide.iter()) {
            let pattern = pattern.as_ref();
            patterns.push(Pattern::new(pattern).map_err(|source| {
                SnapshotError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                }
            })?);
        }

        Ok(Self {
            excluded: &[MARKER_FILE],
            patterns,
        })
    }

    /// A filter that only hides the marker file.
    pub fn marker_only() -> Self {
        Self {
            excluded: &[MARKER_FILE],
            patterns: Vec::new(),
        }
    }

    pub fn is_excluded(&self, name: &str) -> bool {
        self.excluded.iter().any(|excluded| *excluded == name)
            || self.patterns.iter().any(|pattern| pattern.matches(name))
    }

    /// Keep the names matching no pattern, preserving input order.
    pub fn apply(&self, names: Vec<String>) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| !self.is_excluded(name))
            .collect()
    }
}

impl Default for NameFilter {
    fn default() -> Self {
        Self::marker_only()
    }
}

/// Check a pattern list without building a filter.
pub fn validate_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<()> {
    for pattern in patterns {
        let pattern = pattern.as_ref();
        Pattern::new(pattern).map_err(|source| SnapshotError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_patterns_only_drop_marker() {
        let filter = NameFilter::new::<&str>(&[], &[]).unwrap();
        let input = names(&["b.txt", MARKER_FILE, "a.txt"]);

        assert_eq!(filter.apply(input), names(&["b.txt", "a.txt"]));
    }

    #[test]
    fn test_unmatched_pattern_is_noop() {
        let filter = NameFilter::new(&["*.log"], &[]).unwrap();
        let input = names(&["z", "a.txt", "m.rs"]);

        assert_eq!(filter.apply(input.clone()), input);
    }

    #[test]
    fn test_star_removes_everything() {
        let filter = NameFilter::new(&["*"], &[]).unwrap();
        assert!(filter.apply(names(&["a", ".hidden", "b.txt"])).is_empty());
    }

    #[test]
    fn test_ignore_and_hide_are_unioned() {
        let filter = NameFilter::new(&["*.tmp"], DEFAULT_HIDE).unwrap();
        let kept = filter.apply(names(&[".git", "build.tmp", "src", "__pycache__", "main.rs"]));

        assert_eq!(kept, names(&["src", "main.rs"]));
    }

    #[test]
    fn test_marker_name_is_matched_literally() {
        let filter = NameFilter::marker_only();
        assert!(filter.is_excluded(MARKER_FILE));
        assert!(!filter.is_excluded("syrupyXgitkeep"));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let err = NameFilter::new(&["[abc"], &[]).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidPattern { .. }));
        assert!(validate_patterns(&["[abc"]).is_err());
        assert!(validate_patterns(&["*.rs", "?x"]).is_ok());
    }
}
