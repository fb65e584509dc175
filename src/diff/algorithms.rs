use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use similar::{Algorithm, DiffTag, TextDiff};

/// Opening marker of an inserted span inside a changed line.
pub const ADDED_OPEN: &str = "{+";
/// Closing marker of an inserted span inside a changed line.
pub const ADDED_CLOSE: &str = "+}";
/// Opening marker of a deleted span inside a changed line.
pub const REMOVED_OPEN: &str = "[-";
/// Closing marker of a deleted span inside a changed line.
pub const REMOVED_CLOSE: &str = "-]";

/// Result of a line diff, grouped into unified-diff hunks
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    pub hunks: Vec<DiffHunk>,
    pub stats: DiffStats,
}

impl DiffResult {
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

/// A single hunk (contiguous block of changes plus context)
#[derive(Debug, Clone)]
pub struct DiffHunk {
    /// 0-based index of the first old line covered by the hunk
    pub old_start: usize,
    pub old_len: usize,
    /// 0-based index of the first new line covered by the hunk
    pub new_start: usize,
    pub new_len: usize,
    pub operations: Vec<DiffOperation>,
}

impl DiffHunk {
    /// The `@@ -a,b +c,d @@` header, 1-based, with `,len` omitted when `len == 1`.
    pub fn header(&self) -> String {
        format!(
            "@@ -{} +{} @@",
            format_range(self.old_start, self.old_len),
            format_range(self.new_start, self.new_len)
        )
    }
}

fn format_range(start: usize, len: usize) -> String {
    match len {
        1 => format!("{}", start + 1),
        // An empty range points at the line before it
        0 => format!("{},0", start),
        _ => format!("{},{}", start + 1, len),
    }
}

/// One opcode of a hunk, carrying the lines it covers.
///
/// Lines keep their trailing newline when the source had one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffOperation {
    Equal(Vec<String>),
    Delete(Vec<String>),
    Insert(Vec<String>),
    Replace { old: Vec<String>, new: Vec<String> },
}

/// Statistics about the diff
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffStats {
    pub lines_added: usize,
    pub lines_removed: usize,
    pub hunks: usize,
}

impl DiffStats {
    /// Lines added plus lines removed.
    pub fn total_changes(&self) -> usize {
        self.lines_added + self.lines_removed
    }
}

/// Available line diff algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffAlgorithmType {
    /// Minimal edit script in O(ND) time
    #[default]
    Myers,
    /// Longest common subsequence table, quadratic in the line counts
    Lcs,
    Patience,
}

impl DiffAlgorithmType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lcs => "LCS",
            Self::Myers => "Myers",
            Self::Patience => "Patience",
        }
    }

    fn algorithm(&self) -> Algorithm {
        match self {
            Self::Lcs => Algorithm::Lcs,
            Self::Myers => Algorithm::Myers,
            Self::Patience => Algorithm::Patience,
        }
    }
}

impl fmt::Display for DiffAlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for DiffAlgorithmType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lcs" => Ok(Self::Lcs),
            "myers" => Ok(Self::Myers),
            "patience" => Ok(Self::Patience),
            other => Err(format!("unknown diff algorithm: {}", other)),
        }
    }
}

/// Diff two texts line by line and group the opcodes into hunks with
/// `context` lines of surrounding context.
///
/// Opcode runs separated by at most `2 * context` equal lines end up in the
/// same hunk. Identical inputs produce no hunks.
pub fn line_diff(
    algorithm: DiffAlgorithmType,
    old: &str,
    new: &str,
    context: usize,
) -> DiffResult {
    let diff = TextDiff::configure()
        .algorithm(algorithm.algorithm())
        .diff_lines(old, new);
    let old_lines = diff.old_slices();
    let new_lines = diff.new_slices();

    let mut stats = DiffStats::default();
    let mut hunks = Vec::new();

    for group in diff.grouped_ops(context) {
        let (Some(first), Some(last)) = (group.first(), group.last()) else {
            continue;
        };
        let old_start = first.old_range().start;
        let new_start = first.new_range().start;

        let mut operations = Vec::with_capacity(group.len());
        for op in &group {
            let (tag, old_range, new_range) = op.as_tag_tuple();
            // Zero context leaves empty equal runs at group edges
            if old_range.is_empty() && new_range.is_empty() {
                continue;
            }
            let operation = match tag {
                DiffTag::Equal => DiffOperation::Equal(owned(old_lines, old_range)),
                DiffTag::Delete => {
                    stats.lines_removed += old_range.len();
                    DiffOperation::Delete(owned(old_lines, old_range))
                }
                DiffTag::Insert => {
                    stats.lines_added += new_range.len();
                    DiffOperation::Insert(owned(new_lines, new_range))
                }
                DiffTag::Replace => {
                    stats.lines_removed += old_range.len();
                    stats.lines_added += new_range.len();
                    DiffOperation::Replace {
                        old: owned(old_lines, old_range),
                        new: owned(new_lines, new_range),
                    }
                }
            };
            operations.push(operation);
        }

        hunks.push(DiffHunk {
            old_start,
            old_len: last.old_range().end - old_start,
            new_start,
            new_len: last.new_range().end - new_start,
            operations,
        });
    }

    stats.hunks = hunks.len();
    DiffResult { hunks, stats }
}

fn owned(lines: &[&str], range: Range<usize>) -> Vec<String> {
    lines[range].iter().map(|line| line.to_string()).collect()
}

/// `new` with the words that are not in `old` wrapped in `{+` / `+}`.
///
/// Unchanged words pass through verbatim and deleted words are dropped.
pub fn added_spans(old: &str, new: &str) -> String {
    mark_spans(old, new, Side::New)
}

/// `old` with the words missing from `new` wrapped in `[-` / `-]`.
///
/// Unchanged words pass through verbatim and inserted words are dropped.
pub fn removed_spans(old: &str, new: &str) -> String {
    mark_spans(old, new, Side::Old)
}

#[derive(Clone, Copy)]
enum Side {
    Old,
    New,
}

/// Split a line into its content and its `\n` or `\r\n` terminator.
pub(crate) fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, &line[content.len()..])
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, &line[content.len()..])
    } else {
        (line, "")
    }
}

fn mark_spans(old: &str, new: &str, side: Side) -> String {
    let (old, old_end) = split_terminator(old);
    let (new, new_end) = split_terminator(new);
    let terminator = match side {
        Side::Old => old_end,
        Side::New => new_end,
    };

    if old == new {
        let line = match side {
            Side::Old => old,
            Side::New => new,
        };
        return format!("{}{}", line, terminator);
    }

    let diff = TextDiff::configure()
        .algorithm(Algorithm::Myers)
        .diff_words(old, new);
    let old_words = diff.old_slices();
    let new_words = diff.new_slices();

    let mut out = String::with_capacity(old.len().max(new.len()) + 8);
    for op in diff.ops() {
        let (tag, old_range, new_range) = op.as_tag_tuple();
        match (side, tag) {
            (_, DiffTag::Equal) => push_words(&mut out, &old_words[old_range]),
            (Side::New, DiffTag::Insert | DiffTag::Replace) => {
                out.push_str(ADDED_OPEN);
                push_words(&mut out, &new_words[new_range]);
                out.push_str(ADDED_CLOSE);
            }
            (Side::Old, DiffTag::Delete | DiffTag::Replace) => {
                out.push_str(REMOVED_OPEN);
                push_words(&mut out, &old_words[old_range]);
                out.push_str(REMOVED_CLOSE);
            }
            (Side::New, DiffTag::Delete) | (Side::Old, DiffTag::Insert) => {}
        }
    }
    out.push_str(terminator);
    out
}

fn push_words(out: &mut String, words: &[&str]) {
    for word in words {
        out.push_str(word);
    }
}
