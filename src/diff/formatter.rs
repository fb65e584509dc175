use super::algorithms::{
    added_spans, removed_spans, split_terminator, DiffOperation, DiffResult, DiffStats,
};

/// Renders diff results as plain unified-diff lines.
///
/// Lines carry no color and no trailing newline; decoration is left to the
/// caller.
pub struct DiffFormatter;

impl DiffFormatter {
    /// Render a diff result as unified diff lines.
    ///
    /// The `--- old` / `+++ new` header pair is emitted before the first hunk
    /// only, so an empty result renders as no lines at all. One-to-one line
    /// replacements carry intra-line word marks.
    pub fn format_unified(
        result: &DiffResult,
        old_label: &str,
        new_label: &str,
    ) -> Vec<String> {
        if result.is_empty() {
            return Vec::new();
        }

        let mut output = Vec::new();
        output.push(format!("--- {}", old_label));
        output.push(format!("+++ {}", new_label));

        for hunk in &result.hunks {
            output.push(hunk.header());

            for op in &hunk.operations {
                match op {
                    DiffOperation::Equal(lines) => {
                        output.extend(lines.iter().map(|line| prefixed(' ', line)));
                    }
                    DiffOperation::Delete(lines) => {
                        output.extend(lines.iter().map(|line| prefixed('-', line)));
                    }
                    DiffOperation::Insert(lines) => {
                        output.extend(lines.iter().map(|line| prefixed('+', line)));
                    }
                    DiffOperation::Replace { old, new } if old.len() == new.len() => {
                        let pairs = || old.iter().zip(new.iter());
                        output.extend(pairs().map(|(a, b)| prefixed('-', &removed_spans(a, b))));
                        output.extend(pairs().map(|(a, b)| prefixed('+', &added_spans(a, b))));
                    }
                    // No 1:1 correspondence to mark words against
                    DiffOperation::Replace { old, new } => {
                        output.extend(old.iter().map(|line| prefixed('-', line)));
                        output.extend(new.iter().map(|line| prefixed('+', line)));
                    }
                }
            }
        }

        output
    }

    /// Format diff statistics as a summary
    pub fn format_stats(stats: &DiffStats) -> String {
        if stats.total_changes() == 0 {
            return "No changes".to_string();
        }

        let mut parts = Vec::new();

        if stats.lines_added > 0 {
            parts.push(format!(
                "{} insertion{}",
                stats.lines_added,
                if stats.lines_added == 1 { "" } else { "s" }
            ));
        }

        if stats.lines_removed > 0 {
            parts.push(format!(
                "{} deletion{}",
                stats.lines_removed,
                if stats.lines_removed == 1 { "" } else { "s" }
            ));
        }

        if stats.hunks > 0 {
            parts.push(format!(
                "{} hunk{}",
                stats.hunks,
                if stats.hunks == 1 { "" } else { "s" }
            ));
        }

        parts.join(", ")
    }
}

fn prefixed(prefix: char, line: &str) -> String {
    let (line, _) = split_terminator(line);
    let mut out = String::with_capacity(line.len() + 1);
    out.push(prefix);
    out.push_str(line);
    out
}
