//! Line and word diff primitives
//!
//! This module turns two texts into unified-diff hunks and renders them as
//! plain lines. One-to-one replaced lines carry intra-line marks around the
//! exact words that changed (`[-old-]` / `{+new+}`).

pub mod algorithms;
pub mod formatter;
pub mod generator;

// Re-export the main types for easier use
pub use algorithms::{
    added_spans, line_diff, removed_spans, DiffAlgorithmType, DiffHunk, DiffOperation, DiffResult,
    DiffStats, ADDED_CLOSE, ADDED_OPEN, REMOVED_CLOSE, REMOVED_OPEN,
};

pub use formatter::DiffFormatter;
pub use generator::{DiffConfig, DiffGenerator, DEFAULT_CONTEXT_LINES};

