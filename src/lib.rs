pub mod cli;
pub mod compare;
pub mod config;
pub mod diff;
pub mod error;
pub mod filter;
pub mod store;

pub use compare::{CompareOptions, Comparison, FileComparison, PathPair, TreeComparison};
pub use error::{Result, SnapshotError};
pub use filter::{NameFilter, DEFAULT_HIDE, MARKER_FILE};
pub use store::{Snapshot, SnapshotCollection, SnapshotStore};
