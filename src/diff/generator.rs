use super::algorithms::{line_diff, DiffAlgorithmType, DiffResult};

/// Default number of context lines around each hunk
pub const DEFAULT_CONTEXT_LINES: usize = 3;

/// High-level diff generator bundling an algorithm with a context width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffGenerator {
    algorithm: DiffAlgorithmType,
    context_lines: usize,
}

impl DiffGenerator {
    /// Create a new diff generator with the specified algorithm
    pub fn new(algorithm: DiffAlgorithmType) -> Self {
        Self {
            algorithm,
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    /// Generate a diff between old and new content
    pub fn generate(&self, old: &str, new: &str) -> DiffResult {
        line_diff(self.algorithm, old, new, self.context_lines)
    }

    pub fn algorithm(&self) -> DiffAlgorithmType {
        self.algorithm
    }

    pub fn context_lines(&self) -> usize {
        self.context_lines
    }
}

impl Default for DiffGenerator {
    fn default() -> Self {
        Self::new(DiffAlgorithmType::default())
    }
}

/// Builder for configuring diff generation
#[derive(Debug, Clone)]
pub struct DiffConfig {
    algorithm: DiffAlgorithmType,
    context_lines: usize,
}

impl DiffConfig {
    pub fn new() -> Self {
        Self {
            algorithm: DiffAlgorithmType::default(),
            context_lines: DEFAULT_CONTEXT_LINES,
        }
    }

    pub fn algorithm(mut self, algorithm: DiffAlgorithmType) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    pub fn build(self) -> DiffGenerator {
        DiffGenerator {
            algorithm: self.algorithm,
            context_lines: self.context_lines,
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self::new()
    }
}
