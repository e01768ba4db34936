use serde::{Deserialize, Serialize};

/// Translation engine configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Maximum number of clause processors running at once across a whole translation
    pub max_concurrent_clauses: usize,
    /// Cancel and abort sibling clause tasks once one of them fails
    pub cancel_on_error: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_clauses: 64,
            cancel_on_error: true,
        }
    }
}

impl CompilerConfig {
    /// Create a new compiler configuration
    pub fn new(max_concurrent_clauses: usize, cancel_on_error: bool) -> Self {
        Self {
            max_concurrent_clauses,
            cancel_on_error,
        }
    }

    /// Set the clause concurrency limit
    pub fn with_max_concurrent_clauses(mut self, limit: usize) -> Self {
        self.max_concurrent_clauses = limit;
        self
    }

    /// Set whether sibling tasks are cancelled on the first error
    pub fn with_cancel_on_error(mut self, cancel: bool) -> Self {
        self.cancel_on_error = cancel;
        self
    }

    /// Number of semaphore permits to allocate (never zero)
    pub fn permits(&self) -> usize {
        self.max_concurrent_clauses.max(1)
    }
}
