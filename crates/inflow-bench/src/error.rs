//! # Design
//!
//! - Constant error messages; operation and path context in structured
//!   fields, matching the filesystem error idiom used across the workspace.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for benchmark log operations.
pub type BenchResult<T> = Result<T, BenchError>;

/// Errors produced while appending to the benchmark log.
#[derive(Debug, Error)]
pub enum BenchError {
    /// IO failures while opening or writing the log file.
    #[error("benchmark log io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl BenchError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}
