//! # Design
//!
//! - Structured, constant-message errors for filesystem operations.
//! - Operation and path context makes failures reproducible in tests.
//! - Source errors preserved without interpolating context into messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced while preparing or writing an upload destination.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use super::*;

    #[test]
    fn io_helper_builds_variant_with_source() {
        let err = FsOpsError::io("create.open", "dest.bin", io::Error::other("io"));
        assert_eq!(err.to_string(), "fsops io failure");
        assert!(err.source().is_some());
        assert!(matches!(
            err,
            FsOpsError::Io {
                operation: "create.open",
                ..
            }
        ));
    }
}
