//! Destination preparation and chunked stream-to-disk writing.

use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::{FsOpsError, FsOpsResult};

/// Create every missing ancestor directory of `destination`.
///
/// A destination with no parent component (a bare file name, written into
/// the working directory) needs no preparation and succeeds trivially.
///
/// # Errors
///
/// Returns an error if directory creation fails, for example when a parent
/// path segment is an existing regular file.
pub async fn ensure_parent_dirs(destination: &Path) -> FsOpsResult<()> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| FsOpsError::io("ensure_parent_dirs.create_dir_all", parent, source))?;
    }
    Ok(())
}

/// Best-effort display name for a destination path: its final component, or
/// the whole path when there is none.
#[must_use]
pub fn destination_file_name(destination: &Path) -> String {
    destination.file_name().map_or_else(
        || destination.to_string_lossy().into_owned(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// Open destination file with create-or-truncate semantics and a running
/// byte counter. Existing files are silently overwritten.
pub struct DestinationFile {
    file: File,
    path: PathBuf,
    bytes_written: u64,
}

impl DestinationFile {
    /// Create (or truncate) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub async fn create(path: &Path) -> FsOpsResult<Self> {
        let file = File::create(path)
            .await
            .map_err(|source| FsOpsError::io("destination.create", path, source))?;
        Ok(Self {
            file,
            path: path.to_path_buf(),
            bytes_written: 0,
        })
    }

    /// Write one chunk, advancing the byte counter.
    ///
    /// # Errors
    ///
    /// Returns an error on a mid-copy write failure; bytes already written
    /// stay on disk (no rollback).
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> FsOpsResult<()> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|source| FsOpsError::io("destination.write_chunk", &self.path, source))?;
        self.bytes_written = self.bytes_written.saturating_add(chunk.len() as u64);
        Ok(())
    }

    /// Bytes written so far.
    #[must_use]
    pub const fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush buffered bytes and return the total written. Consumes the
    /// handle, closing the file on drop.
    ///
    /// # Errors
    ///
    /// Returns an error if the flush fails.
    pub async fn finish(mut self) -> FsOpsResult<u64> {
        self.file
            .flush()
            .await
            .map_err(|source| FsOpsError::io("destination.flush", &self.path, source))?;
        Ok(self.bytes_written)
    }
}
