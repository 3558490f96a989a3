//! File system abstraction port.

use std::path::{Path, PathBuf};

/// Error type for file system operations.
#[derive(Debug, thiserror::Error)]
pub enum FileSystemError {
    /// File not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Path has no parent directory to write into.
    #[error("Invalid path: {0}")]
    InvalidPath(PathBuf),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Abstraction over the file system operations the generator needs.
///
/// This trait allows mocking file system access in tests.
pub trait FileSystem {
    /// Reads a file's contents as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_file_string(&self, path: &Path) -> Result<String, FileSystemError>;

    /// Creates a directory and all parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    fn create_dir_all(&self, path: &Path) -> Result<(), FileSystemError>;

    /// Writes bytes to a file so that readers see either the old file or the
    /// complete new one, never a partial write.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written; the destination is
    /// then left untouched.
    fn write_file_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError>;
}
