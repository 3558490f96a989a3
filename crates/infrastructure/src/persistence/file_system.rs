//! Real file system implementation.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use torchgen_application::ports::{FileSystem, FileSystemError};

/// Real file system implementation using `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl StdFileSystem {
    /// Creates a new `StdFileSystem`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Mode of newly created files, matching a plain write under the usual umask.
#[cfg(unix)]
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Gives the temporary file the mode the destination would otherwise get:
/// the existing file's mode, or [`DEFAULT_FILE_MODE`] for a new file.
#[cfg(unix)]
fn apply_destination_mode(file: &NamedTempFile, path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = fs::metadata(path).map_or_else(
        |_| fs::Permissions::from_mode(DEFAULT_FILE_MODE),
        |metadata| metadata.permissions(),
    );
    file.as_file().set_permissions(permissions)
}

#[cfg(not(unix))]
fn apply_destination_mode(_file: &NamedTempFile, _path: &Path) -> io::Result<()> {
    Ok(())
}

fn map_io_error(path: &Path, e: io::Error) -> FileSystemError {
    match e.kind() {
        io::ErrorKind::NotFound => FileSystemError::NotFound(path.to_path_buf()),
        io::ErrorKind::PermissionDenied => FileSystemError::PermissionDenied(path.to_path_buf()),
        _ => FileSystemError::Io(e),
    }
}

impl FileSystem for StdFileSystem {
    fn read_file_string(&self, path: &Path) -> Result<String, FileSystemError> {
        fs::read_to_string(path).map_err(|e| map_io_error(path, e))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), FileSystemError> {
        fs::create_dir_all(path).map_err(|e| map_io_error(path, e))
    }

    /// Writes to a temporary file beside `path`, then renames it over `path`.
    fn write_file_atomic(&self, path: &Path, contents: &[u8]) -> Result<(), FileSystemError> {
        let parent = match path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
            Some(parent) => parent,
            None => return Err(FileSystemError::InvalidPath(path.to_path_buf())),
        };

        let mut file = NamedTempFile::new_in(parent).map_err(|e| map_io_error(parent, e))?;
        file.write_all(contents)?;
        apply_destination_mode(&file, path)?;
        file.as_file().sync_all()?;
        file.persist(path).map_err(|e| map_io_error(path, e.error))?;

        tracing::debug!(path = %path.display(), bytes = contents.len(), "persisted file");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.cpp");
        let fs = StdFileSystem::new();

        fs.write_file_atomic(&path, b"int main() {}").unwrap();

        assert!(path.exists());
        assert_eq!(fs.read_file_string(&path).unwrap(), "int main() {}");
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.cpp");
        let fs = StdFileSystem::new();

        fs.write_file_atomic(&path, b"old").unwrap();
        fs.write_file_atomic(&path, b"new").unwrap();

        assert_eq!(fs.read_file_string(&path).unwrap(), "new");
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn test_create_nested_directories() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b").join("c");
        let fs = StdFileSystem::new();

        fs.create_dir_all(&nested).unwrap();
        fs.write_file_atomic(&nested.join("main.cpp"), b"x").unwrap();

        assert!(nested.join("main.cpp").exists());
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_new_file_mode_matches_plain_write() {
        let dir = TempDir::new().unwrap();
        let atomic = dir.path().join("main.cpp");
        let plain = dir.path().join("plain.cpp");

        StdFileSystem::new().write_file_atomic(&atomic, b"x").unwrap();
        std::fs::write(&plain, b"x").unwrap();

        assert_eq!(mode(&atomic), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn test_existing_file_mode_is_kept() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.cpp");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        StdFileSystem::new().write_file_atomic(&path, b"new").unwrap();

        assert_eq!(mode(&path), 0o755);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.yaml");

        let err = StdFileSystem::new().read_file_string(&path).unwrap_err();
        assert!(matches!(err, FileSystemError::NotFound(p) if p == path));
    }

    #[test]
    fn test_write_into_missing_directory_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("main.cpp");

        let result = StdFileSystem::new().write_file_atomic(&path, b"x");
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
