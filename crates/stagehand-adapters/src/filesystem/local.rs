//! Local filesystem adapter using std::fs.

use std::io;
use std::path::Path;

use stagehand_core::{
    application::{ApplicationError, ports::Filesystem},
    error::{StagehandError, StagehandResult},
};

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> StagehandResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> StagehandResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn read_file(&self, path: &Path) -> StagehandResult<Vec<u8>> {
        std::fs::read(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn remove_all(&self, path: &Path) -> StagehandResult<()> {
        let metadata = match std::fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(map_io_error(path, e, "inspect")),
        };

        let removed = if metadata.is_dir() {
            std::fs::remove_dir_all(path)
        } else {
            std::fs::remove_file(path)
        };

        match removed {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(map_io_error(path, e, "remove")),
            _ => Ok(()),
        }
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &'static str) -> StagehandError {
    ApplicationError::Filesystem {
        path: path.to_path_buf(),
        operation,
        reason: e.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn write_then_read() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let dir = temp.path().join("nested/dir");
        fs.create_dir_all(&dir).unwrap();
        fs.write_file(&dir.join("a.bin"), &[0, 159, 146, 150]).unwrap();

        assert_eq!(fs.read_file(&dir.join("a.bin")).unwrap(), vec![0, 159, 146, 150]);
    }

    #[test]
    fn remove_all_handles_files_dirs_and_missing_paths() {
        let temp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let dir = temp.path().join("tree/inner");
        fs.create_dir_all(&dir).unwrap();
        fs.write_file(&dir.join("f.txt"), b"x").unwrap();
        fs.write_file(&temp.path().join("lone.txt"), b"y").unwrap();

        fs.remove_all(&temp.path().join("tree")).unwrap();
        fs.remove_all(&temp.path().join("lone.txt")).unwrap();
        fs.remove_all(&temp.path().join("never-existed")).unwrap();

        assert!(!fs.exists(&temp.path().join("tree")));
        assert!(!fs.exists(&temp.path().join("lone.txt")));
    }

    #[test]
    fn read_missing_file_names_the_path() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing.txt");
        let err = LocalFilesystem::new().read_file(&missing).unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
        assert!(err.to_string().starts_with("failed to read file"));
    }
}
