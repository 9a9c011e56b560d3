//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use stagehand_core::{
    application::{ApplicationError, ports::Filesystem},
    error::StagehandResult,
};

/// In-memory filesystem for testing.
///
/// Records every `create_dir_all` call so tests can assert how often a
/// directory was requested.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
    created: Vec<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Read a file's content (testing helper).
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path.as_ref()).cloned()
    }

    /// All file paths, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every path passed to `create_dir_all`, in call order.
    pub fn created_dirs(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.created.clone())
            .unwrap_or_default()
    }

    fn poisoned() -> ApplicationError {
        ApplicationError::LockPoisoned {
            resource: "memory filesystem",
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> StagehandResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        inner.created.push(path.to_path_buf());
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> StagehandResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) {
                return Err(ApplicationError::Filesystem {
                    path: path.to_path_buf(),
                    operation: "write file",
                    reason: "parent directory does not exist".into(),
                }
                .into());
            }
        }

        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn read_file(&self, path: &Path) -> StagehandResult<Vec<u8>> {
        let inner = self.inner.read().map_err(|_| Self::poisoned())?;
        inner.files.get(path).cloned().ok_or_else(|| {
            ApplicationError::Filesystem {
                path: path.to_path_buf(),
                operation: "read file",
                reason: "no such file".into(),
            }
            .into()
        })
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn remove_all(&self, path: &Path) -> StagehandResult<()> {
        let mut inner = self.inner.write().map_err(|_| Self::poisoned())?;

        inner.directories.retain(|p| !p.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("a/b.txt"), b"x").is_err());

        fs.create_dir_all(Path::new("a")).unwrap();
        fs.write_file(Path::new("a/b.txt"), b"x").unwrap();
        assert_eq!(fs.contents("a/b.txt"), Some(b"x".to_vec()));
    }

    #[test]
    fn remove_all_drops_subtree() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("a/b")).unwrap();
        fs.write_file(Path::new("a/b/c.txt"), b"x").unwrap();

        fs.remove_all(Path::new("a")).unwrap();

        assert!(!fs.exists(Path::new("a/b")));
        assert!(fs.files().is_empty());
        assert_eq!(fs.created_dirs(), vec![PathBuf::from("a/b")]);
    }
}
