//! Read-only source trees for the save variant of the tree transformer.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use stagehand_core::{
    application::{
        ApplicationError,
        ports::{SourceEntry, SourceTree},
    },
    error::StagehandResult,
};
use walkdir::WalkDir;

/// A directory on disk, opened read-only.
#[derive(Debug, Clone)]
pub struct DiskSource {
    root: PathBuf,
}

impl DiskSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceTree for DiskSource {
    fn entries(&self) -> StagehandResult<Vec<SourceEntry>> {
        let mut entries = Vec::new();
        for entry in WalkDir::new(&self.root).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| ApplicationError::Filesystem {
                path: self.root.clone(),
                operation: "walk",
                reason: e.to_string(),
            })?;
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            entries.push(SourceEntry {
                path: relative.to_path_buf(),
                is_dir: entry.file_type().is_dir(),
            });
        }
        Ok(entries)
    }

    fn read(&self, path: &Path) -> StagehandResult<Vec<u8>> {
        let full = self.root.join(path);
        fs::read(&full).map_err(|e| {
            ApplicationError::Filesystem {
                path: full,
                operation: "read file",
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Files compiled into the binary, e.g. with `include_bytes!`.
///
/// Directories are implied by the file paths.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedSource {
    files: &'static [(&'static str, &'static [u8])],
}

impl EmbeddedSource {
    pub const fn new(files: &'static [(&'static str, &'static [u8])]) -> Self {
        Self { files }
    }
}

impl SourceTree for EmbeddedSource {
    fn entries(&self) -> StagehandResult<Vec<SourceEntry>> {
        let mut dirs = BTreeSet::new();
        let mut files = BTreeSet::new();
        for (name, _) in self.files {
            let path = Path::new(name);
            let mut parent = path.parent();
            while let Some(dir) = parent {
                if dir.as_os_str().is_empty() {
                    break;
                }
                dirs.insert(dir.to_path_buf());
                parent = dir.parent();
            }
            files.insert(path.to_path_buf());
        }

        let mut entries: Vec<SourceEntry> = dirs
            .into_iter()
            .map(|path| SourceEntry { path, is_dir: true })
            .chain(files.into_iter().map(|path| SourceEntry {
                path,
                is_dir: false,
            }))
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(entries)
    }

    fn read(&self, path: &Path) -> StagehandResult<Vec<u8>> {
        self.files
            .iter()
            .find(|(name, _)| Path::new(name) == path)
            .map(|(_, data)| data.to_vec())
            .ok_or_else(|| {
                ApplicationError::Filesystem {
                    path: path.to_path_buf(),
                    operation: "read embedded file",
                    reason: "no such file".into(),
                }
                .into()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    static ASSETS: &[(&str, &[u8])] = &[
        ("src/main.rs", b"fn main() {}"),
        ("README.md", b"# demo"),
    ];

    #[test]
    fn embedded_entries_list_parents_first() {
        let entries = EmbeddedSource::new(ASSETS).entries().unwrap();

        let listed: Vec<(String, bool)> = entries
            .iter()
            .map(|e| (e.path.to_string_lossy().into_owned(), e.is_dir))
            .collect();
        assert_eq!(
            listed,
            vec![
                ("README.md".to_string(), false),
                ("src".to_string(), true),
                ("src/main.rs".to_string(), false),
            ]
        );
    }

    #[test]
    fn embedded_read_unknown_path_fails() {
        let source = EmbeddedSource::new(ASSETS);
        assert_eq!(source.read(Path::new("README.md")).unwrap(), b"# demo");
        assert!(source.read(Path::new("nope")).is_err());
    }

    #[test]
    fn disk_entries_are_relative_and_sorted() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("b/c")).unwrap();
        fs::write(temp.path().join("b/c/f.txt"), b"f").unwrap();
        fs::write(temp.path().join("a.txt"), b"a").unwrap();

        let source = DiskSource::new(temp.path());
        let paths: Vec<PathBuf> = source.entries().unwrap().into_iter().map(|e| e.path).collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("a.txt"),
                PathBuf::from("b"),
                PathBuf::from("b/c"),
                PathBuf::from("b/c/f.txt"),
            ]
        );
        assert_eq!(source.read(Path::new("b/c/f.txt")).unwrap(), b"f");
    }
}
