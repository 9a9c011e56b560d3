//! `mkdir -p` for a list of directories.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use stagehand_core::{
    application::ports::{DirStrategy, Executor},
    error::{Context, StagehandResult},
};

/// Applies a directory strategy to each distinct requested directory.
///
/// With [`crate::file::MkdirAllStrategy`] the directories are created; with
/// [`crate::file::DryRunDirStrategy`] they are only reported.
pub struct MkdirExecutor {
    dirs: Vec<PathBuf>,
    strategy: Arc<dyn DirStrategy>,
}

impl MkdirExecutor {
    /// Duplicates are dropped, keeping first-occurrence order.
    pub fn new(dirs: Vec<PathBuf>, strategy: Arc<dyn DirStrategy>) -> Self {
        let mut seen = HashSet::with_capacity(dirs.len());
        let dirs = dirs.into_iter().filter(|d| seen.insert(d.clone())).collect();
        Self { dirs, strategy }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl Executor for MkdirExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for dir in &self.dirs {
            self.strategy
                .apply(dir)
                .with_context(|| format!("mkdir [{}]", dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::{DryRunDirStrategy, MkdirAllStrategy};
    use crate::filesystem::{LocalFilesystem, MemoryFilesystem};
    use tempfile::TempDir;

    #[test]
    fn duplicates_are_created_once() {
        let fs = MemoryFilesystem::new();
        let exec = MkdirExecutor::new(
            vec!["a/b".into(), "a/b".into(), "c".into()],
            Arc::new(MkdirAllStrategy::new(Arc::new(fs.clone()))),
        );

        exec.exec().unwrap();

        assert_eq!(
            fs.created_dirs(),
            vec![PathBuf::from("a/b"), PathBuf::from("c")]
        );
    }

    #[test]
    fn rerun_on_existing_tree_succeeds() {
        let temp = TempDir::new().unwrap();
        let exec = MkdirExecutor::new(
            vec![temp.path().join("a/b"), temp.path().join("c")],
            Arc::new(MkdirAllStrategy::new(Arc::new(LocalFilesystem::new()))),
        );

        exec.exec().unwrap();
        exec.exec().unwrap();

        assert!(temp.path().join("a/b").is_dir());
        assert!(temp.path().join("c").is_dir());
    }

    #[test]
    fn dry_run_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let exec = MkdirExecutor::new(vec![temp.path().join("ghost")], Arc::new(DryRunDirStrategy));

        exec.exec().unwrap();

        assert!(!temp.path().join("ghost").exists());
    }
}
