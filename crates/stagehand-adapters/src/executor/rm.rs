//! Removal of paths, with trailing-wildcard expansion.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use globset::GlobBuilder;
use stagehand_core::{
    DRY_RUN_TARGET,
    application::{
        ApplicationError,
        ports::{Executor, Filesystem},
    },
    error::{Context, StagehandResult},
};
use tracing::info;
use walkdir::WalkDir;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// Expand a glob pattern against the filesystem.
///
/// The literal leading directories of the pattern are the walk root; the
/// remaining components are matched one level per component, so `*` never
/// crosses a path separator.
pub fn expand_glob(pattern: &str) -> StagehandResult<Vec<PathBuf>> {
    let glob_error = |reason: String| ApplicationError::Glob {
        pattern: pattern.to_owned(),
        reason,
    };

    let path = Path::new(pattern);
    let mut base = PathBuf::new();
    let mut rest = PathBuf::new();
    for component in path.components() {
        let literal = rest.as_os_str().is_empty()
            && !component.as_os_str().to_string_lossy().contains(GLOB_META);
        if literal {
            base.push(component);
        } else {
            rest.push(component);
        }
    }
    if rest.as_os_str().is_empty() {
        return Ok(if path.exists() { vec![path.to_path_buf()] } else { Vec::new() });
    }

    let depth = rest
        .components()
        .filter(|c| matches!(c, Component::Normal(_)))
        .count();
    let matcher = GlobBuilder::new(&rest.to_string_lossy())
        .literal_separator(true)
        .build()
        .map_err(|e| glob_error(e.to_string()))?
        .compile_matcher();

    let root = if base.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        base.clone()
    };
    if !root.is_dir() {
        return Ok(Vec::new());
    }

    let mut matches = Vec::new();
    for entry in WalkDir::new(&root)
        .min_depth(depth)
        .max_depth(depth)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| glob_error(e.to_string()))?;
        let Ok(relative) = entry.path().strip_prefix(&root) else {
            continue;
        };
        if matcher.is_match(relative) {
            matches.push(base.join(relative));
        }
    }
    Ok(matches)
}

/// Removes each path with its whole subtree.
///
/// A path ending in `*` is expanded first and every match is removed.
pub struct RemoveExecutor {
    paths: Vec<String>,
    fs: Arc<dyn Filesystem>,
}

impl RemoveExecutor {
    pub fn new(paths: Vec<String>, fs: Arc<dyn Filesystem>) -> Self {
        Self { paths, fs }
    }

    fn remove(&self, path: &Path) -> StagehandResult<()> {
        self.fs.remove_all(path)?;
        info!(path = %path.display(), "removed");
        Ok(())
    }
}

impl Executor for RemoveExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for path in &self.paths {
            if path.ends_with('*') {
                let matches = expand_glob(path)?;
                for matched in matches {
                    self.remove(&matched)
                        .with_context(|| format!("rm [{path}]"))?;
                }
            } else {
                self.remove(Path::new(path))
                    .with_context(|| format!("rm [{path}]"))?;
            }
        }
        Ok(())
    }
}

/// Reports the paths that would be removed.
pub struct DryRunRemoveExecutor {
    paths: Vec<String>,
}

impl DryRunRemoveExecutor {
    pub fn new(paths: Vec<String>) -> Self {
        Self { paths }
    }
}

impl Executor for DryRunRemoveExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for path in &self.paths {
            info!(target: DRY_RUN_TARGET, "remove: {path}");
        }
        Ok(())
    }
}
