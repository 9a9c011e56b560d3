//! Per-file strategies and directory strategies.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use stagehand_core::{
    DRY_RUN_TARGET,
    application::ports::{DirStrategy, FileStrategy, Filesystem, TemplateRenderer},
    domain::FileDescriptor,
    error::{Context, StagehandResult},
};
use tracing::{debug, info};

/// Expands the file content as a template.
///
/// Content that is not valid UTF-8 is passed through untouched.
pub struct TemplateStrategy {
    renderer: Arc<dyn TemplateRenderer>,
}

impl TemplateStrategy {
    pub fn new(renderer: Arc<dyn TemplateRenderer>) -> Self {
        Self { renderer }
    }
}

impl FileStrategy for TemplateStrategy {
    fn apply(&self, file: FileDescriptor) -> StagehandResult<FileDescriptor> {
        let name = file.path().display().to_string();
        let Ok(text) = std::str::from_utf8(&file.data) else {
            debug!(path = %name, "binary content, template skipped");
            return Ok(file);
        };
        let rendered = self.renderer.render(&name, text)?;
        Ok(file.with_data(rendered))
    }
}

/// Moves the file to a fixed target path.
#[derive(Debug, Clone)]
pub struct ReplacePathStrategy {
    target: PathBuf,
}

impl ReplacePathStrategy {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl FileStrategy for ReplacePathStrategy {
    fn apply(&self, file: FileDescriptor) -> StagehandResult<FileDescriptor> {
        Ok(file.with_path(&self.target))
    }
}

/// Writes the file, creating parent directories as needed.
pub struct SaveStrategy {
    fs: Arc<dyn Filesystem>,
}

impl SaveStrategy {
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }
}

impl FileStrategy for SaveStrategy {
    fn apply(&self, file: FileDescriptor) -> StagehandResult<FileDescriptor> {
        let directory = file.info.directory();
        if !directory.as_os_str().is_empty() {
            self.fs
                .create_dir_all(directory)
                .with_context(|| format!("save file [{}]", file.path().display()))?;
        }
        self.fs
            .write_file(file.path(), &file.data)
            .with_context(|| format!("save file [{}]", file.path().display()))?;
        info!(path = %file.path().display(), "file saved");
        Ok(file)
    }
}

/// Reports the file instead of writing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunFileStrategy;

impl FileStrategy for DryRunFileStrategy {
    fn apply(&self, file: FileDescriptor) -> StagehandResult<FileDescriptor> {
        info!(
            target: DRY_RUN_TARGET,
            "save file: {} ({} bytes)",
            file.path().display(),
            file.data.len()
        );
        Ok(file)
    }
}

/// Creates the directory and its parents.
pub struct MkdirAllStrategy {
    fs: Arc<dyn Filesystem>,
}

impl MkdirAllStrategy {
    pub fn new(fs: Arc<dyn Filesystem>) -> Self {
        Self { fs }
    }
}

impl DirStrategy for MkdirAllStrategy {
    fn apply(&self, dir: &Path) -> StagehandResult<()> {
        self.fs.create_dir_all(dir)?;
        info!(dir = %dir.display(), "dir created");
        Ok(())
    }
}

/// Reports the directory instead of creating it.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunDirStrategy;

impl DirStrategy for DryRunDirStrategy {
    fn apply(&self, dir: &Path) -> StagehandResult<()> {
        info!(target: DRY_RUN_TARGET, "create dir: {}", dir.display());
        Ok(())
    }
}
