//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the engine needs from external systems.
//! The `stagehand-adapters` crate provides implementations.

use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;

use crate::domain::FileDescriptor;
use crate::error::StagehandResult;

/// A runnable unit of work: one step of the chain, or the chain itself.
#[cfg_attr(test, automock)]
pub trait Executor: Send + Sync {
    fn exec(&self) -> StagehandResult<()>;
}

/// A step that must finish before any executor of the chain runs.
#[cfg_attr(test, automock)]
pub trait Preprocessor: Send + Sync {
    fn process(&self) -> StagehandResult<()>;
}

/// Resolves the bytes of one file.
///
/// Implemented by:
/// - `stagehand_adapters::file::InlineProducer` (declared data)
/// - `stagehand_adapters::file::LocalProducer` (copy of a local file)
/// - `stagehand_adapters::file::RemoteProducer` (HTTP GET)
/// - `stagehand_adapters::file::PreloadProducer` (concurrently prefetched)
#[cfg_attr(test, automock)]
pub trait FileProducer: Send + Sync {
    fn get(&self) -> StagehandResult<FileDescriptor>;
}

/// A transformation applied to a resolved file.
///
/// Strategies run in order; each receives the previous one's output.
#[cfg_attr(test, automock)]
pub trait FileStrategy: Send + Sync {
    fn apply(&self, file: FileDescriptor) -> StagehandResult<FileDescriptor>;
}

/// What to do with a directory that should exist.
#[cfg_attr(test, automock)]
pub trait DirStrategy: Send + Sync {
    fn apply(&self, dir: &Path) -> StagehandResult<()>;
}

/// Port for filesystem operations.
///
/// Implemented by:
/// - `stagehand_adapters::filesystem::LocalFilesystem` (production)
/// - `stagehand_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, automock)]
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> StagehandResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &[u8]) -> StagehandResult<()>;

    /// Read a whole file.
    fn read_file(&self, path: &Path) -> StagehandResult<Vec<u8>>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Remove a file or a directory with all contents.
    ///
    /// Removing a path that does not exist succeeds.
    fn remove_all(&self, path: &Path) -> StagehandResult<()>;
}

/// Port for template expansion.
///
/// `name` identifies the template in error messages (usually a path).
#[cfg_attr(test, automock)]
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, name: &str, text: &str) -> StagehandResult<String>;
}

/// One entry of a read-only source tree, relative to its root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub is_dir: bool,
}

/// Read-only tree of files, walked by the save variant of the tree
/// transformer.
///
/// Implemented by:
/// - `stagehand_adapters::source::DiskSource` (a directory on disk)
/// - `stagehand_adapters::source::EmbeddedSource` (assets compiled into the binary)
pub trait SourceTree: Send + Sync + std::fmt::Debug {
    /// Every entry below the root (root excluded), parents before children.
    fn entries(&self) -> StagehandResult<Vec<SourceEntry>>;

    /// Content of the file at `path` (relative to the root).
    fn read(&self, path: &Path) -> StagehandResult<Vec<u8>>;
}
