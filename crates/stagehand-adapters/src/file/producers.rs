//! File producers: inline data, local copies, remote fetches.

use std::path::PathBuf;
use std::sync::Arc;

use stagehand_core::{
    application::ports::{FileProducer, Filesystem},
    domain::{FileDescriptor, RemoteSource},
    error::{Context, StagehandResult},
};
use tracing::debug;

use crate::http::LazyHttpClient;

/// Produces a file whose content was declared inline.
#[derive(Debug, Clone)]
pub struct InlineProducer {
    file: FileDescriptor,
}

impl InlineProducer {
    pub fn new(file: FileDescriptor) -> Self {
        Self { file }
    }
}

impl FileProducer for InlineProducer {
    fn get(&self) -> StagehandResult<FileDescriptor> {
        Ok(self.file.clone())
    }
}

/// Produces `path` with the content of the local file `source`.
pub struct LocalProducer {
    path: PathBuf,
    source: PathBuf,
    fs: Arc<dyn Filesystem>,
}

impl LocalProducer {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<PathBuf>, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
            fs,
        }
    }
}

impl FileProducer for LocalProducer {
    fn get(&self) -> StagehandResult<FileDescriptor> {
        let data = self
            .fs
            .read_file(&self.source)
            .with_context(|| format!("local file [{}]", self.path.display()))?;
        debug!(path = %self.path.display(), source = %self.source.display(), "local file read");
        Ok(FileDescriptor::new(&self.path, data))
    }
}

/// Produces `path` with the body of an HTTP GET.
pub struct RemoteProducer {
    path: PathBuf,
    source: RemoteSource,
    client: Arc<LazyHttpClient>,
}

impl RemoteProducer {
    pub fn new(path: impl Into<PathBuf>, source: RemoteSource, client: Arc<LazyHttpClient>) -> Self {
        Self {
            path: path.into(),
            source,
            client,
        }
    }
}

impl FileProducer for RemoteProducer {
    fn get(&self) -> StagehandResult<FileDescriptor> {
        let data = self
            .client
            .get()?
            .fetch(&self.source)
            .with_context(|| format!("remote file [{}]", self.path.display()))?;
        debug!(path = %self.path.display(), url = %self.source.url, "remote file fetched");
        Ok(FileDescriptor::new(&self.path, data))
    }
}
