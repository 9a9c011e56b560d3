//! File descriptors and declared file sources.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::DomainError;

/// Location of a file: its directory and name, with the joined path
/// computed once on first access.
#[derive(Clone)]
pub struct FileInfo {
    directory: PathBuf,
    name: String,
    full: OnceLock<PathBuf>,
}

impl FileInfo {
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            directory,
            name,
            full: OnceLock::new(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full path of the file. Memoized: later calls return the cached value.
    pub fn path(&self) -> &Path {
        self.full.get_or_init(|| self.directory.join(&self.name))
    }
}

impl fmt::Debug for FileInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileInfo")
            .field("directory", &self.directory)
            .field("name", &self.name)
            .finish()
    }
}

impl PartialEq for FileInfo {
    fn eq(&self, other: &Self) -> bool {
        self.directory == other.directory && self.name == other.name
    }
}

impl Eq for FileInfo {}

/// A resolved file: where it goes and what it contains.
///
/// Strategies consume a descriptor and return a new one; a descriptor is
/// never shared between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    pub info: FileInfo,
    pub data: Vec<u8>,
}

impl FileDescriptor {
    pub fn new(path: impl AsRef<Path>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            info: FileInfo::new(path),
            data: data.into(),
        }
    }

    pub fn path(&self) -> &Path {
        self.info.path()
    }

    /// Same content, relocated to `path`.
    pub fn with_path(self, path: impl AsRef<Path>) -> Self {
        Self {
            info: FileInfo::new(path),
            data: self.data,
        }
    }

    /// Same location, new content.
    pub fn with_data(self, data: impl Into<Vec<u8>>) -> Self {
        Self {
            info: self.info,
            data: data.into(),
        }
    }
}

/// HTTP location of a remote file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteSource {
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub query: BTreeMap<String, String>,
}

impl RemoteSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Where the bytes of a declared file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Inline(Vec<u8>),
    Remote(RemoteSource),
    Local(PathBuf),
}

/// A file as declared in an action: target path plus exactly one source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndefinedFile {
    pub path: PathBuf,
    pub source: FileSource,
}

impl UndefinedFile {
    /// Build from the three optional declaration fields.
    ///
    /// Exactly one of `data`, `get` and `local` must be present.
    pub fn from_declaration(
        path: impl Into<PathBuf>,
        data: Option<Vec<u8>>,
        get: Option<RemoteSource>,
        local: Option<PathBuf>,
    ) -> Result<Self, DomainError> {
        let path = path.into();
        if path.as_os_str().is_empty() {
            return Err(DomainError::EmptyFilePath);
        }

        let mut declared = Vec::new();
        if data.is_some() {
            declared.push("data");
        }
        if get.is_some() {
            declared.push("get");
        }
        if local.is_some() {
            declared.push("local");
        }
        if declared.len() > 1 {
            return Err(DomainError::ConflictingFileSources {
                path,
                sources: declared,
            });
        }

        let source = match (data, get, local) {
            (Some(data), _, _) => FileSource::Inline(data),
            (_, Some(remote), _) => FileSource::Remote(remote),
            (_, _, Some(local)) => FileSource::Local(local),
            (None, None, None) => return Err(DomainError::MissingFileSource { path }),
        };

        Ok(Self { path, source })
    }
}
