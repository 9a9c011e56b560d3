//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `stagehand-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Runnable units**: `Executor`, `Preprocessor`
//! - **File pipeline**: `FileProducer`, `FileStrategy`, `DirStrategy`
//! - **Infrastructure**: `Filesystem`, `TemplateRenderer`, `SourceTree`

pub mod output;

pub use output::{
    DirStrategy, Executor, FileProducer, FileStrategy, Filesystem, Preprocessor, SourceEntry,
    SourceTree, TemplateRenderer,
};

#[cfg(test)]
pub use output::{
    MockDirStrategy, MockExecutor, MockFileProducer, MockFileStrategy, MockFilesystem,
    MockPreprocessor, MockTemplateRenderer,
};
