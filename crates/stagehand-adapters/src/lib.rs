//! Infrastructure adapters for Stagehand.
//!
//! This crate implements the ports defined in
//! `stagehand-core::application::ports` and the executors behind every
//! action category. It owns all process, network and disk access.
//!
//! [`pipeline::build_chain`] wires everything into one executor.

pub mod executor;
pub mod file;
pub mod filesystem;
pub mod fs_tree;
pub mod http;
pub mod pipeline;
pub mod renderer;
pub mod source;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use http::HttpSettings;
pub use pipeline::{EngineSettings, build_chain};
pub use renderer::TemplateEngine;
pub use source::{DiskSource, EmbeddedSource};
