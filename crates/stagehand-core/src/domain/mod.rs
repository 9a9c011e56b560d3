//! Core domain layer for Stagehand.
//!
//! This module contains the pure data model of the engine with no I/O:
//! prioritized action batches, file descriptors and their declared sources,
//! commands, and template options.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or process calls
//! - **Immutable values**: constructors validate, values are not mutated after
pub mod action;
pub mod command;
pub mod error;
pub mod file;
pub mod template;

pub use action::Action;
pub use command::{Command, CommandSet};
pub use error::{DomainError, ErrorCategory};
pub use file::{FileDescriptor, FileInfo, FileSource, RemoteSource, UndefinedFile};
pub use template::{MissingKey, TemplateOptions};
