//! Stagehand Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Stagehand
//! action engine: a declarative list of scaffolding actions (directories,
//! files, commands, tree rewrites, removals) is turned into one ordered,
//! fail-fast execution pipeline.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          stagehand-cli (CLI)            │
//! │   (parses the action file, flags)       │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │  stagehand-adapters::pipeline           │
//! │  (per-category executor factories)      │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │ (ExecutorChainFactory, Chain, filters)  │
//! └──────────────────┬──────────────────────┘
//!                    │ defined against
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │ (Executor, FileProducer, FileStrategy,  │
//! │  Filesystem, TemplateRenderer, ...)     │
//! └──────────────────┬──────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (Action, FileDescriptor, Command)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use stagehand_core::prelude::*;
//!
//! fn run(sources: Vec<Box<dyn BuilderSource>>, dry_run: bool) -> StagehandResult<()> {
//!     let chain = ExecutorChainFactory::new(sources, dry_run).create()?;
//!     chain.exec()
//! }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        AcceptAll, ActionBuilderFactory, ActionFilter, ActionPlan, BuilderSource, Chain,
        ExecutorBuilder, ExecutorChainFactory, PreprocessingChain, Preprocessors,
        SelectionFilter, TargetFilesystem,
        ports::{
            Executor, FileProducer, FileStrategy, Filesystem, Preprocessor, SourceTree,
            TemplateRenderer,
        },
    };
    pub use crate::domain::{
        Action, Command, CommandSet, FileDescriptor, FileInfo, FileSource, MissingKey,
        RemoteSource, TemplateOptions, UndefinedFile,
    };
    pub use crate::error::{Context, StagehandError, StagehandResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tracing target used for every dry-run report.
///
/// Subscribers enable this target explicitly so dry-run output is shown
/// regardless of the global verbosity.
pub const DRY_RUN_TARGET: &str = "stagehand::dry_run";
