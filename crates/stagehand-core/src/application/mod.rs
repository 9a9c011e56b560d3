//! Application layer for Stagehand.
//!
//! This layer contains:
//! - **Services**: executor builders, the chain factory and the chains it composes
//! - **Filter**: which actions take part in a run
//! - **Plan**: the typed per-category action lists handed to the engine
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! Process, network and disk access live behind the ports and are provided
//! by `stagehand-adapters`.

pub mod error;
pub mod filter;
pub mod plan;
pub mod ports;
pub mod services;

pub use services::{
    ActionBuilderFactory, ActionConsumer, BuilderSource, Chain, ChainComposer, ExecutorBuilder,
    ExecutorChainFactory, NamedStep, PreprocessingChain, Preprocessors,
};

pub use filter::{AcceptAll, ActionFilter, ActionSelection, SelectionFilter};
pub use plan::{ActionKind, ActionPlan, PlannedStep, TargetFilesystem};

pub use ports::{
    DirStrategy, Executor, FileProducer, FileStrategy, Filesystem, Preprocessor, SourceEntry,
    SourceTree, TemplateRenderer,
};

pub use error::ApplicationError;
