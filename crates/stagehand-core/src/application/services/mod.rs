//! Application services - turn actions into one runnable chain.
//!
//! - `builder`: deferred executor construction, one builder per action
//! - `chain`: sequential fail-fast chains and the preprocessor registry
//! - `chain_factory`: merges, orders and materializes every builder

pub mod builder;
pub mod chain;
pub mod chain_factory;

pub use builder::{ActionBuilderFactory, ActionConsumer, BuilderSource, ExecutorBuilder};
pub use chain::{Chain, NamedStep, PreprocessingChain, Preprocessors};
pub use chain_factory::{ChainComposer, ExecutorChainFactory};
