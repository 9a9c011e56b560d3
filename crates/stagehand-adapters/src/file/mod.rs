//! File production pipeline: producers resolve bytes, strategies transform
//! and persist them.

mod executor;
mod preload;
mod producers;
mod strategies;

pub use executor::{FilesExecutor, apply_strategies};
pub use preload::PreloadProducer;
pub use producers::{InlineProducer, LocalProducer, RemoteProducer};
pub use strategies::{
    DryRunDirStrategy, DryRunFileStrategy, MkdirAllStrategy, ReplacePathStrategy, SaveStrategy,
    TemplateStrategy,
};
