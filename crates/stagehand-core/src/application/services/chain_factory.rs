//! Executor Chain Factory.
//!
//! Merges the builders of every action category, orders them by priority,
//! materializes each one and composes the result into a single executor.

use std::sync::Arc;

use tracing::{info, instrument};

use crate::application::ports::Executor;
use crate::application::services::builder::{BuilderSource, ExecutorBuilder};
use crate::application::services::chain::{Chain, NamedStep, PreprocessingChain, Preprocessors};
use crate::error::{Context, StagehandResult};

/// Wraps the ordered executors into the final runnable.
pub type ChainComposer = Box<dyn FnOnce(Vec<Box<dyn Executor>>) -> Box<dyn Executor> + Send>;

pub struct ExecutorChainFactory {
    sources: Vec<Box<dyn BuilderSource>>,
    dry_run: bool,
    compose: ChainComposer,
}

impl ExecutorChainFactory {
    /// Factory composing a plain sequential [`Chain`].
    pub fn new(sources: Vec<Box<dyn BuilderSource>>, dry_run: bool) -> Self {
        Self {
            sources,
            dry_run,
            compose: Box::new(|executors| Box::new(Chain::new(executors))),
        }
    }

    /// Replace the composition function.
    pub fn with_composer<F>(mut self, compose: F) -> Self
    where
        F: FnOnce(Vec<Box<dyn Executor>>) -> Box<dyn Executor> + Send + 'static,
    {
        self.compose = Box::new(compose);
        self
    }

    /// Compose a [`PreprocessingChain`] draining `preprocessors` first.
    pub fn with_preprocessors(self, preprocessors: Arc<Preprocessors>) -> Self {
        self.with_composer(move |executors| {
            Box::new(PreprocessingChain::new(preprocessors, executors))
        })
    }

    /// Build the composite executor.
    ///
    /// Any builder failure aborts construction; no partial chain is returned.
    #[instrument(skip_all, fields(dry_run = self.dry_run))]
    pub fn create(self) -> StagehandResult<Box<dyn Executor>> {
        let mut builders: Vec<ExecutorBuilder> = Vec::new();
        for source in self.sources {
            builders.extend(source.into_builders(self.dry_run));
        }

        // Vec::sort_by_key is stable: equal priorities keep discovery order.
        builders.sort_by_key(|b| b.priority);

        let order: Vec<String> = builders
            .iter()
            .map(|b| format!("'{}':'{}'", b.priority, b.name))
            .collect();
        info!("actions to execute [{}]", order.join(", "));

        let mut executors: Vec<Box<dyn Executor>> = Vec::with_capacity(builders.len());
        for builder in builders {
            let name = builder.name.clone();
            let built = builder
                .build()
                .with_context(|| format!("configure executor [{name}]"))?;
            if let Some(executor) = built {
                executors.push(Box::new(NamedStep::new(name, executor)));
            }
        }

        Ok((self.compose)(executors))
    }
}
