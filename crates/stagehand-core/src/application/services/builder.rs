//! Deferred executor construction.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::application::filter::ActionFilter;
use crate::application::ports::Executor;
use crate::domain::Action;
use crate::error::StagehandResult;

type BuildFn = Box<dyn FnOnce() -> StagehandResult<Option<Box<dyn Executor>>> + Send>;

/// A lazily evaluated unit of work.
///
/// Building may fail, may register side-channel state (a preload step), and
/// may yield no executor at all for an empty action.
pub struct ExecutorBuilder {
    pub name: String,
    pub priority: i32,
    build: BuildFn,
}

impl ExecutorBuilder {
    pub fn new<F>(name: impl Into<String>, priority: i32, build: F) -> Self
    where
        F: FnOnce() -> StagehandResult<Option<Box<dyn Executor>>> + Send + 'static,
    {
        Self {
            name: name.into(),
            priority,
            build: Box::new(build),
        }
    }

    pub fn build(self) -> StagehandResult<Option<Box<dyn Executor>>> {
        (self.build)()
    }
}

impl fmt::Debug for ExecutorBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorBuilder")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .finish_non_exhaustive()
    }
}

/// A per-category source of executor builders.
pub trait BuilderSource: Send {
    /// Yield one builder per action that passes the filter.
    fn into_builders(self: Box<Self>, dry_run: bool) -> Vec<ExecutorBuilder>;
}

/// Turns the values of one action into an executor.
///
/// `Ok(None)` means the action has nothing to do.
pub trait ActionConsumer<T>: Send + Sync {
    fn consume(&self, values: Vec<T>) -> StagehandResult<Option<Box<dyn Executor>>>;
}

impl<T, F> ActionConsumer<T> for F
where
    F: Fn(Vec<T>) -> StagehandResult<Option<Box<dyn Executor>>> + Send + Sync,
{
    fn consume(&self, values: Vec<T>) -> StagehandResult<Option<Box<dyn Executor>>> {
        self(values)
    }
}

/// Builder source for one action category.
///
/// Holds a regular consumer and a dry-run consumer; the chain factory's
/// dry-run flag picks between them.
pub struct ActionBuilderFactory<T> {
    actions: Vec<Action<T>>,
    consumer: Arc<dyn ActionConsumer<T>>,
    dry_run_consumer: Arc<dyn ActionConsumer<T>>,
    filter: Arc<dyn ActionFilter>,
}

impl<T: Send + 'static> ActionBuilderFactory<T> {
    pub fn new(
        actions: Vec<Action<T>>,
        consumer: Arc<dyn ActionConsumer<T>>,
        dry_run_consumer: Arc<dyn ActionConsumer<T>>,
        filter: Arc<dyn ActionFilter>,
    ) -> Self {
        Self {
            actions,
            consumer,
            dry_run_consumer,
            filter,
        }
    }
}

impl<T: Send + 'static> BuilderSource for ActionBuilderFactory<T> {
    fn into_builders(self: Box<Self>, dry_run: bool) -> Vec<ExecutorBuilder> {
        let consumer = if dry_run {
            self.dry_run_consumer
        } else {
            self.consumer
        };

        let mut builders = Vec::with_capacity(self.actions.len());
        for action in self.actions {
            if !self.filter.matches(&action.name) {
                continue;
            }
            debug!(action = %action.name, priority = action.priority, "builder created");
            let consumer = Arc::clone(&consumer);
            let values = action.values;
            builders.push(ExecutorBuilder::new(
                action.name,
                action.priority,
                move || consumer.consume(values),
            ));
        }
        builders
    }
}
