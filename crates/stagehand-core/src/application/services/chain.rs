//! Sequential fail-fast chains.

use std::sync::{Arc, RwLock};

use tracing::{debug, info};

use crate::application::ApplicationError;
use crate::application::ports::{Executor, Preprocessor};
use crate::error::{Context, StagehandResult};

/// Runs executors in order and stops at the first error.
pub struct Chain {
    executors: Vec<Box<dyn Executor>>,
}

impl Chain {
    pub fn new(executors: Vec<Box<dyn Executor>>) -> Self {
        Self { executors }
    }

    pub fn len(&self) -> usize {
        self.executors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.executors.is_empty()
    }
}

impl Executor for Chain {
    fn exec(&self) -> StagehandResult<()> {
        for (i, executor) in self.executors.iter().enumerate() {
            executor
                .exec()
                .with_context(|| format!("execute proc [{i}]"))?;
        }
        Ok(())
    }
}

/// An executor labelled with the action it was built from.
pub struct NamedStep {
    name: String,
    inner: Box<dyn Executor>,
}

impl NamedStep {
    pub fn new(name: impl Into<String>, inner: Box<dyn Executor>) -> Self {
        Self {
            name: name.into(),
            inner,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Executor for NamedStep {
    fn exec(&self) -> StagehandResult<()> {
        info!(action = %self.name, "run action");
        self.inner
            .exec()
            .with_context(|| format!("action [{}]", self.name))
    }
}

/// Registry of steps that must complete before the chain runs.
///
/// Builders register into it while the chain is being created; the
/// preprocessing chain drains it when executed.
#[derive(Default)]
pub struct Preprocessors {
    items: RwLock<Vec<Arc<dyn Preprocessor>>>,
}

impl Preprocessors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, preprocessor: Arc<dyn Preprocessor>) -> StagehandResult<()> {
        let mut items = self
            .items
            .write()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "preprocessors",
            })?;
        items.push(preprocessor);
        Ok(())
    }

    pub fn get(&self) -> StagehandResult<Vec<Arc<dyn Preprocessor>>> {
        let items = self
            .items
            .read()
            .map_err(|_| ApplicationError::LockPoisoned {
                resource: "preprocessors",
            })?;
        Ok(items.clone())
    }
}

/// Runs every registered preprocessor, then the chain.
pub struct PreprocessingChain {
    preprocessors: Arc<Preprocessors>,
    chain: Chain,
}

impl PreprocessingChain {
    pub fn new(preprocessors: Arc<Preprocessors>, executors: Vec<Box<dyn Executor>>) -> Self {
        Self {
            preprocessors,
            chain: Chain::new(executors),
        }
    }
}

impl Executor for PreprocessingChain {
    fn exec(&self) -> StagehandResult<()> {
        let preprocessors = self.preprocessors.get()?;
        debug!(count = preprocessors.len(), "run preprocessors");
        for (i, preprocessor) in preprocessors.iter().enumerate() {
            preprocessor
                .process()
                .with_context(|| format!("preprocess [{i}]"))?;
        }
        self.chain.exec()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::application::ports::{MockExecutor, MockPreprocessor};
    use crate::domain::DomainError;

    fn recording(log: &Arc<Mutex<Vec<String>>>, label: &str) -> Box<dyn Executor> {
        let log = Arc::clone(log);
        let label = label.to_owned();
        let mut exec = MockExecutor::new();
        exec.expect_exec().times(1).returning(move || {
            log.lock().unwrap().push(label.clone());
            Ok(())
        });
        Box::new(exec)
    }

    #[test]
    fn chain_stops_at_first_error() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut failing = MockExecutor::new();
        failing
            .expect_exec()
            .times(1)
            .returning(|| Err(DomainError::EmptyFilePath.into()));
        let mut never = MockExecutor::new();
        never.expect_exec().never();

        let chain = Chain::new(vec![
            recording(&log, "first"),
            Box::new(NamedStep::new("broken", Box::new(failing))),
            Box::new(never),
        ]);

        let err = chain.exec().unwrap_err();
        assert_eq!(*log.lock().unwrap(), vec!["first"]);
        assert_eq!(
            err.to_string(),
            "execute proc [1]: action [broken]: file path is empty"
        );
    }

    #[test]
    fn preprocessors_run_before_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let registry = Arc::new(Preprocessors::new());

        let pre_log = Arc::clone(&log);
        let mut pre = MockPreprocessor::new();
        pre.expect_process().times(1).returning(move || {
            pre_log.lock().unwrap().push("preload".to_owned());
            Ok(())
        });
        registry.add(Arc::new(pre)).unwrap();

        let chain = PreprocessingChain::new(Arc::clone(&registry), vec![recording(&log, "step")]);
        chain.exec().unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["preload", "step"]);
    }

    #[test]
    fn failing_preprocessor_skips_chain() {
        let registry = Arc::new(Preprocessors::new());
        let mut pre = MockPreprocessor::new();
        pre.expect_process()
            .returning(|| Err(ApplicationError::PreloadExhausted.into()));
        registry.add(Arc::new(pre)).unwrap();

        let mut never = MockExecutor::new();
        never.expect_exec().never();
        let chain = PreprocessingChain::new(registry, vec![Box::new(never)]);

        assert!(chain.exec().is_err());
    }
}
