//! Executor for one file action.

use std::sync::Arc;

use stagehand_core::{
    application::ports::{Executor, FileProducer, FileStrategy},
    domain::FileDescriptor,
    error::{Context, StagehandResult},
};

/// Run `file` through `strategies` in order.
pub fn apply_strategies(
    file: FileDescriptor,
    strategies: &[Arc<dyn FileStrategy>],
) -> StagehandResult<FileDescriptor> {
    let mut file = file;
    for strategy in strategies {
        let path = file.path().display().to_string();
        file = strategy
            .apply(file)
            .with_context(|| format!("process file [{path}]"))?;
    }
    Ok(file)
}

/// Fetches every file of an action and applies the strategy chain to each.
pub struct FilesExecutor {
    producers: Vec<Arc<dyn FileProducer>>,
    strategies: Vec<Arc<dyn FileStrategy>>,
}

impl FilesExecutor {
    pub fn new(producers: Vec<Arc<dyn FileProducer>>, strategies: Vec<Arc<dyn FileStrategy>>) -> Self {
        Self {
            producers,
            strategies,
        }
    }
}

impl Executor for FilesExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for (i, producer) in self.producers.iter().enumerate() {
            let file = producer.get().with_context(|| format!("get file [{i}]"))?;
            apply_strategies(file, &self.strategies)?;
        }
        Ok(())
    }
}
