//! Concurrent prefetch of every file of an action.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;

use stagehand_core::{
    application::{
        ApplicationError,
        ports::{FileProducer, Preprocessor},
    },
    domain::FileDescriptor,
    error::{StagehandError, StagehandResult},
};
use tracing::{debug, info};

use super::InlineProducer;

/// Wraps the producers of one file action.
///
/// As a [`Preprocessor`], `process` fetches every producer concurrently (one
/// thread per producer) and replaces the list with inline producers holding
/// the results in declaration order. As a [`FileProducer`], `get` pops the
/// front of the list.
///
/// `process` must complete before the first `get`; nothing enforces this
/// beyond the preprocessing chain running preprocessors first.
pub struct PreloadProducer {
    producers: Mutex<VecDeque<Arc<dyn FileProducer>>>,
}

impl PreloadProducer {
    pub fn new(producers: Vec<Arc<dyn FileProducer>>) -> Self {
        Self {
            producers: Mutex::new(producers.into()),
        }
    }

    pub fn len(&self) -> StagehandResult<usize> {
        Ok(self.lock()?.len())
    }

    pub fn is_empty(&self) -> StagehandResult<bool> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> StagehandResult<MutexGuard<'_, VecDeque<Arc<dyn FileProducer>>>> {
        self.producers
            .lock()
            .map_err(|_| ApplicationError::LockPoisoned { resource: "preload" }.into())
    }

    /// Fetches every producer on its own scoped thread.
    ///
    /// The first failure is returned once every in-flight fetch has
    /// finished; later results are discarded.
    fn fetch_all(producers: Vec<Arc<dyn FileProducer>>) -> StagehandResult<Vec<FileDescriptor>> {
        let total = producers.len();
        let (tx, rx) = mpsc::channel::<(usize, StagehandResult<FileDescriptor>)>();

        type Fetched = Vec<(usize, FileDescriptor)>;
        let mut fetched = thread::scope(|scope| -> StagehandResult<Fetched> {
            let mut handles = Vec::with_capacity(total);
            for (index, producer) in producers.iter().enumerate() {
                let tx = tx.clone();
                let handle = thread::Builder::new()
                    .name(format!("preload-{index}"))
                    .spawn_scoped(scope, move || {
                        let _ = tx.send((index, producer.get()));
                    })
                    .map_err(|e| StagehandError::Internal {
                        message: format!("spawn preload thread: {e}"),
                    })?;
                handles.push(handle);
            }
            drop(tx);

            let mut fetched = Vec::with_capacity(total);
            let mut failure = None;
            for (index, result) in rx.iter() {
                match result {
                    Ok(file) => fetched.push((index, file)),
                    Err(e) => {
                        failure = Some(StagehandError::Context {
                            context: format!("preload file [{index}]"),
                            source: Box::new(e),
                        });
                        break;
                    }
                }
            }

            let panicked = handles
                .into_iter()
                .map(|handle| handle.join())
                .filter(Result::is_err)
                .count();
            if let Some(err) = failure {
                return Err(err);
            }
            if panicked > 0 || fetched.len() != total {
                return Err(StagehandError::Internal {
                    message: format!("preload finished {} of {} fetches", fetched.len(), total),
                });
            }
            Ok(fetched)
        })?;

        fetched.sort_by_key(|(index, _)| *index);
        Ok(fetched.into_iter().map(|(_, file)| file).collect())
    }
}

impl Preprocessor for PreloadProducer {
    fn process(&self) -> StagehandResult<()> {
        let producers: Vec<_> = self.lock()?.iter().cloned().collect();
        debug!(count = producers.len(), "preload started");

        let files = Self::fetch_all(producers)?;
        for file in &files {
            info!(path = %file.path().display(), "file preloaded");
        }

        let mut guard = self.lock()?;
        *guard = files
            .into_iter()
            .map(|file| Arc::new(InlineProducer::new(file)) as Arc<dyn FileProducer>)
            .collect();
        Ok(())
    }
}

impl FileProducer for PreloadProducer {
    fn get(&self) -> StagehandResult<FileDescriptor> {
        let next = self.lock()?.pop_front();
        match next {
            Some(producer) => producer.get(),
            None => Err(ApplicationError::PreloadExhausted.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    /// Sleeps so that higher indices finish first, and records how often
    /// it was fetched.
    struct Delayed {
        index: usize,
        delay: Duration,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl FileProducer for Delayed {
        fn get(&self) -> StagehandResult<FileDescriptor> {
            thread::sleep(self.delay);
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ApplicationError::HttpStatus {
                    url: format!("https://example.com/{}", self.index),
                    status: 500,
                }
                .into());
            }
            Ok(FileDescriptor::new(
                format!("file-{}.txt", self.index),
                self.index.to_string(),
            ))
        }
    }

    fn producers(count: usize, calls: &Arc<AtomicUsize>, failing: Option<usize>) -> Vec<Arc<dyn FileProducer>> {
        (0..count)
            .map(|index| {
                Arc::new(Delayed {
                    index,
                    delay: Duration::from_millis(((count - index) * 15) as u64),
                    calls: Arc::clone(calls),
                    fail: failing == Some(index),
                }) as Arc<dyn FileProducer>
            })
            .collect()
    }

    #[test]
    fn get_returns_declaration_order_after_concurrent_fetch() {
        let calls = Arc::new(AtomicUsize::new(0));
        let preload = PreloadProducer::new(producers(10, &calls, None));

        preload.process().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 10);

        let paths: Vec<PathBuf> = (0..10)
            .map(|_| preload.get().unwrap().path().to_path_buf())
            .collect();
        let expected: Vec<PathBuf> = (0..10)
            .map(|i| PathBuf::from(format!("file-{i}.txt")))
            .collect();
        assert_eq!(paths, expected);

        // Content is served from memory: no further fetches.
        assert_eq!(calls.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn get_past_the_end_is_an_error() {
        let calls = Arc::new(AtomicUsize::new(0));
        let preload = PreloadProducer::new(producers(1, &calls, None));
        preload.process().unwrap();

        preload.get().unwrap();
        let err = preload.get().unwrap_err();
        assert!(matches!(
            err,
            StagehandError::Application(ApplicationError::PreloadExhausted)
        ));
    }

    #[test]
    fn first_failure_aborts_and_keeps_original_producers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let preload = PreloadProducer::new(producers(4, &calls, Some(2)));

        let err = preload.process().unwrap_err();
        assert!(err.to_string().starts_with("preload file [2]"));
        assert_eq!(preload.len().unwrap(), 4);
    }

    #[test]
    fn failure_returns_after_every_fetch_finished() {
        let calls = Arc::new(AtomicUsize::new(0));
        // index 3 fails first; index 0 is still sleeping when it does
        let preload = PreloadProducer::new(producers(4, &calls, Some(3)));

        let err = preload.process().unwrap_err();

        assert!(err.to_string().starts_with("preload file [3]"), "{err}");
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn processing_empty_list_is_a_no_op() {
        let preload = PreloadProducer::new(Vec::new());
        preload.process().unwrap();
        assert!(preload.is_empty().unwrap());
    }
}
