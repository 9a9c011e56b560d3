//! Wires every action category into one executor.
//!
//! This is the embedding entry point: hand it an [`ActionPlan`] and
//! [`EngineSettings`], get back the composite executor.
//!
//! ```rust,no_run
//! use stagehand_adapters::pipeline::{EngineSettings, build_chain};
//! use stagehand_core::prelude::*;
//!
//! let mut plan = ActionPlan::default();
//! plan.dirs.push(Action::new(0, "layout", vec!["src".into()]));
//!
//! let chain = build_chain(plan, EngineSettings::default())?;
//! chain.exec()?;
//! # Ok::<(), StagehandError>(())
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use stagehand_core::{
    application::{
        AcceptAll, ActionBuilderFactory, ActionConsumer, ActionFilter, ActionPlan,
        ApplicationError, BuilderSource, ExecutorChainFactory, Preprocessors, TargetFilesystem,
        ports::{
            Executor, FileProducer, FileStrategy, Filesystem, Preprocessor, TemplateRenderer,
        },
    },
    domain::{CommandSet, FileDescriptor, FileSource, TemplateOptions, UndefinedFile},
    error::StagehandResult,
};
use tracing::debug;

use crate::executor::{
    CommandListExecutor, DryRunCommandExecutor, DryRunRemoveExecutor, MkdirExecutor,
    RemoveExecutor,
};
use crate::file::{
    DryRunDirStrategy, DryRunFileStrategy, FilesExecutor, InlineProducer, LocalProducer,
    MkdirAllStrategy, PreloadProducer, RemoteProducer, SaveStrategy, TemplateStrategy,
};
use crate::filesystem::LocalFilesystem;
use crate::fs_tree::{FsModifyExecutor, FsSaveExecutor, ModifyTree};
use crate::http::{HttpSettings, LazyHttpClient};
use crate::renderer::TemplateEngine;

/// Everything a run needs besides the actions themselves.
#[derive(Clone)]
pub struct EngineSettings {
    /// Log every effect instead of performing it.
    pub dry_run: bool,
    /// Fetch the content of every file action concurrently before the
    /// first action runs.
    pub preload: bool,
    /// Template variables.
    pub vars: Value,
    /// Template options such as `missingkey=error`.
    pub template_options: Vec<String>,
    pub http: HttpSettings,
    pub filter: Arc<dyn ActionFilter>,
    pub fs: Arc<dyn Filesystem>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            dry_run: false,
            preload: false,
            vars: Value::Object(Default::default()),
            template_options: Vec::new(),
            http: HttpSettings::default(),
            filter: Arc::new(AcceptAll),
            fs: Arc::new(LocalFilesystem::new()),
        }
    }
}

type Built = StagehandResult<Option<Box<dyn Executor>>>;

fn consumer<T, F>(f: F) -> Arc<dyn ActionConsumer<T>>
where
    T: 'static,
    F: Fn(Vec<T>) -> Built + Send + Sync + 'static,
{
    Arc::new(f)
}

fn some(executor: impl Executor + 'static) -> Built {
    Ok(Some(Box::new(executor)))
}

/// Build the composite executor for `plan`.
///
/// Construction errors (a bad template option, a file action that cannot
/// be wired) surface here, before anything runs.
pub fn build_chain(plan: ActionPlan, settings: EngineSettings) -> StagehandResult<Box<dyn Executor>> {
    let options = TemplateOptions::parse(&settings.template_options)?;
    let renderer: Arc<dyn TemplateRenderer> =
        Arc::new(TemplateEngine::new(settings.vars.clone(), options));
    let preprocessors = settings.preload.then(|| Arc::new(Preprocessors::new()));
    let fs = Arc::clone(&settings.fs);
    let filter = Arc::clone(&settings.filter);

    debug!(actions = plan.len(), dry_run = settings.dry_run, preload = settings.preload, "building chain");

    let mut sources: Vec<Box<dyn BuilderSource>> = Vec::new();

    let mkdir_fs = Arc::clone(&fs);
    sources.push(Box::new(ActionBuilderFactory::new(
        plan.dirs,
        consumer(move |dirs: Vec<PathBuf>| {
            if dirs.is_empty() {
                return Ok(None);
            }
            some(MkdirExecutor::new(dirs, Arc::new(MkdirAllStrategy::new(Arc::clone(&mkdir_fs)))))
        }),
        consumer(|dirs: Vec<PathBuf>| {
            if dirs.is_empty() {
                return Ok(None);
            }
            some(MkdirExecutor::new(dirs, Arc::new(DryRunDirStrategy)))
        }),
        Arc::clone(&filter),
    )));

    let rm_fs = Arc::clone(&fs);
    sources.push(Box::new(ActionBuilderFactory::new(
        plan.rm,
        consumer(move |paths: Vec<String>| {
            if paths.is_empty() {
                return Ok(None);
            }
            some(RemoveExecutor::new(paths, Arc::clone(&rm_fs)))
        }),
        consumer(|paths: Vec<String>| {
            if paths.is_empty() {
                return Ok(None);
            }
            some(DryRunRemoveExecutor::new(paths))
        }),
        Arc::clone(&filter),
    )));

    sources.push(Box::new(ActionBuilderFactory::new(
        plan.commands,
        consumer(|sets: Vec<CommandSet>| {
            if sets.is_empty() {
                return Ok(None);
            }
            some(CommandListExecutor::new(sets))
        }),
        consumer(|sets: Vec<CommandSet>| {
            if sets.is_empty() {
                return Ok(None);
            }
            some(DryRunCommandExecutor::new(sets))
        }),
        Arc::clone(&filter),
    )));

    let files = FilesConsumer {
        fs: Arc::clone(&fs),
        renderer: Arc::clone(&renderer),
        http: settings.http.clone(),
        preprocessors: preprocessors.clone(),
        preload: settings.preload,
    };
    sources.push(Box::new(ActionBuilderFactory::new(
        plan.files,
        Arc::new(files.clone().writing()),
        Arc::new(files.reporting()),
        Arc::clone(&filter),
    )));

    let (modify_fs, modify_renderer) = (Arc::clone(&fs), Arc::clone(&renderer));
    let (dry_fs, dry_renderer) = (Arc::clone(&fs), Arc::clone(&renderer));
    sources.push(Box::new(ActionBuilderFactory::new(
        plan.fs_modify,
        consumer(move |roots: Vec<PathBuf>| {
            if roots.is_empty() {
                return Ok(None);
            }
            let tree = ModifyTree::new(Arc::clone(&modify_renderer), Arc::clone(&modify_fs));
            some(FsModifyExecutor::new(roots, Arc::new(tree)))
        }),
        consumer(move |roots: Vec<PathBuf>| {
            if roots.is_empty() {
                return Ok(None);
            }
            let tree = ModifyTree::dry_run(Arc::clone(&dry_renderer), Arc::clone(&dry_fs));
            some(FsModifyExecutor::new(roots, Arc::new(tree)))
        }),
        Arc::clone(&filter),
    )));

    let (save_fs, save_renderer) = (Arc::clone(&fs), Arc::clone(&renderer));
    let (dry_save_fs, dry_save_renderer) = (Arc::clone(&fs), Arc::clone(&renderer));
    sources.push(Box::new(ActionBuilderFactory::new(
        plan.fs_save,
        consumer(move |targets: Vec<TargetFilesystem>| {
            if targets.is_empty() {
                return Ok(None);
            }
            some(FsSaveExecutor::new(
                targets,
                Arc::clone(&save_renderer),
                Arc::clone(&save_fs),
                false,
            ))
        }),
        consumer(move |targets: Vec<TargetFilesystem>| {
            if targets.is_empty() {
                return Ok(None);
            }
            some(FsSaveExecutor::new(
                targets,
                Arc::clone(&dry_save_renderer),
                Arc::clone(&dry_save_fs),
                true,
            ))
        }),
        filter,
    )));

    let mut factory = ExecutorChainFactory::new(sources, settings.dry_run);
    if let Some(preprocessors) = preprocessors {
        factory = factory.with_preprocessors(preprocessors);
    }
    factory.create()
}

/// Consumer for file actions.
#[derive(Clone)]
struct FilesConsumer {
    fs: Arc<dyn Filesystem>,
    renderer: Arc<dyn TemplateRenderer>,
    http: HttpSettings,
    preprocessors: Option<Arc<Preprocessors>>,
    preload: bool,
}

/// A [`FilesConsumer`] with its sink strategy chosen.
struct FilesSink {
    files: FilesConsumer,
    sink: Arc<dyn FileStrategy>,
}

impl FilesConsumer {
    fn writing(self) -> FilesSink {
        let sink = Arc::new(SaveStrategy::new(Arc::clone(&self.fs)));
        FilesSink { files: self, sink }
    }

    fn reporting(self) -> FilesSink {
        FilesSink {
            files: self,
            sink: Arc::new(DryRunFileStrategy),
        }
    }

    fn producers(&self, files: Vec<UndefinedFile>) -> StagehandResult<Vec<Arc<dyn FileProducer>>> {
        // one client per action, created on the first remote fetch
        let client = Arc::new(LazyHttpClient::new(self.http.clone()));
        let producers: Vec<Arc<dyn FileProducer>> = files
            .into_iter()
            .map(|file| -> Arc<dyn FileProducer> {
                match file.source {
                    FileSource::Inline(data) => {
                        Arc::new(InlineProducer::new(FileDescriptor::new(&file.path, data)))
                    }
                    FileSource::Local(source) => {
                        Arc::new(LocalProducer::new(file.path, source, Arc::clone(&self.fs)))
                    }
                    FileSource::Remote(remote) => {
                        Arc::new(RemoteProducer::new(file.path, remote, Arc::clone(&client)))
                    }
                }
            })
            .collect();

        if !self.preload {
            return Ok(producers);
        }
        let registry = self
            .preprocessors
            .as_ref()
            .ok_or(ApplicationError::PreloadNotConfigured)?;
        let count = producers.len();
        let preload = Arc::new(PreloadProducer::new(producers));
        registry.add(Arc::clone(&preload) as Arc<dyn Preprocessor>)?;
        Ok((0..count)
            .map(|_| Arc::clone(&preload) as Arc<dyn FileProducer>)
            .collect())
    }
}

impl ActionConsumer<UndefinedFile> for FilesSink {
    fn consume(&self, files: Vec<UndefinedFile>) -> Built {
        if files.is_empty() {
            return Ok(None);
        }
        let producers = self.files.producers(files)?;
        let strategies: Vec<Arc<dyn FileStrategy>> = vec![
            Arc::new(TemplateStrategy::new(Arc::clone(&self.files.renderer))),
            Arc::clone(&self.sink),
        ];
        some(FilesExecutor::new(producers, strategies))
    }
}
