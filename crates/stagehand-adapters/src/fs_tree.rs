//! Templated rewriting of whole directory trees.
//!
//! Every entry path below the root is rendered as a template, so entries can
//! be renamed or relocated; every file's content is rendered too.
//!
//! - [`ModifyTree`] rewrites a tree in place and removes the entries it
//!   moved away from.
//! - [`SaveTree`] copies a read-only [`SourceTree`] into a target directory.
//!
//! Both take their I/O behaviour from a [`DirStrategy`] and a sink
//! [`FileStrategy`], so the dry-run variants share the walk and the template
//! errors of the real ones.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use stagehand_core::{
    DRY_RUN_TARGET,
    application::{
        TargetFilesystem,
        ports::{
            DirStrategy, Executor, FileProducer, FileStrategy, Filesystem, SourceEntry,
            SourceTree, TemplateRenderer,
        },
    },
    domain::{DomainError, FileDescriptor},
    error::{Context, StagehandResult},
};
use tracing::{debug, info};

use crate::file::{
    DryRunDirStrategy, DryRunFileStrategy, LocalProducer, MkdirAllStrategy, ReplacePathStrategy,
    SaveStrategy, TemplateStrategy, apply_strategies,
};
use crate::source::DiskSource;

/// Rewrites the tree rooted at a directory.
pub trait TreeTransformer: Send + Sync {
    /// Returns the root it was applied to.
    fn apply(&self, root: &Path) -> StagehandResult<PathBuf>;
}

/// An entry of the walked tree with its rendered location.
#[derive(Debug)]
struct Relocation {
    entry: SourceEntry,
    target: PathBuf,
}

/// Joins a rendered entry path onto `root` without ever leaving it.
///
/// Leading separators are dropped, so a blank first segment stays inside
/// the tree. Parent segments and drive prefixes are rejected, as is a file
/// whose whole path renders blank.
fn confine(
    root: &Path,
    template: &str,
    rendered: &str,
    is_dir: bool,
) -> Result<PathBuf, DomainError> {
    let unsafe_path = |reason| DomainError::UnsafeRenderedPath {
        template: template.to_owned(),
        rendered: rendered.to_owned(),
        reason,
    };

    let mut target = root.to_path_buf();
    for component in Path::new(rendered).components() {
        match component {
            Component::Normal(part) => target.push(part),
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => return Err(unsafe_path("leaves the tree root")),
            Component::Prefix(_) => return Err(unsafe_path("is absolute")),
        }
    }
    if !is_dir && target == root {
        return Err(unsafe_path("names no file"));
    }
    Ok(target)
}

/// Shared parts of both transformers.
struct TreeWriter {
    renderer: Arc<dyn TemplateRenderer>,
    dirs: Arc<dyn DirStrategy>,
    sink: Arc<dyn FileStrategy>,
}

impl TreeWriter {
    fn new(renderer: Arc<dyn TemplateRenderer>, fs: Arc<dyn Filesystem>, dry_run: bool) -> Self {
        let (dirs, sink): (Arc<dyn DirStrategy>, Arc<dyn FileStrategy>) = if dry_run {
            (Arc::new(DryRunDirStrategy), Arc::new(DryRunFileStrategy))
        } else {
            (
                Arc::new(MkdirAllStrategy::new(Arc::clone(&fs))),
                Arc::new(SaveStrategy::new(fs)),
            )
        };
        Self {
            renderer,
            dirs,
            sink,
        }
    }

    fn relocate(&self, root: &Path, entries: Vec<SourceEntry>) -> StagehandResult<Vec<Relocation>> {
        entries
            .into_iter()
            .map(|entry| {
                let relative = entry.path.to_string_lossy().into_owned();
                let rendered = self
                    .renderer
                    .render(&relative, &relative)
                    .with_context(|| format!("template path [{relative}]"))?;
                let target = confine(root, &relative, &rendered, entry.is_dir)?;
                Ok(Relocation { entry, target })
            })
            .collect()
    }

    /// Creates the target directory of every entry, each once.
    fn create_dirs(&self, root: &Path, relocations: &[Relocation]) -> StagehandResult<()> {
        let mut seen = HashSet::new();
        let wanted = relocations.iter().filter_map(|r| {
            if r.entry.is_dir {
                Some(r.target.as_path())
            } else {
                r.target.parent()
            }
        });
        for dir in std::iter::once(root).chain(wanted) {
            if seen.insert(dir.to_path_buf()) {
                self.dirs.apply(dir)?;
            }
        }
        Ok(())
    }

    fn write(&self, file: FileDescriptor, target: &Path) -> StagehandResult<()> {
        let strategies: [Arc<dyn FileStrategy>; 3] = [
            Arc::new(TemplateStrategy::new(Arc::clone(&self.renderer))),
            Arc::new(ReplacePathStrategy::new(target)),
            Arc::clone(&self.sink),
        ];
        apply_strategies(file, &strategies)?;
        Ok(())
    }
}

/// Rewrites a directory in place.
///
/// Entries whose rendered path differs from their current path are written
/// to the new location and then removed from the old one.
pub struct ModifyTree {
    writer: TreeWriter,
    fs: Arc<dyn Filesystem>,
    dry_run: bool,
}

impl ModifyTree {
    pub fn new(renderer: Arc<dyn TemplateRenderer>, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            writer: TreeWriter::new(renderer, Arc::clone(&fs), false),
            fs,
            dry_run: false,
        }
    }

    /// Renders paths and content but only reports what would change.
    pub fn dry_run(renderer: Arc<dyn TemplateRenderer>, fs: Arc<dyn Filesystem>) -> Self {
        Self {
            writer: TreeWriter::new(renderer, Arc::clone(&fs), true),
            fs,
            dry_run: true,
        }
    }

    fn cleanup(&self, root: &Path, relocations: &[Relocation]) -> StagehandResult<()> {
        let mut removed: Vec<PathBuf> = Vec::new();
        for relocation in relocations {
            let original = root.join(&relocation.entry.path);
            if relocation.target == original || removed.iter().any(|r| original.starts_with(r)) {
                continue;
            }
            if self.dry_run {
                info!(target: DRY_RUN_TARGET, "remove: {}", original.display());
            } else {
                self.fs.remove_all(&original)?;
                info!(path = %original.display(), "fs: remove");
            }
            removed.push(original);
        }
        Ok(())
    }
}

impl TreeTransformer for ModifyTree {
    fn apply(&self, root: &Path) -> StagehandResult<PathBuf> {
        let entries = DiskSource::new(root).entries()?;
        let relocations = self.writer.relocate(root, entries)?;
        debug!(root = %root.display(), entries = relocations.len(), "fs: tree walked");

        self.writer.create_dirs(root, &relocations)?;
        for relocation in relocations.iter().filter(|r| !r.entry.is_dir) {
            let original = root.join(&relocation.entry.path);
            let file = LocalProducer::new(&original, &original, Arc::clone(&self.fs)).get()?;
            self.writer.write(file, &relocation.target)?;
        }

        self.cleanup(root, &relocations)?;
        Ok(root.to_path_buf())
    }
}

/// Copies a read-only source tree into the directory it is applied to.
pub struct SaveTree {
    writer: TreeWriter,
    source: Arc<dyn SourceTree>,
}

impl SaveTree {
    pub fn new(
        source: Arc<dyn SourceTree>,
        renderer: Arc<dyn TemplateRenderer>,
        fs: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            writer: TreeWriter::new(renderer, fs, false),
            source,
        }
    }

    pub fn dry_run(
        source: Arc<dyn SourceTree>,
        renderer: Arc<dyn TemplateRenderer>,
        fs: Arc<dyn Filesystem>,
    ) -> Self {
        Self {
            writer: TreeWriter::new(renderer, fs, true),
            source,
        }
    }
}

impl TreeTransformer for SaveTree {
    fn apply(&self, root: &Path) -> StagehandResult<PathBuf> {
        let entries = self.source.entries()?;
        let relocations = self.writer.relocate(root, entries)?;

        self.writer.create_dirs(root, &relocations)?;
        for relocation in relocations.iter().filter(|r| !r.entry.is_dir) {
            let data = self.source.read(&relocation.entry.path)?;
            let file = FileDescriptor::new(&relocation.entry.path, data);
            self.writer.write(file, &relocation.target)?;
        }
        Ok(root.to_path_buf())
    }
}

/// Applies one transformer to each root of an `fs` action.
pub struct FsModifyExecutor {
    roots: Vec<PathBuf>,
    transformer: Arc<dyn TreeTransformer>,
}

impl FsModifyExecutor {
    pub fn new(roots: Vec<PathBuf>, transformer: Arc<dyn TreeTransformer>) -> Self {
        Self { roots, transformer }
    }
}

impl Executor for FsModifyExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for root in &self.roots {
            self.transformer
                .apply(root)
                .with_context(|| format!("fs [{}]", root.display()))?;
        }
        Ok(())
    }
}

/// Saves each source tree of an `fs_save` action into its target.
pub struct FsSaveExecutor {
    targets: Vec<TargetFilesystem>,
    renderer: Arc<dyn TemplateRenderer>,
    fs: Arc<dyn Filesystem>,
    dry_run: bool,
}

impl FsSaveExecutor {
    pub fn new(
        targets: Vec<TargetFilesystem>,
        renderer: Arc<dyn TemplateRenderer>,
        fs: Arc<dyn Filesystem>,
        dry_run: bool,
    ) -> Self {
        Self {
            targets,
            renderer,
            fs,
            dry_run,
        }
    }
}

impl Executor for FsSaveExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for target in &self.targets {
            let source = Arc::clone(&target.source);
            let renderer = Arc::clone(&self.renderer);
            let fs = Arc::clone(&self.fs);
            let tree = if self.dry_run {
                SaveTree::dry_run(source, renderer, fs)
            } else {
                SaveTree::new(source, renderer, fs)
            };
            tree.apply(&target.target_dir)
                .with_context(|| format!("fs_save [{}]", target.target_dir.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;
    use stagehand_core::domain::TemplateOptions;
    use tempfile::TempDir;

    use super::*;
    use crate::filesystem::LocalFilesystem;
    use crate::renderer::TemplateEngine;
    use crate::source::EmbeddedSource;

    fn engine(vars: serde_json::Value) -> Arc<dyn TemplateRenderer> {
        Arc::new(TemplateEngine::new(vars, TemplateOptions::default()))
    }

    fn local() -> Arc<dyn Filesystem> {
        Arc::new(LocalFilesystem::new())
    }

    #[test]
    fn renamed_directory_is_relocated_and_removed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("{{.var}}")).unwrap();
        fs::write(temp.path().join("{{.var}}/note.txt"), "by {{ .var }}").unwrap();

        let tree = ModifyTree::new(engine(json!({"var": "DATA"})), local());
        tree.apply(temp.path()).unwrap();

        assert_eq!(
            fs::read_to_string(temp.path().join("DATA/note.txt")).unwrap(),
            "by DATA"
        );
        assert!(!temp.path().join("{{.var}}").exists());
    }

    #[test]
    fn rerun_on_flat_tree_renames_nothing() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("{{.var}}")).unwrap();
        fs::write(temp.path().join("{{.var}}/note.txt"), "x").unwrap();
        let tree = ModifyTree::new(engine(json!({"var": "DATA"})), local());

        tree.apply(temp.path()).unwrap();
        tree.apply(temp.path()).unwrap();

        let names: Vec<String> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["DATA".to_string()]);
        assert_eq!(fs::read_to_string(temp.path().join("DATA/note.txt")).unwrap(), "x");
    }

    #[test]
    fn path_template_error_aborts() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("{{ .broken"), "x").unwrap();

        let tree = ModifyTree::new(engine(json!({})), local());
        let err = tree.apply(temp.path()).unwrap_err();

        assert!(err.to_string().starts_with("template path"), "{err}");
    }

    #[test]
    fn dry_run_leaves_tree_untouched() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("{{.var}}.txt"), "x").unwrap();

        ModifyTree::dry_run(engine(json!({"var": "out"})), local())
            .apply(temp.path())
            .unwrap();

        assert!(temp.path().join("{{.var}}.txt").exists());
        assert!(!temp.path().join("out.txt").exists());
    }

    static ASSETS: &[(&str, &[u8])] = &[
        ("{{.name}}/Cargo.toml", b"name = \"{{ .name }}\""),
        ("README.md", b"# readme"),
    ];

    #[test]
    fn save_tree_copies_and_renders_source() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");
        let exec = FsSaveExecutor::new(
            vec![TargetFilesystem {
                target_dir: target.clone(),
                source: Arc::new(EmbeddedSource::new(ASSETS)),
            }],
            engine(json!({"name": "demo"})),
            local(),
            false,
        );

        exec.exec().unwrap();

        assert_eq!(
            fs::read_to_string(target.join("demo/Cargo.toml")).unwrap(),
            "name = \"demo\""
        );
        assert_eq!(fs::read_to_string(target.join("README.md")).unwrap(), "# readme");
    }

    #[test]
    fn save_tree_dry_run_creates_nothing() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");
        let exec = FsSaveExecutor::new(
            vec![TargetFilesystem {
                target_dir: target.clone(),
                source: Arc::new(EmbeddedSource::new(ASSETS)),
            }],
            engine(json!({"name": "demo"})),
            local(),
            true,
        );

        exec.exec().unwrap();

        assert!(!target.exists());
    }

    static BLANK_DIR: &[(&str, &[u8])] = &[("{{.missing}}/x.txt", b"x")];

    #[test]
    fn blank_leading_segment_stays_under_root() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");

        SaveTree::new(Arc::new(EmbeddedSource::new(BLANK_DIR)), engine(json!({})), local())
            .apply(&target)
            .unwrap();

        assert_eq!(fs::read_to_string(target.join("x.txt")).unwrap(), "x");
    }

    #[test]
    fn blank_directory_is_flattened_in_place() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("{{.missing}}")).unwrap();
        fs::write(temp.path().join("{{.missing}}/note.txt"), "n").unwrap();

        ModifyTree::new(engine(json!({})), local())
            .apply(temp.path())
            .unwrap();

        assert_eq!(fs::read_to_string(temp.path().join("note.txt")).unwrap(), "n");
        assert!(!temp.path().join("{{.missing}}").exists());
    }

    static CLIMB: &[(&str, &[u8])] = &[("{{.up}}/escaped.txt", b"x")];

    #[test]
    fn parent_segment_is_rejected() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out");

        let err = SaveTree::new(
            Arc::new(EmbeddedSource::new(CLIMB)),
            engine(json!({"up": ".."})),
            local(),
        )
        .apply(&target)
        .unwrap_err();

        assert!(err.to_string().contains("leaves the tree root"), "{err}");
        assert!(!temp.path().join("escaped.txt").exists());
        assert!(!target.exists());
    }

    static BLANK_FILE: &[(&str, &[u8])] = &[("{{.missing}}", b"x")];

    #[test]
    fn file_rendering_blank_is_rejected() {
        let temp = TempDir::new().unwrap();

        let err = SaveTree::new(Arc::new(EmbeddedSource::new(BLANK_FILE)), engine(json!({})), local())
            .apply(temp.path())
            .unwrap_err();

        assert!(err.to_string().contains("names no file"), "{err}");
    }

    #[test]
    fn fs_executor_names_failing_root() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");
        let exec = FsModifyExecutor::new(
            vec![missing.clone()],
            Arc::new(ModifyTree::new(engine(json!({})), local())),
        );

        let err = exec.exec().unwrap_err();

        assert!(err.to_string().starts_with("fs ["), "{err}");
    }
}
