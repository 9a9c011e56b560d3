//! The typed action lists handed to the engine.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::application::filter::ActionFilter;
use crate::application::ports::SourceTree;
use crate::domain::{Action, CommandSet, UndefinedFile};

/// Target of the save variant of the tree transformer: a read-only tree
/// copied (and templated) into `target_dir`.
#[derive(Debug, Clone)]
pub struct TargetFilesystem {
    pub target_dir: PathBuf,
    pub source: Arc<dyn SourceTree>,
}

/// Category of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Dirs,
    Rm,
    Cmd,
    Files,
    Fs,
    FsSave,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Dirs => "dirs",
            Self::Rm => "rm",
            Self::Cmd => "cmd",
            Self::Files => "files",
            Self::Fs => "fs",
            Self::FsSave => "fs_save",
        };
        f.pad(name)
    }
}

/// One action per declared section, grouped by category.
#[derive(Debug, Clone, Default)]
pub struct ActionPlan {
    pub dirs: Vec<Action<PathBuf>>,
    pub rm: Vec<Action<String>>,
    pub commands: Vec<Action<CommandSet>>,
    pub files: Vec<Action<UndefinedFile>>,
    pub fs_modify: Vec<Action<PathBuf>>,
    pub fs_save: Vec<Action<TargetFilesystem>>,
}

/// An action as it will be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub priority: i32,
    pub name: String,
    pub kind: ActionKind,
    pub values: usize,
}

impl ActionPlan {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of actions across all categories.
    pub fn len(&self) -> usize {
        self.dirs.len()
            + self.rm.len()
            + self.commands.len()
            + self.files.len()
            + self.fs_modify.len()
            + self.fs_save.len()
    }

    /// Actions accepted by `filter`, in execution order.
    ///
    /// Uses the same ordering as the chain factory: stable sort by priority,
    /// ties in category order dirs, rm, cmd, files, fs, fs_save.
    pub fn steps(&self, filter: &dyn ActionFilter) -> Vec<PlannedStep> {
        let mut steps = Vec::with_capacity(self.len());
        collect(&mut steps, &self.dirs, ActionKind::Dirs);
        collect(&mut steps, &self.rm, ActionKind::Rm);
        collect(&mut steps, &self.commands, ActionKind::Cmd);
        collect(&mut steps, &self.files, ActionKind::Files);
        collect(&mut steps, &self.fs_modify, ActionKind::Fs);
        collect(&mut steps, &self.fs_save, ActionKind::FsSave);

        steps.retain(|step| filter.matches(&step.name));
        steps.sort_by_key(|step| step.priority);
        steps
    }
}

fn collect<T>(steps: &mut Vec<PlannedStep>, actions: &[Action<T>], kind: ActionKind) {
    steps.extend(actions.iter().map(|action| PlannedStep {
        priority: action.priority,
        name: action.name.clone(),
        kind,
        values: action.values.len(),
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::filter::AcceptAll;
    use crate::domain::Command;

    #[test]
    fn steps_follow_priority_across_categories() {
        let plan = ActionPlan {
            dirs: vec![Action::new(2, "layout", vec![PathBuf::from("src")])],
            rm: vec![Action::new(0, "clean", vec!["tmp*".to_owned()])],
            commands: vec![Action::new(
                1,
                "init",
                vec![CommandSet::sequential(vec![
                    Command::parse("git init", ".").unwrap(),
                ])],
            )],
            ..ActionPlan::default()
        };

        let order: Vec<_> = plan
            .steps(&AcceptAll)
            .into_iter()
            .map(|s| (s.priority, s.name, s.kind))
            .collect();

        assert_eq!(
            order,
            vec![
                (0, "clean".to_owned(), ActionKind::Rm),
                (1, "init".to_owned(), ActionKind::Cmd),
                (2, "layout".to_owned(), ActionKind::Dirs),
            ]
        );
        assert_eq!(plan.len(), 3);
    }
}
