//! The action file (`stagehand.toml`).
//!
//! ```toml
//! [settings.http]
//! base_url = "https://raw.githubusercontent.com/org/templates/main/"
//!
//! [[settings.groups]]
//! name = "docs"
//! actions = ["readme"]
//! manual = true
//!
//! [vars]
//! name = "demo"
//!
//! [[actions]]
//! name = "layout"
//! dirs = ["src", "docs"]
//!
//! [[actions]]
//! name = "readme"
//! files = [{ path = "README.md", data = "# {{ .name }}" }]
//!
//! [[actions]]
//! name = "init"
//! cmd = ["git init", { exec = ["echo hello", "tr a-z A-Z"], pipe = true }]
//! ```
//!
//! Priority is the position of the action in the file.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use stagehand_adapters::{DiskSource, HttpSettings};
use stagehand_core::{
    application::{ActionPlan, ActionSelection, TargetFilesystem},
    domain::{Action, Command, CommandSet, DomainError, RemoteSource, UndefinedFile},
};
use tracing::debug;

use crate::error::{CliError, CliResult};

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionFile {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub vars: toml::Table,
    #[serde(default)]
    pub actions: Vec<ActionEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub http: HttpSection,
    #[serde(default)]
    pub groups: Vec<GroupSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSection {
    pub base_url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GroupSection {
    pub name: String,
    pub actions: Vec<String>,
    /// Members only run when the group is selected.
    #[serde(default)]
    pub manual: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionEntry {
    pub name: String,
    pub dirs: Option<Vec<String>>,
    pub rm: Option<Vec<String>>,
    pub files: Option<Vec<FileEntry>>,
    pub cmd: Option<Vec<CommandEntry>>,
    pub fs: Option<Vec<String>>,
    pub fs_save: Option<Vec<SaveEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileEntry {
    pub path: String,
    pub data: Option<String>,
    pub get: Option<GetEntry>,
    pub local: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GetEntry {
    pub url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query: BTreeMap<String, String>,
}

/// A plain command line, or the structured form.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CommandEntry {
    Line(String),
    Table(CommandTable),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandTable {
    pub exec: ExecLines,
    /// With `args`, `exec` is the executable itself, not a command line.
    pub args: Option<Vec<String>>,
    pub dir: Option<String>,
    #[serde(default)]
    pub pipe: bool,
    /// Appended as the last argument, for `sh -c` style runners.
    pub script: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExecLines {
    One(String),
    Many(Vec<String>),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SaveEntry {
    pub source: String,
    pub target: String,
}

/// A validated action file.
#[derive(Debug)]
pub struct LoadedActions {
    pub plan: ActionPlan,
    pub vars: Value,
    pub http: HttpSettings,
    /// Action name to the groups it belongs to.
    pub membership: HashMap<String, HashSet<String>>,
    pub manual: HashSet<String>,
    pub groups: BTreeSet<String>,
}

impl LoadedActions {
    /// Selection input for the action filter.
    ///
    /// Selecting a group the file does not declare is an input error.
    pub fn selection(&self, skip: &[String], groups: &[String]) -> CliResult<ActionSelection> {
        if let Some(unknown) = groups.iter().find(|g| !self.groups.contains(*g)) {
            return Err(CliError::InvalidInput {
                message: format!(
                    "unknown group '{unknown}' (declared: {})",
                    self.groups.iter().cloned().collect::<Vec<_>>().join(", ")
                ),
                source: None,
            });
        }
        Ok(ActionSelection {
            skip: skip.to_vec(),
            groups: groups.to_vec(),
            membership: self.membership.clone(),
            manual: self.manual.clone(),
        })
    }
}

impl ActionFile {
    /// Read and parse the action file at `path`.
    pub fn load(path: &Path) -> CliResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CliError::ActionFileNotFound {
                path: path.to_path_buf(),
            },
            _ => CliError::IoError {
                message: format!("read {}: {e}", path.display()),
                source: e,
            },
        })?;
        Self::parse(path, &text)
    }

    pub fn parse(path: &Path, text: &str) -> CliResult<Self> {
        toml::from_str(text).map_err(|e| CliError::InvalidActionFile {
            path: path.to_path_buf(),
            message: e.to_string().trim_end().to_owned(),
        })
    }

    /// Validate every entry and build the typed action lists.
    pub fn into_actions(self, path: &Path) -> CliResult<LoadedActions> {
        let invalid = |message: String| CliError::InvalidActionFile {
            path: path.to_path_buf(),
            message,
        };

        let mut plan = ActionPlan::default();
        let mut names = HashSet::new();
        for (index, entry) in self.actions.into_iter().enumerate() {
            let name = entry.name.trim().to_owned();
            if name.is_empty() {
                return Err(invalid(format!("action [{index}] has no name")));
            }
            if !names.insert(name.clone()) {
                return Err(invalid(format!("duplicate action name '{name}'")));
            }
            let priority = i32::try_from(index)
                .map_err(|_| invalid("too many actions".to_owned()))?;
            add_action(&mut plan, priority, &name, entry)
                .map_err(|message| invalid(format!("action [{name}]: {message}")))?;
        }

        let mut membership: HashMap<String, HashSet<String>> = HashMap::new();
        let mut manual = HashSet::new();
        let mut groups = BTreeSet::new();
        for group in self.settings.groups {
            for action in &group.actions {
                if !names.contains(action) {
                    return Err(invalid(format!(
                        "group '{}' lists unknown action '{action}'",
                        group.name
                    )));
                }
                membership
                    .entry(action.clone())
                    .or_default()
                    .insert(group.name.clone());
                if group.manual {
                    manual.insert(action.clone());
                }
            }
            groups.insert(group.name);
        }

        let vars = serde_json::to_value(&self.vars)
            .map_err(|e| invalid(format!("vars: {e}")))?;
        let http = HttpSettings {
            base_url: self.settings.http.base_url,
            headers: self.settings.http.headers,
            debug: self.settings.http.debug,
        };

        debug!(actions = plan.len(), groups = groups.len(), "action file loaded");
        Ok(LoadedActions {
            plan,
            vars,
            http,
            membership,
            manual,
            groups,
        })
    }
}

fn add_action(
    plan: &mut ActionPlan,
    priority: i32,
    name: &str,
    entry: ActionEntry,
) -> Result<(), String> {
    let declared = [
        entry.dirs.is_some(),
        entry.rm.is_some(),
        entry.files.is_some(),
        entry.cmd.is_some(),
        entry.fs.is_some(),
        entry.fs_save.is_some(),
    ]
    .into_iter()
    .filter(|set| *set)
    .count();
    if declared != 1 {
        return Err(format!(
            "expected exactly one of dirs, rm, files, cmd, fs, fs_save, found {declared}"
        ));
    }

    if let Some(dirs) = entry.dirs {
        let dirs = dirs.into_iter().map(PathBuf::from).collect();
        plan.dirs.push(Action::new(priority, name, dirs));
    } else if let Some(paths) = entry.rm {
        plan.rm.push(Action::new(priority, name, paths));
    } else if let Some(files) = entry.files {
        let files = files
            .into_iter()
            .map(file_from_entry)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        plan.files.push(Action::new(priority, name, files));
    } else if let Some(commands) = entry.cmd {
        let sets = commands
            .into_iter()
            .map(command_set_from_entry)
            .collect::<Result<Vec<_>, _>>()?;
        plan.commands.push(Action::new(priority, name, sets));
    } else if let Some(roots) = entry.fs {
        let roots = roots.into_iter().map(PathBuf::from).collect();
        plan.fs_modify.push(Action::new(priority, name, roots));
    } else if let Some(saves) = entry.fs_save {
        let targets = saves
            .into_iter()
            .map(|save| TargetFilesystem {
                target_dir: PathBuf::from(save.target),
                source: Arc::new(DiskSource::new(save.source)),
            })
            .collect();
        plan.fs_save.push(Action::new(priority, name, targets));
    }
    Ok(())
}

fn file_from_entry(entry: FileEntry) -> Result<UndefinedFile, DomainError> {
    let get = entry.get.map(|get| RemoteSource {
        url: get.url,
        headers: get.headers,
        query: get.query,
    });
    UndefinedFile::from_declaration(
        entry.path,
        entry.data.map(String::into_bytes),
        get,
        entry.local.map(PathBuf::from),
    )
}

fn command_set_from_entry(entry: CommandEntry) -> Result<CommandSet, String> {
    let table = match entry {
        CommandEntry::Line(line) => {
            let command = Command::parse(&line, ".").map_err(|e| e.to_string())?;
            return Ok(CommandSet::sequential(vec![command]));
        }
        CommandEntry::Table(table) => table,
    };

    let dir = table.dir.unwrap_or_else(|| ".".to_owned());
    let mut commands = match (table.exec, table.args) {
        (ExecLines::One(executable), Some(args)) => {
            if executable.trim().is_empty() {
                return Err(DomainError::EmptyCommand { dir: dir.into() }.to_string());
            }
            vec![Command::new(executable, args, &dir)]
        }
        (ExecLines::Many(_), Some(_)) => {
            return Err("'args' requires a single 'exec'".to_owned());
        }
        (ExecLines::One(line), None) => vec![Command::parse(&line, &dir).map_err(|e| e.to_string())?],
        (ExecLines::Many(lines), None) => {
            if lines.is_empty() {
                return Err(DomainError::EmptyCommand { dir: dir.into() }.to_string());
            }
            lines
                .iter()
                .map(|line| Command::parse(line, &dir))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| e.to_string())?
        }
    };

    if let Some(script) = table.script {
        if let Some(last) = commands.pop() {
            commands.push(last.with_arg(script));
        }
    }

    Ok(if table.pipe {
        CommandSet::piped(commands)
    } else {
        CommandSet::sequential(commands)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use stagehand_core::application::AcceptAll;
    use stagehand_core::application::ActionKind;
    use stagehand_core::domain::FileSource;

    fn load(text: &str) -> CliResult<LoadedActions> {
        let path = Path::new("stagehand.toml");
        ActionFile::parse(path, text)?.into_actions(path)
    }

    const FULL: &str = r##"
[settings.http]
base_url = "https://example.com/"
headers = { Authorization = "token" }

[[settings.groups]]
name = "docs"
actions = ["readme"]
manual = true

[vars]
name = "demo"
project = { version = "1.0" }

[[actions]]
name = "layout"
dirs = ["src", "docs"]

[[actions]]
name = "readme"
files = [
  { path = "README.md", data = "# {{ .name }}" },
  { path = "LICENSE", get = { url = "license.txt", query = { rev = "main" } } },
  { path = "notes.md", local = "templates/notes.md" },
]

[[actions]]
name = "init"
cmd = [
  "git init",
  { exec = ["echo hello", "tr a-z A-Z"], pipe = true },
  { exec = "sh", args = ["-c"], script = "echo $0", dir = "src" },
]

[[actions]]
name = "clean"
rm = ["build*"]
"##;

    #[test]
    fn full_file_builds_plan_in_declaration_order() {
        let loaded = load(FULL).unwrap();

        let steps: Vec<_> = loaded
            .plan
            .steps(&AcceptAll)
            .into_iter()
            .map(|s| (s.priority, s.name, s.kind, s.values))
            .collect();
        assert_eq!(
            steps,
            vec![
                (0, "layout".to_owned(), ActionKind::Dirs, 2),
                (1, "readme".to_owned(), ActionKind::Files, 3),
                (2, "init".to_owned(), ActionKind::Cmd, 3),
                (3, "clean".to_owned(), ActionKind::Rm, 1),
            ]
        );
        assert_eq!(loaded.vars["project"]["version"], "1.0");
        assert_eq!(loaded.http.base_url.as_deref(), Some("https://example.com/"));
        assert!(loaded.manual.contains("readme"));
        assert!(loaded.membership["readme"].contains("docs"));
    }

    #[test]
    fn file_sources_are_typed() {
        let loaded = load(FULL).unwrap();
        let files = &loaded.plan.files[0].values;

        assert!(matches!(files[0].source, FileSource::Inline(_)));
        let FileSource::Remote(remote) = &files[1].source else {
            panic!("expected remote source");
        };
        assert_eq!(remote.query["rev"], "main");
        assert_eq!(files[2].source, FileSource::Local(PathBuf::from("templates/notes.md")));
    }

    #[test]
    fn command_forms_are_expanded() {
        let loaded = load(FULL).unwrap();
        let sets = &loaded.plan.commands[0].values;

        assert_eq!(sets[0].commands[0].to_string(), "git init");
        assert!(!sets[0].pipe);

        assert!(sets[1].pipe);
        assert_eq!(sets[1].commands.len(), 2);

        let runner = &sets[2].commands[0];
        assert_eq!(runner.executable, "sh");
        assert_eq!(runner.args, vec!["-c", "echo $0"]);
        assert_eq!(runner.working_dir, PathBuf::from("src"));
    }

    #[test]
    fn file_with_two_sources_is_rejected() {
        let err = load(
            r#"
[[actions]]
name = "bad"
files = [{ path = "x", data = "a", get = { url = "http://h/x" } }]
"#,
        )
        .unwrap_err();

        assert!(matches!(err, CliError::InvalidActionFile { .. }));
        assert!(err.to_string().contains("action [bad]"), "{err}");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn action_needs_exactly_one_category() {
        let err = load(
            r#"
[[actions]]
name = "both"
dirs = ["a"]
rm = ["b"]
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("found 2"), "{err}");

        let err = load("[[actions]]\nname = \"none\"\n").unwrap_err();
        assert!(err.to_string().contains("found 0"), "{err}");
    }

    #[test]
    fn empty_command_is_rejected() {
        let err = load("[[actions]]\nname = \"c\"\ncmd = [\"   \"]\n").unwrap_err();
        assert!(err.to_string().contains("command is empty"), "{err}");
    }

    #[test]
    fn duplicate_names_and_unknown_members_are_rejected() {
        let dup = load("[[actions]]\nname = \"a\"\ndirs = []\n[[actions]]\nname = \"a\"\nrm = []\n");
        assert!(dup.unwrap_err().to_string().contains("duplicate"));

        let unknown = load(
            "[[settings.groups]]\nname = \"g\"\nactions = [\"ghost\"]\n[[actions]]\nname = \"a\"\ndirs = []\n",
        );
        assert!(unknown.unwrap_err().to_string().contains("ghost"));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load("[[actions]]\nname = \"a\"\nmkdir = [\"x\"]\n").unwrap_err();
        assert!(matches!(err, CliError::InvalidActionFile { .. }));
    }

    #[test]
    fn selecting_undeclared_group_fails() {
        let loaded = load(FULL).unwrap();
        assert!(loaded.selection(&[], &["docs".into()]).is_ok());
        let err = loaded.selection(&[], &["nope".into()]).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ActionFile::load(Path::new("/definitely/not/here/stagehand.toml")).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
