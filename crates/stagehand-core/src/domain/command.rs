//! OS commands declared by command actions.

use std::fmt;
use std::path::{Path, PathBuf};

use super::DomainError;

/// One process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub executable: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
}

impl Command {
    /// An empty `working_dir` resolves to the current directory.
    pub fn new(
        executable: impl Into<String>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
    ) -> Self {
        let working_dir = working_dir.into();
        Self {
            executable: executable.into(),
            args,
            working_dir: if working_dir.as_os_str().is_empty() {
                PathBuf::from(".")
            } else {
                working_dir
            },
        }
    }

    /// Split a command line on whitespace. Quotes are not interpreted.
    pub fn parse(line: &str, working_dir: impl AsRef<Path>) -> Result<Self, DomainError> {
        let mut parts = line.split_whitespace().map(str::to_owned);
        let Some(executable) = parts.next() else {
            return Err(DomainError::EmptyCommand {
                dir: working_dir.as_ref().to_path_buf(),
            });
        };
        Ok(Self::new(
            executable,
            parts.collect(),
            working_dir.as_ref(),
        ))
    }

    /// Append an argument, used to pass a script body to its runner.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.executable)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Commands declared together in one entry of a command action.
///
/// With `pipe` set, each command's stdout feeds the next command's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSet {
    pub commands: Vec<Command>,
    pub pipe: bool,
}

impl CommandSet {
    pub fn sequential(commands: Vec<Command>) -> Self {
        Self {
            commands,
            pipe: false,
        }
    }

    pub fn piped(commands: Vec<Command>) -> Self {
        Self {
            commands,
            pipe: true,
        }
    }
}
