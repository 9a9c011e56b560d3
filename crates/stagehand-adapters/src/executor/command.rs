//! OS process execution for command actions.

use std::io::Read;
use std::process::{self, Child, ChildStdout, Stdio};
use std::thread::{self, JoinHandle};

use stagehand_core::{
    DRY_RUN_TARGET,
    application::{ApplicationError, ports::Executor},
    domain::{Command, CommandSet},
    error::{Context, StagehandResult},
};
use tracing::{debug, info};

/// Output captured from a finished process or pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (true, _) => self.stderr.clone(),
            (false, true) => self.stdout.clone(),
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
        }
    }
}

fn launch_error(command: &Command, error: std::io::Error) -> ApplicationError {
    ApplicationError::CommandLaunch {
        command: command.to_string(),
        dir: command.working_dir.clone(),
        reason: error.to_string(),
    }
}

fn read_lossy(mut reader: impl Read) -> String {
    let mut buf = Vec::new();
    // a read error only truncates diagnostics
    let _ = reader.read_to_end(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Runs each command in its own process, one after another.
pub struct SequentialCommandExecutor {
    commands: Vec<Command>,
}

impl SequentialCommandExecutor {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    fn run_one(command: &Command) -> StagehandResult<CommandOutput> {
        debug!(command = %command, dir = %command.working_dir.display(), "spawn");
        let output = process::Command::new(&command.executable)
            .args(&command.args)
            .current_dir(&command.working_dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| launch_error(command, e))?;

        let captured = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };
        if !output.status.success() {
            return Err(ApplicationError::CommandFailed {
                command: command.to_string(),
                dir: command.working_dir.clone(),
                status: output.status.to_string(),
                output: captured.combined(),
            }
            .into());
        }
        Ok(captured)
    }
}

impl Executor for SequentialCommandExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for command in &self.commands {
            let output = Self::run_one(command)?;
            info!(
                command = %command,
                dir = %command.working_dir.display(),
                stdout = %output.stdout.trim_end(),
                "command executed"
            );
        }
        Ok(())
    }
}

/// Connects the commands through OS pipes: stdout of `i` is stdin of `i + 1`.
///
/// Processes are started left to right and awaited right to left. The stderr
/// of every stage is kept; a failure is attributed to the right-most stage
/// that exited unsuccessfully.
pub struct PipedCommandExecutor {
    commands: Vec<Command>,
}

struct Stage<'a> {
    command: &'a Command,
    child: Child,
    stderr: Option<JoinHandle<String>>,
}

impl PipedCommandExecutor {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Run the pipeline to completion and return what it wrote.
    pub fn run(&self) -> StagehandResult<CommandOutput> {
        let mut stages: Vec<Stage<'_>> = Vec::with_capacity(self.commands.len());
        let mut upstream: Option<ChildStdout> = None;

        for command in &self.commands {
            let stdin = match upstream.take() {
                Some(out) => Stdio::from(out),
                None => Stdio::null(),
            };
            let spawned = process::Command::new(&command.executable)
                .args(&command.args)
                .current_dir(&command.working_dir)
                .stdin(stdin)
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .spawn();
            let mut child = match spawned {
                Ok(child) => child,
                Err(e) => {
                    Self::abort(&mut stages);
                    return Err(launch_error(command, e).into());
                }
            };
            debug!(command = %command, pid = child.id(), "pipe stage started");

            let stderr = child
                .stderr
                .take()
                .map(|err| thread::spawn(move || read_lossy(err)));
            upstream = child.stdout.take();
            stages.push(Stage {
                command,
                child,
                stderr,
            });
        }

        let stdout = upstream.map(read_lossy).unwrap_or_default();

        let mut errors = Vec::with_capacity(stages.len());
        let mut failure: Option<(&Command, String)> = None;
        for stage in stages.iter_mut() {
            let text = stage
                .stderr
                .take()
                .and_then(|h| h.join().ok())
                .unwrap_or_default();
            if !text.trim().is_empty() {
                errors.push(format!("{}: {}", stage.command.executable, text.trim_end()));
            }
        }
        for stage in stages.iter_mut().rev() {
            let outcome = match stage.child.wait() {
                Ok(status) if status.success() => continue,
                Ok(status) => status.to_string(),
                Err(e) => format!("wait failed: {e}"),
            };
            if failure.is_none() {
                failure = Some((stage.command, outcome));
            }
        }

        let output = CommandOutput {
            stdout,
            stderr: errors.join("\n"),
        };
        match failure {
            None => Ok(output),
            Some((command, status)) => Err(ApplicationError::CommandFailed {
                command: command.to_string(),
                dir: command.working_dir.clone(),
                status,
                output: output.combined(),
            }
            .into()),
        }
    }

    fn abort(stages: &mut [Stage<'_>]) {
        for stage in stages.iter_mut() {
            let _ = stage.child.kill();
            let _ = stage.child.wait();
        }
    }

    fn describe(&self) -> String {
        self.commands
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl Executor for PipedCommandExecutor {
    fn exec(&self) -> StagehandResult<()> {
        let output = self.run()?;
        info!(
            pipeline = %self.describe(),
            stdout = %output.stdout.trim_end(),
            "pipeline executed"
        );
        Ok(())
    }
}

/// Executes every command set of one action, each in the mode it declares.
pub struct CommandListExecutor {
    sets: Vec<CommandSet>,
}

impl CommandListExecutor {
    pub fn new(sets: Vec<CommandSet>) -> Self {
        Self { sets }
    }
}

impl Executor for CommandListExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for (i, set) in self.sets.iter().enumerate() {
            let result = if set.pipe {
                PipedCommandExecutor::new(set.commands.clone()).exec()
            } else {
                SequentialCommandExecutor::new(set.commands.clone()).exec()
            };
            result.with_context(|| format!("command [{i}]"))?;
        }
        Ok(())
    }
}

/// Logs the command lines instead of running them.
pub struct DryRunCommandExecutor {
    sets: Vec<CommandSet>,
}

impl DryRunCommandExecutor {
    pub fn new(sets: Vec<CommandSet>) -> Self {
        Self { sets }
    }
}

impl Executor for DryRunCommandExecutor {
    fn exec(&self) -> StagehandResult<()> {
        for set in &self.sets {
            let Some(first) = set.commands.first() else {
                continue;
            };
            let line = if set.pipe {
                PipedCommandExecutor::new(set.commands.clone()).describe()
            } else {
                set.commands
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" && ")
            };
            info!(
                target: DRY_RUN_TARGET,
                "execute [dir: {}]: {}",
                first.working_dir.display(),
                line
            );
        }
        Ok(())
    }
}
