//! Leaf executors: directories, removals, commands.

mod command;
mod dir;
mod rm;

pub use command::{
    CommandListExecutor, CommandOutput, DryRunCommandExecutor, PipedCommandExecutor,
    SequentialCommandExecutor,
};
pub use dir::MkdirExecutor;
pub use rm::{DryRunRemoveExecutor, RemoveExecutor, expand_glob};
