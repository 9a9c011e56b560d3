//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use stagehand_core::domain::MissingKey;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

/// Default action file, looked up in the working directory.
pub const DEFAULT_ACTION_FILE: &str = "stagehand.toml";

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "stagehand",
    bin_name = "stagehand",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Run declarative project scaffolding actions",
    long_about = "Stagehand reads an action file and runs its directory, file, \
                  command, tree and removal actions in priority order, stopping \
                  at the first failure.",
    after_help = "EXAMPLES:\n\
        \x20 stagehand run\n\
        \x20 stagehand run -f scaffold.toml --var name=demo --dry-run\n\
        \x20 stagehand check --group docs\n\
        \x20 stagehand completions bash > /usr/share/bash-completion/completions/stagehand",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the actions of an action file.
    #[command(
        visible_alias = "r",
        about = "Run the actions of an action file",
        after_help = "EXAMPLES:\n\
            \x20 stagehand run\n\
            \x20 stagehand run --skip '^cmd' --preload\n\
            \x20 stagehand run --group docs --var project.name=demo"
    )]
    Run(RunArgs),

    /// Validate an action file and print the execution order.
    #[command(
        about = "Validate an action file and print the plan",
        after_help = "EXAMPLES:\n\
            \x20 stagehand check\n\
            \x20 stagehand check -f scaffold.toml --output-format json"
    )]
    Check(CheckArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 stagehand completions bash > ~/.local/share/bash-completion/completions/stagehand\n\
            \x20 stagehand completions zsh  > ~/.zfunc/_stagehand\n\
            \x20 stagehand completions fish > ~/.config/fish/completions/stagehand.fish"
    )]
    Completions(CompletionsArgs),
}

// ── shared selection ─────────────────────────────────────────────────────────

/// Which action file to load and which of its actions take part.
#[derive(Debug, Clone, Args)]
pub struct SelectionArgs {
    /// Action file.
    #[arg(
        short = 'f',
        long = "file",
        value_name = "FILE",
        default_value = DEFAULT_ACTION_FILE,
        help = "Action file path"
    )]
    pub file: PathBuf,

    /// Skip actions whose name matches a regular expression.
    #[arg(
        long = "skip",
        value_name = "REGEX",
        help = "Skip actions matching a regular expression (repeatable)"
    )]
    pub skip: Vec<String>,

    /// Run only the actions of the selected groups.
    #[arg(
        long = "group",
        value_name = "NAME",
        help = "Run only actions of this group (repeatable)"
    )]
    pub group: Vec<String>,

    /// Template variable, merged over the `[vars]` table.
    #[arg(
        long = "var",
        value_name = "KEY=VALUE",
        help = "Template variable, dotted keys allowed (repeatable)"
    )]
    pub var: Vec<String>,
}

// ── run ──────────────────────────────────────────────────────────────────────

/// Arguments for `stagehand run`.
#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Report every effect without performing it.
    #[arg(long = "dry-run", help = "Log what would happen without doing it")]
    pub dry_run: bool,

    /// Fetch every file's content concurrently before the first action.
    #[arg(long = "preload", help = "Fetch all file contents before running")]
    pub preload: bool,

    /// Behaviour of templates on a missing variable.
    #[arg(
        long = "missing-key",
        value_name = "POLICY",
        value_enum,
        help = "What a missing template variable renders as"
    )]
    pub missing_key: Option<MissingKeyArg>,

    /// Application working directory.
    #[arg(
        long = "awd",
        value_name = "DIR",
        help = "Working directory for the run (default: current directory)"
    )]
    pub awd: Option<PathBuf>,
}

// ── check ────────────────────────────────────────────────────────────────────

/// Arguments for `stagehand check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `stagehand completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── value enums ───────────────────────────────────────────────────────────────

/// Template missing-key policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum MissingKeyArg {
    /// Render nothing.
    Default,
    /// Render `<no value>`.
    Invalid,
    /// Render the zero value (nothing).
    Zero,
    /// Fail the action.
    Error,
}

impl From<MissingKeyArg> for MissingKey {
    fn from(arg: MissingKeyArg) -> Self {
        match arg {
            MissingKeyArg::Default => MissingKey::Default,
            MissingKeyArg::Invalid => MissingKey::Invalid,
            MissingKeyArg::Zero => MissingKey::Zero,
            MissingKeyArg::Error => MissingKey::Error,
        }
    }
}

// ── tests ─────────────────────────────────────────────────────────────────────
