//! # Stagehand CLI
//!
//! Runs the actions of a declarative action file.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Load configuration (file + env + defaults).
//! 3. Initialise the tracing subscriber; a dry run enables its report target.
//! 4. Build the [`OutputManager`].
//! 5. Dispatch to the appropriate command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                 |
//! |------|-------------------------|
//! |  0   | Success                 |
//! |  1   | Internal / runtime error |
//! |  2   | User / input error      |
//! |  3   | Resource not found      |
//! |  4   | Configuration error     |

use std::io::IsTerminal as _;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument, warn};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod manifest;
mod output;
mod vars;

fn main() -> ExitCode {
    // Missing .env is fine; anything else is reported once logging is up.
    let dotenv = dotenv_failure(dotenvy::dotenv());

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version arrive here too, with a zero exit code.
            let _ = e.print();
            return ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(2));
        }
    };
    let verbose = cli.global.verbose > 0;

    // ── 2. Load configuration ─────────────────────────────────────────────
    // Reported after logging is up, so the failure is logged like any other.
    let config = AppConfig::load(cli.global.config.as_ref());

    // ── 3. Initialise tracing ─────────────────────────────────────────────
    let dry_run = match (&cli.command, &config) {
        (Commands::Run(args), Ok(cfg)) => args.dry_run || cfg.run.dry_run,
        (Commands::Run(args), Err(_)) => args.dry_run,
        _ => false,
    };
    if let Err(e) = init_logging(&cli.global, dry_run) {
        eprintln!("Failed to initialise logging: {e}");
        return ExitCode::from(1);
    }

    if let Some(e) = dotenv {
        warn!(error = %e, ".env not loaded");
    }

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => return handle_error(e, verbose),
    };

    // ── 4. Build output manager ───────────────────────────────────────────
    let output = OutputManager::new(&cli.global, &config);

    // ── 5. Dispatch + 6. Error handling ──────────────────────────────────
    match run(cli, config, output) {
        Ok(()) => {
            info!("stagehand completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cli.command {
        Commands::Run(args) => commands::run::execute(args, config, output),
        Commands::Check(args) => commands::check::execute(args, output),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

/// The error of a `.env` load, unless the file simply does not exist.
fn dotenv_failure<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    result.err().filter(|e| !e.not_found())
}

/// Log `err`, print it to stderr and map it to an exit code.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    let msg = if std::io::stderr().is_terminal() {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────
