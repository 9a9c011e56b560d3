//! Tracing subscriber initialisation.
//!
//! Only the CLI crate calls [`init_logging`]; the library crates only *emit*
//! spans and events.
//!
//! # Verbosity mapping
//!
//! | Flag(s)  | Filter level |
//! |----------|--------------|
//! | (none)   | WARN         |
//! | `-v`     | INFO         |
//! | `-vv`    | DEBUG        |
//! | `-vvv`   | TRACE        |
//! | `--quiet`| ERROR        |
//!
//! `RUST_LOG` overrides all of the above if set. Dry-run reports are
//! enabled on their own target whatever the level.

use std::io::IsTerminal as _;

use stagehand_core::DRY_RUN_TARGET;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

/// Initialise the global tracing subscriber.
///
/// Must be called exactly once, before any tracing macros fire.
pub fn init_logging(args: &GlobalArgs, dry_run: bool) -> anyhow::Result<()> {
    let directives = filter_directives(args, dry_run);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let use_ansi = !args.no_color && std::io::stderr().is_terminal();

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(use_ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

/// Filter string giving each crate of the workspace the same level.
fn filter_directives(args: &GlobalArgs, dry_run: bool) -> String {
    let level = derive_level(args);
    let mut directives =
        format!("stagehand={level},stagehand_core={level},stagehand_adapters={level}");
    if dry_run {
        directives.push_str(&format!(",{DRY_RUN_TARGET}=info"));
    }
    directives
}

/// Translate the verbosity counter + quiet flag to a level string.
fn derive_level(args: &GlobalArgs) -> &'static str {
    if args.quiet {
        return "error";
    }
    match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
