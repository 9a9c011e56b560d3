//! `stagehand run`: load the action file, build the chain, execute it.
//!
//! Flag values win over the tool configuration; `--dry-run` and
//! `--preload` can only switch a behaviour on.

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use stagehand_adapters::{EngineSettings, LocalFilesystem, build_chain};
use stagehand_core::domain::MissingKey;
use tracing::{info, instrument};

use crate::{
    cli::{OutputFormat, RunArgs},
    commands::load_selected,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct RunSummary {
    actions: usize,
    dry_run: bool,
    elapsed_ms: u128,
}

#[instrument(skip_all, fields(file = %args.selection.file.display()))]
pub fn execute(mut args: RunArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let start = Instant::now();

    if let Some(awd) = &args.awd {
        args.selection.file = std::path::absolute(&args.selection.file)
            .with_cli_context(|| format!("resolve {}", args.selection.file.display()))?;
        std::env::set_current_dir(awd)
            .with_cli_context(|| format!("change directory to {}", awd.display()))?;
        info!(awd = %awd.display(), "working directory changed");
    }

    let (loaded, filter) = load_selected(&args.selection)?;
    let selected = loaded.plan.steps(&filter).len();

    let dry_run = args.dry_run || config.run.dry_run;
    let settings = EngineSettings {
        dry_run,
        preload: args.preload || config.run.preload,
        vars: loaded.vars,
        template_options: vec![missing_key_option(&args, &config)],
        http: loaded.http,
        filter: Arc::new(filter),
        fs: Arc::new(LocalFilesystem::new()),
    };

    let chain = build_chain(loaded.plan, settings).with_cli_context(|| "build chain")?;
    chain.exec()?;

    let elapsed = start.elapsed();
    info!(elapsed = ?elapsed, "execution time");

    match output.format() {
        OutputFormat::Json => output.json(&RunSummary {
            actions: selected,
            dry_run,
            elapsed_ms: elapsed.as_millis(),
        })?,
        _ if dry_run => output.info(&format!("Dry run: {selected} actions reported"))?,
        _ => output.success(&format!("{selected} actions completed"))?,
    }
    Ok(())
}

/// `missingkey=<policy>` from the flag, else from the configuration.
fn missing_key_option(args: &RunArgs, config: &AppConfig) -> String {
    let policy = match args.missing_key {
        Some(arg) => MissingKey::from(arg).to_string(),
        None => config.run.missing_key.clone(),
    };
    format!("missingkey={policy}")
}
