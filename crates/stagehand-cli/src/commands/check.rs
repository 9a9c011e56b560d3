//! `stagehand check`: validate the action file and print the plan.

use stagehand_core::application::PlannedStep;
use tracing::instrument;

use crate::{
    cli::{CheckArgs, OutputFormat},
    commands::load_selected,
    error::CliResult,
    output::OutputManager,
};

#[instrument(skip_all, fields(file = %args.selection.file.display()))]
pub fn execute(args: CheckArgs, output: OutputManager) -> CliResult<()> {
    let (loaded, filter) = load_selected(&args.selection)?;
    let steps = loaded.plan.steps(&filter);

    match output.format() {
        OutputFormat::Json => output.json(&steps)?,
        OutputFormat::Plain => {
            for step in &steps {
                output.print(&format!(
                    "{}\t{}\t{}\t{}",
                    step.priority, step.kind, step.name, step.values
                ))?;
            }
        }
        OutputFormat::Human | OutputFormat::Auto => {
            output.header(&format!("Plan for {}:", args.selection.file.display()))?;
            if steps.is_empty() {
                output.info("no actions selected")?;
            }
            for step in &steps {
                output.print(&describe(step))?;
            }
            output.success(&format!(
                "{} of {} actions selected",
                steps.len(),
                loaded.plan.len()
            ))?;
        }
    }
    Ok(())
}

fn describe(step: &PlannedStep) -> String {
    let unit = if step.values == 1 { "value" } else { "values" };
    format!(
        "  {:>3}  {:<7} {} ({} {unit})",
        step.priority, step.kind, step.name, step.values
    )
}
