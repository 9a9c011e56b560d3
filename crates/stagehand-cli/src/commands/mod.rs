//! Subcommand handlers.

pub mod check;
pub mod completions;
pub mod run;

use stagehand_core::application::SelectionFilter;
use tracing::debug;

use crate::{
    cli::SelectionArgs,
    error::{CliError, CliResult},
    manifest::{ActionFile, LoadedActions},
    vars::apply_overrides,
};

/// Load the action file named by `selection`, merge `--var` overrides and
/// build the action filter.
pub(crate) fn load_selected(selection: &SelectionArgs) -> CliResult<(LoadedActions, SelectionFilter)> {
    let mut loaded = ActionFile::load(&selection.file)?.into_actions(&selection.file)?;
    apply_overrides(&mut loaded.vars, &selection.var)?;

    let filter = SelectionFilter::new(loaded.selection(&selection.skip, &selection.group)?)
        .map_err(|e| CliError::Core(e.into()))?;

    debug!(
        file = %selection.file.display(),
        actions = loaded.plan.len(),
        "action file loaded"
    );
    Ok((loaded, filter))
}
