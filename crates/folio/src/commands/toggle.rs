//! `folio toggle` command implementation.

use clap::Args;

use super::{CommonArgs, open_nav_state, print_stdout};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the toggle command.
#[derive(Args)]
pub(crate) struct ToggleArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Folder slug to expand or collapse, e.g. `nodes/llm`.
    path: String,
}

impl ToggleArgs {
    /// Execute the toggle command.
    ///
    /// Prints the expanded folders after the toggle, one per line.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails. Persistence failures are
    /// logged and do not fail the command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.common.load_config()?;
        let state = open_nav_state(&config);

        let path = self.path.trim_matches('/');
        let expanded = state.toggle(path);
        if expanded.contains(path) {
            output.success(&format!("Expanded {path}"));
        } else {
            output.success(&format!("Collapsed {path}"));
        }

        print_stdout(&expanded.iter().collect::<Vec<_>>().join("\n"))
    }
}
