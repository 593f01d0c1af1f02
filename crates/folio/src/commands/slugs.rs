//! `folio slugs` command implementation.

use clap::Args;

use super::{CommonArgs, open_site, print_stdout};
use crate::error::CliError;

/// Arguments for the slugs command.
#[derive(Args)]
pub(crate) struct SlugsArgs {
    #[command(flatten)]
    common: CommonArgs,
}

impl SlugsArgs {
    /// Execute the slugs command.
    ///
    /// The first line is empty: the default page's slug.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the document root cannot
    /// be listed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let config = self.common.load_config()?;
        let slugs = open_site(&config).slugs()?;
        print_stdout(&slugs.join("\n"))
    }
}
