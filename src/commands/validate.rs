//! Command: load, merge and validate the manifest without writing anything.
use anyhow::Result;

use crate::cli::{GlobalOpts, SourceOpts};
use crate::logging::Logger;

use super::CommandSetup;

/// Run the validate command.
///
/// # Errors
///
/// Returns an error if no source resolves, a source fails to load, or the
/// merged manifest is invalid.
pub fn run(global: &GlobalOpts, opts: &SourceOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, opts, log)?;
    setup.manifest.typed_functions()?;
    setup.manifest.typed_modules()?;
    log.stage("Manifest is valid");
    Ok(())
}
