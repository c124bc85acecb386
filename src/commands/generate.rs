//! Command: render the manifest into every shell's output directories.
use anyhow::Result;

use crate::cli::{GenerateOpts, GlobalOpts};
use crate::logging::{FileStatus, Logger};
use crate::output;

use super::CommandSetup;

/// Run the generate command.
///
/// # Errors
///
/// Returns an error if setup fails, rendering fails, or a file cannot be written.
pub fn run(global: &GlobalOpts, opts: &GenerateOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, &opts.source, log)?;
    execute(&setup, opts, log)
}

/// Generate from an already-validated setup.
///
/// # Errors
///
/// Returns an error if rendering fails or a file cannot be written.
pub fn execute(setup: &CommandSetup, opts: &GenerateOpts, log: &Logger) -> Result<()> {
    let target = setup.target(opts.target.as_deref());
    log.stage(&target.as_ref().map_or_else(
        || "Generating into source tree".to_string(),
        |dir| format!("Generating into {}", dir.display()),
    ));

    let written = output::generate_all(&setup.manifest, target.as_deref(), &setup.root)?;
    for path in &written {
        let display = path.display().to_string();
        log.info(&display);
        log.record_file(&display, FileStatus::Written);
    }

    log.print_summary();
    Ok(())
}
