//! Command: report generated files that drifted from the manifest.
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};

use crate::cli::{CheckOpts, GlobalOpts};
use crate::exec::{Executor, SystemExecutor};
use crate::logging::{FileStatus, Logger};
use crate::output::{self, SyncReport};
use crate::syntax;

use super::CommandSetup;

/// Run the check command.
///
/// # Errors
///
/// Returns an error if setup fails, any generated file has drifted, or an
/// interpreter rejects a generated file.
pub fn run(global: &GlobalOpts, opts: &CheckOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, &opts.source, log)?;
    execute(&setup, opts, &SystemExecutor, log)
}

/// Check an already-validated setup, using `executor` for syntax checks.
///
/// # Errors
///
/// See [`run`].
pub fn execute(
    setup: &CommandSetup,
    opts: &CheckOpts,
    executor: &dyn Executor,
    log: &Logger,
) -> Result<()> {
    let target = setup.target(opts.target.as_deref());
    log.stage("Checking generated files");
    let report = output::check_sync(&setup.manifest, target.as_deref(), &setup.root)?;
    record_report(&report, log);

    let mut syntax_failures = 0;
    if opts.syntax {
        log.stage("Checking syntax");
        let plan = output::plan(&setup.manifest, target.as_deref(), &setup.root)?;
        let files: Vec<_> = plan
            .files
            .iter()
            .map(|f| (f.shell, f.path()))
            .filter(|(_, path)| path.is_file())
            .collect();
        let syntax_report = syntax::check_syntax(&files, executor)?;
        for shell in &syntax_report.skipped {
            log.warn(&format!("{shell} not found on PATH, skipping syntax check"));
        }
        for issue in &syntax_report.issues {
            log.error(&format!("{} ({}): {}", issue.path.display(), issue.shell, issue.message));
        }
        log.info(&format!("{} file(s) parsed", syntax_report.checked));
        syntax_failures = syntax_report.issues.len();
    }

    log.print_summary();

    let drift = log.drift_count();
    if drift > 0 {
        bail!("{drift} file(s) out of sync with the manifest; run `shellgen generate`");
    }
    if syntax_failures > 0 {
        bail!("{syntax_failures} file(s) failed syntax check");
    }
    Ok(())
}

fn record_report(report: &SyncReport, log: &Logger) {
    let groups: [(&[PathBuf], FileStatus); 5] = [
        (&report.in_sync, FileStatus::InSync),
        (&report.missing, FileStatus::Missing),
        (&report.stale, FileStatus::Stale),
        (&report.unlisted, FileStatus::Unlisted),
        (&report.extra, FileStatus::Extra),
    ];
    for (paths, status) in groups {
        for path in paths {
            let display = describe(path, status);
            if status.is_drift() {
                log.debug(&format!("{display}: {}", status.label()));
            }
            log.record_file(&display, status);
        }
    }
}

/// Ledger findings name the ledger entry; everything else names the file.
fn describe(path: &Path, status: FileStatus) -> String {
    match status {
        FileStatus::Unlisted | FileStatus::Extra => {
            format!("{} in {}", path.display(), output::LEDGER_FILENAME)
        }
        _ => path.display().to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cli::SourceOpts;
    use crate::config::{Settings, manifest::Manifest};
    use crate::exec::{ExecResult, MockExecutor};

    fn setup(root: &Path) -> CommandSetup {
        CommandSetup {
            root: root.to_path_buf(),
            settings: Settings::default(),
            manifest: Manifest::from_yaml_str(
                "modules:\n- {name: eza, prefix: '40', description: eza, aliases: {ls: eza}}\n",
                Path::new("t.yaml"),
            )
            .unwrap(),
        }
    }

    fn opts(syntax: bool) -> CheckOpts {
        CheckOpts {
            source: SourceOpts::default(),
            target: None,
            syntax,
        }
    }

    fn no_commands() -> MockExecutor {
        let mut executor = MockExecutor::new();
        executor.expect_which().never();
        executor.expect_run_unchecked().never();
        executor
    }

    #[test]
    fn fresh_tree_is_out_of_sync() {
        let dir = tempfile::tempdir().unwrap();
        let log = Logger::new();
        let err = execute(&setup(dir.path()), &opts(false), &no_commands(), &log).unwrap_err();
        assert!(err.to_string().contains("out of sync"));
        assert_eq!(log.count(FileStatus::Missing), 4);
        assert_eq!(log.count(FileStatus::Unlisted), 4);
    }

    #[test]
    fn generated_tree_is_in_sync() {
        let dir = tempfile::tempdir().unwrap();
        let setup = setup(dir.path());
        output::generate_all(&setup.manifest, None, dir.path()).unwrap();
        let log = Logger::new();
        execute(&setup, &opts(false), &no_commands(), &log).unwrap();
        assert_eq!(log.count(FileStatus::InSync), 4);
        assert_eq!(log.drift_count(), 0);
    }

    #[test]
    fn syntax_failures_fail_the_check() {
        let dir = tempfile::tempdir().unwrap();
        let setup = setup(dir.path());
        output::generate_all(&setup.manifest, None, dir.path()).unwrap();

        let mut executor = MockExecutor::new();
        executor.expect_which().returning(|program| program == "bash");
        executor.expect_run_unchecked().times(1).returning(|_, _| {
            Ok(ExecResult {
                stderr: "syntax error".to_string(),
                success: false,
                code: Some(2),
                ..ExecResult::default()
            })
        });

        let log = Logger::new();
        let err = execute(&setup, &opts(true), &executor, &log).unwrap_err();
        assert!(err.to_string().contains("failed syntax check"));
        assert_eq!(log.warning_count(), 3);
        assert_eq!(log.error_count(), 1);
    }
}
