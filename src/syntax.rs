//! Parse-only checks of generated files with the real shell interpreters.
//!
//! Each shell's own parser is invoked without executing anything. Shells
//! whose interpreter is not on PATH are skipped and reported as such.
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::exec::Executor;
use crate::shell::{PerShell, Shell};

/// Interpreter binary used to parse each shell's files.
const INTERPRETERS: PerShell<&str> = PerShell {
    fish: "fish",
    zsh: "zsh",
    bash: "bash",
    pwsh: "pwsh",
};

/// A file the interpreter rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub path: PathBuf,
    pub shell: Shell,
    pub message: String,
}

/// Outcome of a syntax-check run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxReport {
    /// Number of files an interpreter parsed.
    pub checked: usize,
    /// Shells with files to check but no interpreter on PATH.
    pub skipped: Vec<Shell>,
    pub issues: Vec<SyntaxIssue>,
}

impl SyntaxReport {
    /// Returns `true` if no interpreter rejected a file.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Arguments that make `shell`'s interpreter parse `path` without running it.
#[must_use]
pub fn parse_args(shell: Shell, path: &Path) -> Vec<String> {
    let path = path.display().to_string();
    match shell {
        Shell::Fish => vec!["--no-execute".to_string(), path],
        Shell::Zsh | Shell::Bash => vec!["-n".to_string(), path],
        Shell::PowerShell => {
            let quoted = path.replace('\'', "''");
            vec![
                "-NoProfile".to_string(),
                "-NonInteractive".to_string(),
                "-Command".to_string(),
                format!(
                    "$errors = $null; \
                     [void][System.Management.Automation.Language.Parser]::ParseFile('{quoted}', [ref]$null, [ref]$errors); \
                     if ($errors) {{ $errors | ForEach-Object {{ $_.Message }}; exit 1 }}"
                ),
            ]
        }
    }
}

/// Parse-check each `(shell, path)` pair with the matching interpreter.
///
/// # Errors
///
/// Returns an error if an available interpreter cannot be spawned.
pub fn check_syntax(files: &[(Shell, PathBuf)], executor: &dyn Executor) -> Result<SyntaxReport> {
    let mut report = SyntaxReport::default();
    let mut available: PerShell<Option<bool>> = PerShell::default();

    for (shell, path) in files {
        let shell = *shell;
        let interpreter = *INTERPRETERS.get(shell);
        let found = *available
            .get_mut(shell)
            .get_or_insert_with(|| executor.which(interpreter));
        if !found {
            if !report.skipped.contains(&shell) {
                report.skipped.push(shell);
            }
            continue;
        }

        let args = parse_args(shell, path);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = executor.run_unchecked(interpreter, &arg_refs)?;
        report.checked += 1;
        if !result.success {
            let output = if result.stderr.trim().is_empty() {
                result.stdout.trim()
            } else {
                result.stderr.trim()
            };
            report.issues.push(SyntaxIssue {
                path: path.clone(),
                shell,
                message: output.to_string(),
            });
        }
    }

    Ok(report)
}
