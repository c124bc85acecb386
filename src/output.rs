//! Output mapping, file writing and drift detection.
//!
//! Generation is planned in memory first ([`plan`]); [`generate_all`] writes
//! the plan and [`check_sync`] compares it with what is on disk.
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::manifest::Manifest;
use crate::error::{Result, ShellgenError};
use crate::render::{generate_function, generate_module};
use crate::shell::{PerShell, Shell};

/// Ledger filename written into every output directory that receives files.
pub const LEDGER_FILENAME: &str = ".gitignore";

/// First line of every ledger.
pub const LEDGER_HEADER: &str = "# Generated by generate_shell.py -- DO NOT EDIT";

/// Relative directory for one kind of output, under a real config target and
/// under the managed source tree.
#[derive(Debug, Clone, Copy)]
struct DirLayout {
    target: &'static str,
    source: &'static str,
}

const FUNCTION_DIRS: PerShell<DirLayout> = PerShell {
    fish: DirLayout {
        target: "fish/functions",
        source: "dot_config/fish/functions",
    },
    zsh: DirLayout {
        target: "zsh/.zfunctions",
        source: "dot_config/zsh/dot_zfunctions",
    },
    bash: DirLayout {
        target: "bash/functions",
        source: "dot_config/bash/functions",
    },
    pwsh: DirLayout {
        target: "powershell/functions",
        source: "dot_config/powershell/functions",
    },
};

const MODULE_DIRS: PerShell<DirLayout> = PerShell {
    fish: DirLayout {
        target: "fish/conf.d",
        source: "dot_config/fish/conf.d",
    },
    zsh: DirLayout {
        target: "zsh/.zshrc.d",
        source: "dot_config/zsh/dot_zshrc.d",
    },
    bash: DirLayout {
        target: "bash/bashrc.d",
        source: "dot_config/bash/bashrc.d",
    },
    pwsh: DirLayout {
        target: "powershell/conf.d",
        source: "dot_config/powershell/conf.d",
    },
};

/// Where one shell's generated files go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDirs {
    pub functions: PathBuf,
    pub modules: PathBuf,
}

/// Resolve output directories for every shell.
///
/// With a `target`, paths are the shells' real configuration locations under
/// it; without one, they point into the source tree under `root`.
#[must_use]
pub fn get_output_dirs(target: Option<&Path>, root: &Path) -> PerShell<OutputDirs> {
    PerShell::from_fn(|shell| {
        let (functions, modules) = (*FUNCTION_DIRS.get(shell), *MODULE_DIRS.get(shell));
        let (base, functions, modules) = target.map_or(
            (root, functions.source, modules.source),
            |base| (base, functions.target, modules.target),
        );
        OutputDirs {
            functions: base.join(functions),
            modules: base.join(modules),
        }
    })
}

/// One file the generator will write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub dir: PathBuf,
    pub file_name: String,
    pub shell: Shell,
    pub contents: String,
}

impl PlannedFile {
    /// Full destination path.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

/// Everything a generation run produces, computed without touching disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    /// Every output directory, whether or not it receives files.
    pub dirs: Vec<PathBuf>,
    /// Files in generation order: functions then modules, each across all shells.
    pub files: Vec<PlannedFile>,
}

impl Plan {
    /// Sorted generated filenames per directory that receives at least one file.
    #[must_use]
    pub fn ledgers(&self) -> BTreeMap<&Path, Vec<&str>> {
        let mut ledgers: BTreeMap<&Path, Vec<&str>> = BTreeMap::new();
        for file in &self.files {
            ledgers
                .entry(file.dir.as_path())
                .or_default()
                .push(file.file_name.as_str());
        }
        for names in ledgers.values_mut() {
            names.sort_unstable();
        }
        ledgers
    }
}

/// Ledger text for a directory's generated filenames.
#[must_use]
pub fn ledger_contents(names: &[&str]) -> String {
    let mut sorted = names.to_vec();
    sorted.sort_unstable();
    let mut text = String::from(LEDGER_HEADER);
    for name in sorted {
        text.push('\n');
        text.push_str(name);
    }
    text.push('\n');
    text
}

/// Render every function and module for every shell into a [`Plan`].
///
/// # Errors
///
/// Returns an error if an item fails typed conversion or rendering.
pub fn plan(manifest: &Manifest, target: Option<&Path>, root: &Path) -> Result<Plan> {
    let dirs = get_output_dirs(target, root);
    let functions = manifest.typed_functions()?;
    let modules = manifest.typed_modules()?;

    let mut files = Vec::with_capacity((functions.len() + modules.len()) * Shell::ALL.len());
    for func in &functions {
        for shell in Shell::ALL {
            files.push(PlannedFile {
                dir: dirs.get(shell).functions.clone(),
                file_name: format!("{}{}", func.name, shell.function_ext()),
                shell,
                contents: generate_function(func, shell)?,
            });
        }
    }
    for module in &modules {
        for shell in Shell::ALL {
            files.push(PlannedFile {
                dir: dirs.get(shell).modules.clone(),
                file_name: format!("{}{}", module.file_stem(), shell.module_ext()),
                shell,
                contents: generate_module(module, shell)?,
            });
        }
    }

    let all_dirs = Shell::ALL
        .iter()
        .flat_map(|&shell| {
            let d = dirs.get(shell);
            [d.functions.clone(), d.modules.clone()]
        })
        .collect();

    Ok(Plan {
        dirs: all_dirs,
        files,
    })
}

/// Generate every file and ledger, returning the written file paths in order.
///
/// # Errors
///
/// Returns an error if rendering fails or any filesystem operation fails.
pub fn generate_all(manifest: &Manifest, target: Option<&Path>, root: &Path) -> Result<Vec<PathBuf>> {
    let plan = plan(manifest, target, root)?;
    write_plan(&plan)
}

/// Write a computed plan to disk.
///
/// # Errors
///
/// Returns [`ShellgenError::Io`] for the first filesystem operation that fails.
pub fn write_plan(plan: &Plan) -> Result<Vec<PathBuf>> {
    for dir in &plan.dirs {
        fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;
    }

    let mut written = Vec::with_capacity(plan.files.len());
    for file in &plan.files {
        let path = file.path();
        fs::write(&path, &file.contents).map_err(|e| io_error(&path, e))?;
        written.push(path);
    }

    for (dir, names) in plan.ledgers() {
        let path = dir.join(LEDGER_FILENAME);
        fs::write(&path, ledger_contents(&names)).map_err(|e| io_error(&path, e))?;
    }

    Ok(written)
}

/// Differences between a generation plan and the tree on disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Files whose content matches.
    pub in_sync: Vec<PathBuf>,
    /// Expected files that do not exist.
    pub missing: Vec<PathBuf>,
    /// Files whose content differs from what would be generated.
    pub stale: Vec<PathBuf>,
    /// Expected files not listed in their directory's ledger.
    pub unlisted: Vec<PathBuf>,
    /// Ledger entries that would not be generated.
    pub extra: Vec<PathBuf>,
}

impl SyncReport {
    /// Returns `true` if nothing has drifted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
            && self.stale.is_empty()
            && self.unlisted.is_empty()
            && self.extra.is_empty()
    }
}

/// Compare what [`generate_all`] would write with the files on disk.
///
/// # Errors
///
/// Returns an error if rendering fails or an existing file cannot be read.
pub fn check_sync(manifest: &Manifest, target: Option<&Path>, root: &Path) -> Result<SyncReport> {
    let plan = plan(manifest, target, root)?;
    let mut report = SyncReport::default();

    for file in &plan.files {
        let path = file.path();
        match read_optional(&path)? {
            None => report.missing.push(path),
            Some(existing) if existing != file.contents => report.stale.push(path),
            Some(_) => report.in_sync.push(path),
        }
    }

    let ledgers = plan.ledgers();
    for dir in &plan.dirs {
        let expected: BTreeSet<&str> = ledgers
            .get(dir.as_path())
            .map(|names| names.iter().copied().collect())
            .unwrap_or_default();
        let listed: BTreeSet<String> = read_optional(&dir.join(LEDGER_FILENAME))?
            .map(|text| parse_ledger(&text))
            .unwrap_or_default();

        for name in &expected {
            if !listed.contains(*name) {
                report.unlisted.push(dir.join(name));
            }
        }
        for name in &listed {
            if !expected.contains(name.as_str()) {
                report.extra.push(dir.join(name));
            }
        }
    }

    Ok(report)
}

/// Filenames listed in a ledger, ignoring comments and blank lines.
#[must_use]
pub fn parse_ledger(text: &str) -> BTreeSet<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error(path, e)),
    }
}

fn io_error(path: &Path, source: io::Error) -> ShellgenError {
    ShellgenError::Io {
        path: path.to_path_buf(),
        source,
    }
}
