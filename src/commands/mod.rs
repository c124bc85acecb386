pub mod check;
pub mod generate;
pub mod validate;
pub mod version;

use std::io::{BufRead, IsTerminal as _};
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::cli::{GlobalOpts, SourceOpts};
use crate::config::{Settings, expand_home};
use crate::config::manifest::{self, Manifest};
use crate::config::validation;
use crate::error::ShellgenError;
use crate::logging::Logger;

/// Environment variable naming the source root when `--root` is not given.
pub const ROOT_ENV: &str = "SHELLGEN_ROOT";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates root resolution, settings loading, source collection,
/// merging and validation so that each command does not have to repeat
/// the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    pub root: PathBuf,
    pub settings: Settings,
    pub manifest: Manifest,
}

impl CommandSetup {
    /// Resolve the root, read sources from stdin (when piped) and arguments,
    /// then load, merge and validate the manifest.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings file is invalid, no source resolves,
    /// a source fails to load, or the merged manifest fails validation.
    pub fn init(global: &GlobalOpts, opts: &SourceOpts, log: &Logger) -> Result<Self> {
        let stdin_sources = if global.stdin && !std::io::stdin().is_terminal() {
            read_source_lines(std::io::stdin().lock())
        } else {
            Vec::new()
        };
        Self::from_sources(global, stdin_sources, opts, log)
    }

    /// Like [`init`](Self::init), with stdin lines supplied by the caller.
    ///
    /// # Errors
    ///
    /// See [`init`](Self::init).
    pub fn from_sources(
        global: &GlobalOpts,
        stdin_sources: Vec<String>,
        opts: &SourceOpts,
        log: &Logger,
    ) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));
        let settings = Settings::load(&root)?;

        log.stage("Resolving sources");
        let requested = collect_sources(stdin_sources, &opts.sources, &settings, &root);
        let resolved = manifest::resolve_sources(&requested, log);
        if resolved.is_empty() {
            log.error("no valid source files found");
            return Err(ShellgenError::NoSources.into());
        }
        for path in &resolved {
            log.info(&format!("source: {}", path.display()));
        }

        log.stage("Loading manifest");
        let manifest = manifest::load_sources(&resolved, log)?;
        log.info(&format!(
            "{} function(s), {} module(s)",
            manifest.functions.len(),
            manifest.modules.len()
        ));

        let errors = validation::validate_manifest(&manifest);
        if !errors.is_empty() {
            log.error(&format!("found {} validation error(s):", errors.len()));
            for error in &errors {
                log.error(&format!("  {error}"));
            }
            return Err(ShellgenError::Validation(errors).into());
        }

        Ok(Self {
            root,
            settings,
            manifest,
        })
    }

    /// Output target: the command-line value, else the configured one.
    #[must_use]
    pub fn target(&self, cli_target: Option<&Path>) -> Option<PathBuf> {
        cli_target
            .map(Path::to_path_buf)
            .or_else(|| self.settings.target.as_deref().map(expand_home))
    }
}

/// Resolve the source root: `--root`, else [`ROOT_ENV`], else the current
/// directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    if let Some(ref root) = global.root {
        return Ok(root.clone());
    }
    if let Ok(root) = std::env::var(ROOT_ENV)
        && !root.is_empty()
    {
        return Ok(PathBuf::from(root));
    }
    Ok(std::env::current_dir()?)
}

/// Non-empty trimmed lines from `reader`; unreadable input yields what was read.
pub fn read_source_lines(reader: impl BufRead) -> Vec<String> {
    reader
        .lines()
        .map_while(std::io::Result::ok)
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

/// Sources in precedence order: stdin lines then arguments; if both are
/// empty, the configured or conventional defaults.
#[must_use]
pub fn collect_sources(
    stdin_sources: Vec<String>,
    args: &[String],
    settings: &Settings,
    root: &Path,
) -> Vec<PathBuf> {
    let explicit: Vec<PathBuf> = stdin_sources
        .iter()
        .chain(args)
        .map(|raw| expand_home(Path::new(raw)))
        .collect();
    if explicit.is_empty() {
        settings.default_sources(root)
    } else {
        explicit
    }
}
