//! Configuration: the YAML manifest, its typed model and validation, plus
//! the optional TOML settings file.
//!
//! - **[`manifest`]** — load, resolve and merge manifest sources
//! - **[`model`]** — typed functions, modules, guards and conditionals
//! - **[`validation`]** — exhaustive manifest checks
//! - **[`toml_loader`]** — settings file parsing
pub mod manifest;
pub mod model;
pub mod toml_loader;
pub mod validation;

use anyhow::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use manifest::{MANIFEST_DIR, MANIFEST_FILENAME};

/// Settings filename inside [`MANIFEST_DIR`].
pub const SETTINGS_FILENAME: &str = "config.toml";

/// Optional defaults read from `<root>/.shellgen/config.toml`.
///
/// Command-line arguments always take precedence.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Manifest sources used when none are given on the command line.
    /// Relative entries are resolved against the source root.
    pub sources: Vec<String>,
    /// Output target used when `--target` is not given.
    pub target: Option<PathBuf>,
}

impl Settings {
    /// Load settings for `root`; a missing file yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(root: &Path) -> Result<Self> {
        toml_loader::load_config(&Self::path(root))
    }

    /// Location of the settings file for `root`.
    #[must_use]
    pub fn path(root: &Path) -> PathBuf {
        root.join(MANIFEST_DIR).join(SETTINGS_FILENAME)
    }

    /// Sources to use when none were supplied explicitly: the configured
    /// list, else the conventional manifest under `root`.
    #[must_use]
    pub fn default_sources(&self, root: &Path) -> Vec<PathBuf> {
        if self.sources.is_empty() {
            return vec![default_manifest_path(root)];
        }
        self.sources
            .iter()
            .map(|s| root.join(expand_home(Path::new(s))))
            .collect()
    }
}

/// Expand a leading `~` to the user's home directory.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// `<root>/.shellgen/shell.yaml`.
#[must_use]
pub fn default_manifest_path(root: &Path) -> PathBuf {
    root.join(MANIFEST_DIR).join(MANIFEST_FILENAME)
}
