//! Domain-specific error types for the shell transpiler.
//!
//! Library modules return [`ShellgenError`]; command handlers at the CLI
//! boundary convert it to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error taxonomy
//!
//! ```text
//! ShellgenError
//! ├── NoSources          — no manifest source resolved (fatal)
//! ├── Io / Parse         — filesystem access, or parsing a manifest file
//! ├── InvalidManifest    — the document root has the wrong shape
//! ├── Validation         — batched manifest-shape violations
//! ├── InvalidItem        — an item failed typed conversion
//! └── UnknownGuard / UnknownPredicate — registry miss at render time
//! ```
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for manifest loading, validation and rendering.
#[derive(Error, Debug)]
pub enum ShellgenError {
    /// None of the requested source paths resolved to a manifest file.
    #[error("no valid source files found")]
    NoSources,

    /// A filesystem operation on a manifest or generated file failed.
    #[error("IO error on {path}: {source}")]
    Io {
        /// Path the operation was on.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The manifest is not valid YAML.
    #[error("invalid YAML in {path}: {source}")]
    Parse {
        /// Path of the offending document.
        path: PathBuf,
        /// Underlying parser error.
        source: serde_yaml::Error,
    },

    /// The manifest document parsed but has the wrong top-level shape.
    #[error("invalid manifest {path}: {message}")]
    InvalidManifest {
        /// Path of the offending document.
        path: PathBuf,
        /// Human-readable description of the problem.
        message: String,
    },

    /// The merged manifest failed validation; every violation is listed.
    #[error("manifest validation failed with {} error(s)", .0.len())]
    Validation(Vec<String>),

    /// An item could not be converted to its typed form.
    #[error("{item}: {message}")]
    InvalidItem {
        /// Item context (e.g. `module 'eza'`).
        item: String,
        /// Human-readable description of the problem.
        message: String,
    },

    /// A guard name is missing from the registry or used with the wrong parameter shape.
    #[error("unknown guard: {0}")]
    UnknownGuard(String),

    /// A predicate name is missing from the registry.
    #[error("unknown predicate: {0}")]
    UnknownPredicate(String),
}

impl ShellgenError {
    /// Build an [`InvalidItem`](Self::InvalidItem) from a context and message list.
    pub(crate) fn invalid_item(item: impl Into<String>, messages: &[String]) -> Self {
        Self::InvalidItem {
            item: item.into(),
            message: messages.join("; "),
        }
    }
}

/// Convenience alias for results carrying a [`ShellgenError`].
pub type Result<T, E = ShellgenError> = std::result::Result<T, E>;
