//! Core logging types: per-file entries, their status, and the [`Log`] trait.

/// A generated file recorded for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path as displayed to the user.
    pub path: String,
    /// What happened to the file.
    pub status: FileStatus,
}

/// Outcome for one generated file or ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    /// File was written by `generate`.
    Written,
    /// File on disk matches what would be generated.
    InSync,
    /// Expected file does not exist.
    Missing,
    /// File exists but its content differs.
    Stale,
    /// Expected file is absent from its directory's ledger.
    Unlisted,
    /// Ledger lists a file that would not be generated.
    Extra,
}

impl FileStatus {
    /// Whether this status means the output tree has drifted.
    #[must_use]
    pub const fn is_drift(self) -> bool {
        !matches!(self, Self::Written | Self::InSync)
    }

    /// Short label used in the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::InSync => "in sync",
            Self::Missing => "missing",
            Self::Stale => "stale",
            Self::Unlisted => "unlisted",
            Self::Extra => "extra",
        }
    }
}

/// Abstraction over logging backends.
///
/// Library code logs through `&dyn Log` so tests can substitute an
/// isolated logger without touching the global subscriber.
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Record a file outcome for the summary.
    fn record_file(&self, path: &str, status: FileStatus);
}
