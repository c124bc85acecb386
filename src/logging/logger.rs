//! Structured logger with per-file summary collection.
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::subscriber::STAGE_TARGET;
use super::types::{FileEntry, FileStatus, Log};

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Console logger that counts warnings and errors and collects file outcomes.
#[derive(Debug, Default)]
pub struct Logger {
    files: Mutex<Vec<FileEntry>>,
    warnings: AtomicUsize,
    errors: AtomicUsize,
}

impl Logger {
    /// Create a new logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        self.warnings.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{msg}");
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        tracing::info!(target: STAGE_TARGET, "{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record a file outcome for the summary.
    pub fn record_file(&self, path: &str, status: FileStatus) {
        if let Ok(mut guard) = self.files.lock() {
            guard.push(FileEntry {
                path: path.to_string(),
                status,
            });
        }
    }

    /// Number of warnings logged so far.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Number of errors logged so far.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Count recorded files with the given status.
    #[must_use]
    pub fn count(&self, status: FileStatus) -> usize {
        self.files
            .lock()
            .map_or(0, |guard| guard.iter().filter(|f| f.status == status).count())
    }

    /// Count recorded entries that indicate drift.
    #[must_use]
    pub fn drift_count(&self) -> usize {
        self.files.lock().map_or(0, |guard| {
            guard.iter().filter(|f| f.status.is_drift()).count()
        })
    }

    /// Return a clone of all recorded entries (test-only).
    #[cfg(test)]
    pub(crate) fn file_entries(&self) -> Vec<FileEntry> {
        self.files.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Print a one-line count per status seen, drifted entries listed first.
    pub fn print_summary(&self) {
        let files = match self.files.lock() {
            Ok(guard) => guard.clone(),
            Err(_) => return,
        };
        if files.is_empty() {
            return;
        }

        self.stage("Summary");
        for entry in files.iter().filter(|f| f.status.is_drift()) {
            self.info(&format!(
                "\x1b[31m✗ {} ({})\x1b[0m",
                entry.path,
                entry.status.label()
            ));
        }

        let statuses = [
            (FileStatus::Written, "\x1b[32m"),
            (FileStatus::InSync, "\x1b[32m"),
            (FileStatus::Missing, "\x1b[31m"),
            (FileStatus::Stale, "\x1b[31m"),
            (FileStatus::Unlisted, "\x1b[33m"),
            (FileStatus::Extra, "\x1b[33m"),
        ];
        let parts: Vec<String> = statuses
            .iter()
            .filter_map(|&(status, color)| {
                let n = files.iter().filter(|f| f.status == status).count();
                (n > 0).then(|| format!("{color}{n} {}\x1b[0m", status.label()))
            })
            .collect();
        self.info(&format!("{} file(s): {}", files.len(), parts.join(", ")));
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record_file(&self, path: &str, status: FileStatus) {
        self.record_file(path, status);
    }
}
