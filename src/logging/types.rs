//! Core logging types: per-entry outcomes and the [`Log`] trait.

/// Outcome recorded for one tracked file (or one transfer) for summary reporting.
#[derive(Debug, Clone)]
pub struct Entry {
    /// Tracked-file key or transfer label.
    pub name: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail message (e.g., skip reason or error description).
    pub message: Option<String>,
}

/// Status of a processed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// A change was applied (symlink created, transfer completed).
    Ok,
    /// Nothing to do; the filesystem already matched.
    UpToDate,
    /// Entry does not apply to the active profile.
    Skipped,
    /// Entry could not be processed, but nothing is broken by it.
    Warning,
    /// Destination occupied by unrelated content; left untouched.
    Conflict,
    /// Entry failed.
    Failed,
}

impl EntryStatus {
    /// Whether this status should make the command exit non-zero.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Conflict | Self::Failed)
    }
}

/// Abstraction over logging backends.
///
/// Engine code logs through this trait so it stays independent of the
/// concrete [`Logger`](super::logger::Logger) and can run against a silent
/// logger in tests.
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
    /// Record an entry result for the summary.
    fn record(&self, name: &str, status: EntryStatus, message: Option<&str>);
}
