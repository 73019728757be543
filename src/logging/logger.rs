//! Structured logger with per-entry outcome collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::STAGE_TARGET;
use super::types::{Entry, EntryStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
///
/// The `record` method is **not** included because its signature differs
/// from the `fn(&self, &str)` pattern shared by the display methods.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with summary collection.
///
/// Messages are emitted as [`tracing`] events; the subscriber installed by
/// [`init_subscriber`](super::subscriber::init_subscriber) writes them to the
/// console and to `$XDG_CACHE_HOME/dotdav/<command>.log`.
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<Entry>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a new logger for `command`.
    ///
    /// Stores the log file path for display in the summary; the file itself
    /// is created by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self::with_log_file(log_file_path(command))
    }

    /// Create a logger that reports `log_file` in its summary.
    #[must_use]
    pub const fn with_log_file(log_file: Option<PathBuf>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Return a clone of all recorded entries.
    #[must_use]
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
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

    /// Log a debug message (suppressed on console unless verbose; always
    /// written to the log file).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Record an entry result for the summary.
    pub fn record(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(Entry {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Count entries that conflicted or failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.lock().map_or(0, |guard| {
            guard.iter().filter(|e| e.status.is_failure()).count()
        })
    }

    /// Return `true` if any recorded entry conflicted or failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Print one line per recorded entry followed by the totals.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        println!();
        self.stage("Summary");
        for entry in &entries {
            let (icon, color) = badge(entry.status);
            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));
            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        println!();
        self.info(&Tally::of(&entries).to_string());
        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

/// Icon and ANSI color for a summary line.
const fn badge(status: EntryStatus) -> (&'static str, &'static str) {
    match status {
        EntryStatus::Ok => ("✓", "\x1b[32m"),
        EntryStatus::UpToDate => ("=", "\x1b[2m"),
        EntryStatus::Skipped => ("○", "\x1b[33m"),
        EntryStatus::Warning => ("!", "\x1b[33m"),
        EntryStatus::Conflict => ("≠", "\x1b[31m"),
        EntryStatus::Failed => ("✗", "\x1b[31m"),
    }
}

/// Per-status counts shown under the summary.
#[derive(Debug, Default, PartialEq, Eq)]
struct Tally {
    linked: usize,
    up_to_date: usize,
    skipped: usize,
    warnings: usize,
    conflicts: usize,
    failed: usize,
}

impl Tally {
    fn of(entries: &[Entry]) -> Self {
        entries.iter().fold(Self::default(), |mut t, e| {
            match e.status {
                EntryStatus::Ok => t.linked += 1,
                EntryStatus::UpToDate => t.up_to_date += 1,
                EntryStatus::Skipped => t.skipped += 1,
                EntryStatus::Warning => t.warnings += 1,
                EntryStatus::Conflict => t.conflicts += 1,
                EntryStatus::Failed => t.failed += 1,
            }
            t
        })
    }
}

impl std::fmt::Display for Tally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = [
            (self.linked, "linked", "\x1b[32m"),
            (self.up_to_date, "up to date", "\x1b[2m"),
            (self.skipped, "skipped", "\x1b[33m"),
            (self.warnings, "warnings", "\x1b[33m"),
            (self.conflicts, "conflicts", "\x1b[31m"),
            (self.failed, "failed", "\x1b[31m"),
        ];
        let total: usize = parts.iter().map(|(n, _, _)| n).sum();
        write!(f, "{total} tracked file(s):")?;
        let mut first = true;
        for (n, label, color) in parts.into_iter().filter(|(n, _, _)| *n > 0) {
            let sep = if first { " " } else { ", " };
            first = false;
            write!(f, "{sep}{color}{n} {label}\x1b[0m")?;
        }
        Ok(())
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error);

    fn record(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        self.record(name, status, message);
    }
}
