//! Recursive change notifications for the repository.
use anyhow::{Context as _, Result};
use notify::event::{CreateKind, RemoveKind};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use std::fmt;
use std::path::Path;

use crate::config::IgnoreSet;

/// Whether `event` should schedule a push.
///
/// Reads never qualify, nor do events about directories themselves. An
/// event qualifies when at least one of its paths is not a directory and its
/// basename matches no ignore pattern.
#[must_use]
pub fn is_qualifying(event: &Event, ignores: &IgnoreSet) -> bool {
    match event.kind {
        EventKind::Access(_)
        | EventKind::Create(CreateKind::Folder)
        | EventKind::Remove(RemoveKind::Folder) => false,
        _ => event
            .paths
            .iter()
            .any(|p| !p.is_dir() && !ignores.matches_path(p)),
    }
}

/// Watches a directory tree and calls back on qualifying changes.
///
/// Dropping the watcher stops notifications.
pub struct ChangeWatcher {
    _watcher: RecommendedWatcher,
}

impl fmt::Debug for ChangeWatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeWatcher").finish_non_exhaustive()
    }
}

impl ChangeWatcher {
    /// Start watching `root` recursively.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform watcher cannot be created or `root`
    /// cannot be watched.
    pub fn start<F>(root: &Path, ignores: IgnoreSet, on_change: F) -> Result<Self>
    where
        F: Fn() + Send + 'static,
    {
        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) if is_qualifying(&event, &ignores) => {
                    tracing::debug!("change: {:?} {:?}", event.kind, event.paths);
                    on_change();
                }
                Ok(_) => {}
                Err(e) => tracing::warn!("watch error: {e}"),
            })
            .context("create filesystem watcher")?;
        watcher
            .watch(root, RecursiveMode::Recursive)
            .with_context(|| format!("watch {}", root.display()))?;
        Ok(Self { _watcher: watcher })
    }
}
