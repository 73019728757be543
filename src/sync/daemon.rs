//! Long-running autosync: periodic pull plus debounced push on change.
use anyhow::Context as _;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use super::debounce::Debouncer;
use super::shutdown::ShutdownSignal;
use super::watcher::ChangeWatcher;
use super::{Direction, Syncer};
use crate::config::{IgnoreSet, Settings};
use crate::error::DotdavError;
use crate::logging::Log;

/// Coordinates the puller, the change watcher and the push debouncer.
///
/// Both directions go through the same [`Syncer`], so they share one gate
/// and never overlap inside the client.
pub struct AutoSyncDaemon {
    syncer: Arc<Syncer>,
    repo_dir: PathBuf,
    ignores: IgnoreSet,
    interval: Duration,
    debounce: Duration,
    log: Arc<dyn Log>,
}

impl fmt::Debug for AutoSyncDaemon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AutoSyncDaemon")
            .field("syncer", &self.syncer)
            .field("repo_dir", &self.repo_dir)
            .field("interval", &self.interval)
            .field("debounce", &self.debounce)
            .finish_non_exhaustive()
    }
}

impl AutoSyncDaemon {
    /// Create a daemon watching `repo_dir`.
    #[must_use]
    pub fn new(
        syncer: Syncer,
        repo_dir: PathBuf,
        ignores: IgnoreSet,
        interval: Duration,
        debounce: Duration,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            syncer: Arc::new(syncer),
            repo_dir,
            ignores,
            interval,
            debounce,
            log,
        }
    }

    /// Create a daemon with the configured repository, ignores and timings.
    #[must_use]
    pub fn from_settings(settings: &Settings, syncer: Syncer, log: Arc<dyn Log>) -> Self {
        Self::new(
            syncer,
            settings.repo_dir(),
            settings.ignores.clone(),
            settings.sync_interval,
            settings.debounce,
            log,
        )
    }

    /// Start every background activity. The first pull runs immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the repository cannot be created or watched, or a
    /// worker thread cannot be spawned. Activities already started are
    /// stopped before returning.
    pub fn start(self, shutdown: ShutdownSignal) -> Result<DaemonHandle, DotdavError> {
        std::fs::create_dir_all(&self.repo_dir)
            .with_context(|| format!("create {}", self.repo_dir.display()))?;
        self.log.info(&format!(
            "autosync {} <-> {} (pull every {}s, push {}s after changes)",
            self.repo_dir.display(),
            self.syncer.remote(),
            self.interval.as_secs(),
            self.debounce.as_secs()
        ));

        let push_syncer = Arc::clone(&self.syncer);
        let push_log = Arc::clone(&self.log);
        let debouncer = Debouncer::spawn(self.debounce, move || {
            run_transfer(&push_syncer, Direction::Push, push_log.as_ref());
        })
        .context("spawn debounce worker")?;

        let trigger = debouncer.handle();
        let watcher = ChangeWatcher::start(&self.repo_dir, self.ignores.clone(), move || {
            trigger.trigger();
        })?;

        let pull_syncer = Arc::clone(&self.syncer);
        let pull_log = Arc::clone(&self.log);
        let pull_shutdown = shutdown.clone();
        let interval = self.interval;
        let puller = std::thread::Builder::new()
            .name("dotdav-pull".to_string())
            .spawn(move || {
                loop {
                    run_transfer(&pull_syncer, Direction::Pull, pull_log.as_ref());
                    if pull_shutdown.wait_timeout(interval) {
                        break;
                    }
                }
            })
            .context("spawn pull worker")?;

        Ok(DaemonHandle {
            shutdown,
            watcher: Some(watcher),
            debouncer: Some(debouncer),
            puller: Some(puller),
            log: self.log,
        })
    }
}

/// Run one transfer and log its start and outcome. Failures are logged and
/// never propagate, so the calling loop keeps going.
fn run_transfer(syncer: &Syncer, direction: Direction, log: &dyn Log) {
    match direction {
        Direction::Pull => log.info("pull started"),
        Direction::Push => log.info("changes detected, push started"),
    }
    match syncer.transfer(direction) {
        Ok(()) => log.info(&format!("{direction} finished")),
        Err(e) => log.error(&e.to_string()),
    }
}

/// Running daemon. Stopping it joins every background thread.
pub struct DaemonHandle {
    shutdown: ShutdownSignal,
    watcher: Option<ChangeWatcher>,
    debouncer: Option<Debouncer>,
    puller: Option<JoinHandle<()>>,
    log: Arc<dyn Log>,
}

impl fmt::Debug for DaemonHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DaemonHandle")
            .field("stopped", &self.shutdown.is_triggered())
            .finish_non_exhaustive()
    }
}

impl DaemonHandle {
    /// Block until the shutdown signal fires, then stop.
    pub fn wait(self) {
        self.shutdown.wait();
        self.stop();
    }

    /// Stop the watcher, discard a pending push, and join the debouncer and
    /// the puller. An in-flight transfer runs to completion first.
    pub fn stop(mut self) {
        self.shutdown.trigger();
        self.log.info("stopping autosync");
        drop(self.watcher.take());
        if let Some(debouncer) = self.debouncer.take() {
            debouncer.shutdown();
        }
        if let Some(puller) = self.puller.take()
            && puller.join().is_err()
        {
            self.log.error("pull worker panicked");
        }
    }
}
