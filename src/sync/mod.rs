//! Repository transfer to and from the remote, and the autosync daemon.
pub mod daemon;
pub mod debounce;
pub mod gate;
pub mod rclone;
pub mod shutdown;
pub mod watcher;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::config::Settings;
use crate::error::DotdavError;
pub use daemon::{AutoSyncDaemon, DaemonHandle};
pub use debounce::{DebounceHandle, Debouncer};
pub use gate::SyncGate;
pub use rclone::RcloneClient;
pub use shutdown::ShutdownSignal;
pub use watcher::ChangeWatcher;

/// Which way a transfer mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Local repository to remote.
    Push,
    /// Remote to local repository.
    Pull,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Push => "push",
            Self::Pull => "pull",
        })
    }
}

/// One-directional mirror transfer between two locations.
///
/// Implementations make `destination` match `source`, skipping entries that
/// match any of `excludes`. Output is not interpreted; any failure is
/// returned as an error.
#[cfg_attr(test, mockall::automock)]
pub trait RemoteSyncClient: Send + Sync {
    /// Mirror `source` onto `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error if the transfer did not complete successfully.
    fn mirror(&self, source: &str, destination: &str, excludes: &[String]) -> anyhow::Result<()>;
}

/// Runs push and pull transfers for one repository, serialised by a
/// [`SyncGate`].
#[derive(Clone)]
pub struct Syncer {
    client: Arc<dyn RemoteSyncClient>,
    gate: SyncGate,
    local: String,
    remote: String,
    excludes: Vec<String>,
}

impl fmt::Debug for Syncer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Syncer")
            .field("local", &self.local)
            .field("remote", &self.remote)
            .field("excludes", &self.excludes)
            .finish_non_exhaustive()
    }
}

impl Syncer {
    /// Create a syncer between `local` and the `remote` endpoint.
    #[must_use]
    pub fn new(
        client: Arc<dyn RemoteSyncClient>,
        gate: SyncGate,
        local: &Path,
        remote: String,
        excludes: Vec<String>,
    ) -> Self {
        Self {
            client,
            gate,
            local: local.to_string_lossy().into_owned(),
            remote,
            excludes,
        }
    }

    /// Build a syncer for the configured repository and remote.
    ///
    /// # Errors
    ///
    /// Returns [`DotdavError::RemoteNotConfigured`] when no remote is set.
    pub fn from_settings(
        settings: &Settings,
        client: Arc<dyn RemoteSyncClient>,
        gate: SyncGate,
    ) -> Result<Self, DotdavError> {
        Ok(Self::new(
            client,
            gate,
            &settings.repo_dir(),
            settings.remote_url()?,
            settings.ignores.patterns().to_vec(),
        ))
    }

    /// The remote endpoint.
    #[must_use]
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Run one transfer while holding the gate.
    ///
    /// # Errors
    ///
    /// Returns [`DotdavError::TransferFailure`] if the client reports failure.
    pub fn transfer(&self, direction: Direction) -> Result<(), DotdavError> {
        let (source, destination) = match direction {
            Direction::Push => (&self.local, &self.remote),
            Direction::Pull => (&self.remote, &self.local),
        };
        let _guard = self.gate.acquire();
        tracing::debug!("{direction}: {source} -> {destination}");
        self.client
            .mirror(source, destination, &self.excludes)
            .map_err(|e| DotdavError::TransferFailure {
                direction: direction.to_string(),
                reason: format!("{e:#}"),
            })
    }
}
