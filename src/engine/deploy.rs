//! Reconciles the user's filesystem against the repository via symlinks.
use rayon::prelude::*;
use std::path::PathBuf;

use super::identity::TrackedKey;
use crate::config::mappings::ProfileMap;
use crate::config::{MappingStore, Settings};
use crate::error::DotdavError;
use crate::logging::EntryStatus;
use crate::resources::helpers::fs::ensure_parent_dir;
use crate::resources::symlink::SymlinkResource;
use crate::resources::{Applicable as _, Resource as _, ResourceState};

/// Successful per-entry outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployed {
    /// A symlink was created (replacing the destination under `--force`).
    Linked,
    /// The destination already resolved to the artifact.
    UpToDate,
}

/// Deploy result for one tracked file.
#[derive(Debug)]
pub struct DeployReport {
    /// Mapping key.
    pub key: String,
    /// Where the symlink lives on this machine.
    pub destination: PathBuf,
    /// What happened.
    pub outcome: Result<Deployed, DotdavError>,
}

impl DeployReport {
    /// Summary status for this entry.
    #[must_use]
    pub const fn status(&self) -> EntryStatus {
        match &self.outcome {
            Ok(Deployed::Linked) => EntryStatus::Ok,
            Ok(Deployed::UpToDate) => EntryStatus::UpToDate,
            Err(DotdavError::NoArtifactForProfile { .. }) => EntryStatus::Skipped,
            Err(DotdavError::MissingArtifact { .. }) => EntryStatus::Warning,
            Err(DotdavError::Conflict(_)) => EntryStatus::Conflict,
            Err(_) => EntryStatus::Failed,
        }
    }
}

/// Creates and repairs one symlink per tracked file for the current profile.
///
/// Entries are independent: a failure is reported for that entry and the
/// rest proceed. The mapping store is only read.
#[derive(Debug)]
pub struct DeployEngine<'a> {
    settings: &'a Settings,
    store: &'a MappingStore,
    parallel: bool,
}

impl<'a> DeployEngine<'a> {
    /// Create an engine; `parallel` processes entries on the rayon pool.
    #[must_use]
    pub const fn new(settings: &'a Settings, store: &'a MappingStore, parallel: bool) -> Self {
        Self {
            settings,
            store,
            parallel,
        }
    }

    /// Reconcile every tracked file, returning reports in key order.
    ///
    /// Without `force`, a destination occupied by anything other than a
    /// symlink to the artifact is left untouched and reported as a conflict.
    /// With `force` it is removed (directory trees included) and replaced.
    #[must_use]
    pub fn deploy(&self, force: bool) -> Vec<DeployReport> {
        let entries: Vec<(&str, &ProfileMap)> = self.store.iter().collect();
        let run = |&(key, _): &(&str, &ProfileMap)| self.deploy_one(key, force);
        if self.parallel {
            entries.par_iter().map(run).collect()
        } else {
            entries.iter().map(run).collect()
        }
    }

    fn deploy_one(&self, key: &str, force: bool) -> DeployReport {
        let destination = TrackedKey::parse(key).destination(&self.settings.home);
        let outcome = self.reconcile(key, &destination, force);
        DeployReport {
            key: key.to_string(),
            destination,
            outcome,
        }
    }

    fn reconcile(
        &self,
        key: &str,
        destination: &std::path::Path,
        force: bool,
    ) -> Result<Deployed, DotdavError> {
        let profile = &self.settings.current_profile;
        let resolution =
            self.store
                .resolve(key, profile)
                .ok_or_else(|| DotdavError::NoArtifactForProfile {
                    key: key.to_string(),
                    profile: profile.clone(),
                })?;
        let artifact = self.settings.repo_dir().join(resolution.artifact);
        let artifact =
            dunce::canonicalize(&artifact).map_err(|_| DotdavError::MissingArtifact {
                key: key.to_string(),
                artifact,
            })?;

        let link_failure = |e: anyhow::Error| DotdavError::LinkFailure {
            destination: destination.to_path_buf(),
            reason: format!("{e:#}"),
        };
        ensure_parent_dir(destination).map_err(link_failure)?;

        let resource = SymlinkResource::new(artifact, destination.to_path_buf());
        match resource.current_state().map_err(link_failure)? {
            ResourceState::Correct => return Ok(Deployed::UpToDate),
            ResourceState::Missing => {}
            ResourceState::Incorrect { current } | ResourceState::Invalid { reason: current } => {
                if !force {
                    return Err(DotdavError::Conflict(destination.to_path_buf()));
                }
                tracing::debug!("replacing {} ({current})", destination.display());
            }
        }
        resource.apply().map_err(link_failure)?;
        Ok(Deployed::Linked)
    }
}
