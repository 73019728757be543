//! systemd user service running the autosync daemon.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::helpers::fs::ensure_parent_dir;
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Name of the installed unit.
pub const UNIT_NAME: &str = "dotdav.service";

/// A systemd user unit file that is written, then enabled and started.
#[derive(Clone)]
pub struct ServiceUnitResource {
    /// Where the unit file lives.
    pub path: PathBuf,
    /// Full unit file contents.
    pub contents: String,
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for ServiceUnitResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceUnitResource")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl ServiceUnitResource {
    /// Create a resource for an explicit unit path and contents.
    #[must_use]
    pub fn new(path: PathBuf, contents: String, executor: Arc<dyn Executor>) -> Self {
        Self {
            path,
            contents,
            executor,
        }
    }

    /// The autosync unit under `~/.config/systemd/user`, running `exe`
    /// against `root`.
    #[must_use]
    pub fn autosync(home: &Path, exe: &Path, root: &Path, executor: Arc<dyn Executor>) -> Self {
        let path = home
            .join(".config")
            .join("systemd")
            .join("user")
            .join(UNIT_NAME);
        Self::new(path, render_unit(exe, root), executor)
    }

    fn systemctl(&self, args: &[&str]) -> Result<bool> {
        let mut full = vec!["--user".to_string()];
        full.extend(args.iter().map(ToString::to_string));
        let result = self.executor.run_unchecked("systemctl", &full)?;
        Ok(result.success)
    }
}

/// Render the unit file for `exe --root <root> autosync`.
#[must_use]
pub fn render_unit(exe: &Path, root: &Path) -> String {
    format!(
        "[Unit]\n\
         Description=Dotfile AutoSync Service\n\
         After=network.target\n\
         \n\
         [Service]\n\
         ExecStart=\"{}\" --root \"{}\" autosync\n\
         Restart=always\n\
         RestartSec=10\n\
         \n\
         [Install]\n\
         WantedBy=default.target\n",
        exe.display(),
        root.display()
    )
}

impl Applicable for ServiceUnitResource {
    fn description(&self) -> String {
        format!("{UNIT_NAME} ({})", self.path.display())
    }

    /// Write the unit if it differs, then reload, enable and start it. An
    /// identical unit that is already enabled and active is left alone.
    fn apply(&self) -> Result<ResourceChange> {
        let up_to_date = self.current_state()? == ResourceState::Correct;
        if !up_to_date {
            ensure_parent_dir(&self.path)?;
            std::fs::write(&self.path, &self.contents)
                .with_context(|| format!("write unit file: {}", self.path.display()))?;
        }

        if !self.executor.which("systemctl") {
            return Ok(ResourceChange::Skipped {
                reason: "unit written, but systemctl not found".to_string(),
            });
        }
        if up_to_date
            && self.systemctl(&["is-enabled", "--quiet", UNIT_NAME])?
            && self.systemctl(&["is-active", "--quiet", UNIT_NAME])?
        {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.systemctl(&["daemon-reload"])?;
        if !self.systemctl(&["enable", "--now", UNIT_NAME])? {
            return Ok(ResourceChange::Skipped {
                reason: format!("unit written, but failed to enable {UNIT_NAME}"),
            });
        }
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if self.path.symlink_metadata().is_err() {
            return Ok(ResourceChange::Skipped {
                reason: "service file not found".to_string(),
            });
        }
        let systemctl = self.executor.which("systemctl");
        if systemctl {
            self.systemctl(&["stop", UNIT_NAME])?;
            self.systemctl(&["disable", UNIT_NAME])?;
        }
        std::fs::remove_file(&self.path)
            .with_context(|| format!("remove unit file: {}", self.path.display()))?;
        if systemctl {
            self.systemctl(&["daemon-reload"])?;
        }
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ServiceUnitResource {
    fn current_state(&self) -> Result<ResourceState> {
        match std::fs::read_to_string(&self.path) {
            Ok(existing) if existing == self.contents => Ok(ResourceState::Correct),
            Ok(_) => Ok(ResourceState::Incorrect {
                current: "unit file differs".to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ResourceState::Missing),
            Err(e) => Err(e).with_context(|| format!("read unit file: {}", self.path.display())),
        }
    }
}
