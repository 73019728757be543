//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::{Path, PathBuf};

use super::helpers::fs::{copy_dir_recursive, ensure_parent_dir, remove_path};
use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::config::IgnoreSet;

/// A symlink from a user path to a repository artifact.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The repository artifact (what the symlink points to).
    pub source: PathBuf,
    /// The user path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    /// Replace whatever is at the target (file, symlink or directory tree)
    /// with a symlink to the source.
    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;

        remove_path(&self.target)
            .with_context(|| format!("remove existing: {}", self.target.display()))?;

        create_symlink(&self.source, &self.target)
            .with_context(|| format!("create link: {}", self.target.display()))?;

        Ok(ResourceChange::Applied)
    }

    /// Replace the target with a real copy of the source, so the user keeps
    /// the content once the repository artifact is gone.
    fn remove(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        copy_into_place(&self.source, &self.target).with_context(|| {
            format!(
                "materialize {} -> {}",
                self.target.display(),
                self.source.display()
            )
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("repository artifact missing: {}", self.source.display()),
            });
        }

        let Ok(meta) = std::fs::symlink_metadata(&self.target) else {
            return Ok(ResourceState::Missing);
        };
        if !meta.is_symlink() {
            return Ok(if meta.is_dir() {
                ResourceState::Invalid {
                    reason: "destination is a real directory".to_string(),
                }
            } else {
                ResourceState::Incorrect {
                    current: "destination is a regular file".to_string(),
                }
            });
        }

        if resolves_to(&self.target, &self.source) {
            return Ok(ResourceState::Correct);
        }
        let points_at = std::fs::read_link(&self.target)
            .with_context(|| format!("read link: {}", self.target.display()))?;
        Ok(ResourceState::Incorrect {
            current: format!("links to {}", points_at.display()),
        })
    }
}

/// Whether `link` resolves (through any chain of symlinks) to the same
/// file as `source`.
#[must_use]
pub fn resolves_to(link: &Path, source: &Path) -> bool {
    match (dunce::canonicalize(link), dunce::canonicalize(source)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Replace whatever lives at `target` with a real copy of `source`.
///
/// The copy is staged in a uniquely named directory next to `target` and
/// renamed over it, so `target` is only absent between the remove and the
/// rename. The staging directory is deleted on every path out.
fn copy_into_place(source: &Path, target: &Path) -> Result<()> {
    let parent = target
        .parent()
        .with_context(|| format!("no parent directory: {}", target.display()))?;
    let stage = tempfile::Builder::new()
        .prefix(".dotdav-restore-")
        .tempdir_in(parent)
        .with_context(|| format!("create staging directory in {}", parent.display()))?;
    let staged = stage.path().join("content");

    let everything = IgnoreSet::default();
    if source.is_dir() {
        copy_dir_recursive(source, &staged, &everything)?;
    } else {
        std::fs::copy(source, &staged)
            .with_context(|| format!("copy {} to {}", source.display(), staged.display()))?;
    }

    remove_path(target).with_context(|| format!("clear {}", target.display()))?;
    if std::fs::rename(&staged, target).is_err() {
        if staged.is_dir() {
            copy_dir_recursive(&staged, target, &everything)?;
        } else {
            std::fs::copy(&staged, target)
                .with_context(|| format!("copy {} to {}", staged.display(), target.display()))?;
        }
    }
    Ok(())
}

/// Create a symlink at `link` pointing to `target`.
fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {} (requires developer mode or admin)",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}
