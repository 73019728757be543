//! Onboarding files into the repository and restoring them on removal.
use anyhow::{Context as _, anyhow};
use std::path::{Path, PathBuf};

use super::identity::{TrackedKey, locate};
use crate::config::{MappingStore, Settings, validate_profile};
use crate::error::DotdavError;
use crate::resources::Applicable as _;
use crate::resources::helpers::fs::{copy_dir_recursive, is_empty_dir, remove_path};
use crate::resources::symlink::SymlinkResource;

/// Outcome of a successful `add`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Added {
    /// Mapping key the file was recorded under.
    pub key: TrackedKey,
    /// Profile the artifact belongs to.
    pub profile: String,
    /// Repository-relative artifact path, `<profile>/<basename>`.
    pub artifact: String,
    /// Canonical path of the file that was copied.
    pub source: PathBuf,
}

/// Outcome of a successful `remove`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Removed {
    /// Mapping key that was removed.
    pub key: String,
    /// Profile whose entry was deleted (the requested one or `default`).
    pub profile: String,
    /// Path restored with a real copy, or `None` when the artifact was
    /// already missing and only the mapping was dropped.
    pub restored: Option<PathBuf>,
}

/// Adds files to and removes files from the repository, keeping the mapping
/// store in step.
#[derive(Debug)]
pub struct TrackEngine<'a> {
    settings: &'a Settings,
    store: &'a mut MappingStore,
}

impl<'a> TrackEngine<'a> {
    /// Create an engine operating on `store`.
    #[must_use]
    pub const fn new(settings: &'a Settings, store: &'a mut MappingStore) -> Self {
        Self { settings, store }
    }

    fn profile(&self, profile: Option<&str>) -> Result<String, DotdavError> {
        let profile = profile.unwrap_or(&self.settings.current_profile);
        validate_profile(profile)?;
        Ok(profile.to_string())
    }

    /// Copy `path` into `repo/<profile>/<basename>` and record the mapping.
    ///
    /// Directories replace any previous artifact and are filtered through the
    /// ignore set; single files are copied as-is. The mapping is written only
    /// after the copy succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`DotdavError::NotFound`] if `path` does not exist, or an error
    /// if the path is inside the repository, the copy fails, or the mapping
    /// cannot be saved.
    pub fn add(&mut self, path: &Path, profile: Option<&str>) -> Result<Added, DotdavError> {
        let source =
            dunce::canonicalize(path).map_err(|_| DotdavError::NotFound(path.to_path_buf()))?;
        let profile = self.profile(profile)?;

        let repo = self.settings.repo_dir();
        let canonical_repo = dunce::canonicalize(&repo).unwrap_or_else(|_| repo.clone());
        if source.starts_with(&canonical_repo) || canonical_repo.starts_with(&source) {
            return Err(anyhow!(
                "{} overlaps the repository {}",
                source.display(),
                repo.display()
            )
            .into());
        }
        let name = source
            .file_name()
            .ok_or_else(|| anyhow!("cannot track {}", source.display()))?;

        let profile_dir = repo.join(&profile);
        std::fs::create_dir_all(&profile_dir)
            .with_context(|| format!("create {}", profile_dir.display()))?;
        let dest = profile_dir.join(name);
        remove_path(&dest)?;
        if source.is_dir() {
            copy_dir_recursive(&source, &dest, &self.settings.ignores)?;
        } else {
            std::fs::copy(&source, &dest)
                .with_context(|| format!("copy {} to {}", source.display(), dest.display()))?;
        }

        let key = TrackedKey::for_path(&source, &self.settings.home);
        let artifact = format!("{profile}/{}", name.to_string_lossy());
        self.store.add(&key.as_key(), &profile, &artifact)?;
        tracing::debug!("recorded {key} -> {artifact}");

        Ok(Added {
            key,
            profile,
            artifact,
            source,
        })
    }

    /// Restore `path` from its repository artifact, then delete the mapping
    /// entry and the artifact.
    ///
    /// The entry that supplied the artifact is the one deleted: the requested
    /// profile's, or `default`'s when the lookup fell back to it. The mapping
    /// is deleted before the artifact, and an emptied profile directory is
    /// removed as well.
    ///
    /// # Errors
    ///
    /// Returns [`DotdavError::NotTracked`] if no mapping matches `path`,
    /// [`DotdavError::NoArtifactForProfile`] if the profile has no artifact,
    /// or an error if restoring or saving fails.
    pub fn remove(&mut self, path: &Path, profile: Option<&str>) -> Result<Removed, DotdavError> {
        let profile = self.profile(profile)?;
        let raw = locate(path).with_context(|| format!("resolve {}", path.display()))?;
        let key = self
            .lookup_key(&raw, &profile)
            .ok_or_else(|| DotdavError::NotTracked(path.to_path_buf()))?;

        let (owner, artifact_rel) = self
            .store
            .resolve(&key, &profile)
            .map(|r| (r.profile.to_string(), r.artifact.to_string()))
            .ok_or_else(|| DotdavError::NoArtifactForProfile {
                key: key.clone(),
                profile: profile.clone(),
            })?;
        let repo = self.settings.repo_dir();
        let artifact = repo.join(&artifact_rel);

        if artifact.symlink_metadata().is_err() {
            self.store.remove(&key, &owner)?;
            return Ok(Removed {
                key,
                profile: owner,
                restored: None,
            });
        }

        SymlinkResource::new(artifact.clone(), raw.clone())
            .remove()
            .map_err(|e| DotdavError::LinkFailure {
                destination: raw.clone(),
                reason: format!("{e:#}"),
            })?;

        self.store.remove(&key, &owner)?;
        remove_path(&artifact)?;
        if let Some(parent) = artifact.parent()
            && parent != repo
            && is_empty_dir(parent)
        {
            std::fs::remove_dir(parent)
                .with_context(|| format!("remove empty {}", parent.display()))?;
        }

        Ok(Removed {
            key,
            profile: owner,
            restored: Some(raw),
        })
    }

    /// Find the mapping key for `raw`: by its own path, by its canonical
    /// path, then (for symlinks) by matching the link's resolved target
    /// against every mapping's artifact for `profile`.
    fn lookup_key(&self, raw: &Path, profile: &str) -> Option<String> {
        let home = &self.settings.home;
        let direct = TrackedKey::for_path(raw, home).as_key();
        if self.store.contains(&direct) {
            return Some(direct);
        }

        let canonical = dunce::canonicalize(raw).ok();
        if let Some(canonical) = &canonical {
            let key = TrackedKey::for_path(canonical, home).as_key();
            if self.store.contains(&key) {
                return Some(key);
            }
        }

        let is_symlink = raw.symlink_metadata().is_ok_and(|m| m.is_symlink());
        let target = canonical.filter(|_| is_symlink)?;
        let repo = self.settings.repo_dir();
        self.store
            .iter()
            .find(|(key, _)| {
                self.store.resolve(key, profile).is_some_and(|r| {
                    dunce::canonicalize(repo.join(r.artifact)).is_ok_and(|a| a == target)
                })
            })
            .map(|(key, _)| key.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::IgnoreSet;

    struct Fixture {
        _tmp: tempfile::TempDir,
        settings: Settings,
        store: MappingStore,
    }

    fn fixture() -> Fixture {
        let tmp = tempfile::tempdir().unwrap();
        let base = dunce::canonicalize(tmp.path()).unwrap();
        let root = base.join("root");
        let home = base.join("home");
        std::fs::create_dir_all(root.join("repo")).unwrap();
        std::fs::create_dir_all(&home).unwrap();
        let settings = Settings::with_defaults(&root, &home);
        let store = MappingStore::load(&settings.mappings_file()).unwrap();
        Fixture {
            _tmp: tmp,
            settings,
            store,
        }
    }

    #[test]
    fn add_copies_file_and_records_mapping() {
        let mut f = fixture();
        let file = f.settings.home.join(".bashrc");
        std::fs::write(&file, "export A=1").unwrap();

        let added = TrackEngine::new(&f.settings, &mut f.store)
            .add(&file, None)
            .unwrap();

        assert_eq!(added.key.as_key(), ".bashrc");
        assert_eq!(added.artifact, "default/.bashrc");
        assert_eq!(
            std::fs::read_to_string(f.settings.repo_dir().join("default/.bashrc")).unwrap(),
            "export A=1"
        );
        assert_eq!(
            f.store.resolve(".bashrc", "default").unwrap().artifact,
            "default/.bashrc"
        );
    }

    #[test]
    fn add_missing_path_is_not_found() {
        let mut f = fixture();
        let err = TrackEngine::new(&f.settings, &mut f.store)
            .add(&f.settings.home.join("nope"), None)
            .unwrap_err();
        assert!(matches!(err, DotdavError::NotFound(_)));
        assert!(f.store.is_empty());
    }

    #[test]
    fn add_directory_replaces_previous_artifact_and_filters() {
        let mut f = fixture();
        f.settings.ignores = IgnoreSet::new(vec!["*.swp".to_string()]).unwrap();
        let dir = f.settings.home.join(".config").join("nvim");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("init.lua"), "v1").unwrap();
        std::fs::write(dir.join("old.lua"), "old").unwrap();

        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&dir, Some("work")).unwrap();

        std::fs::remove_file(dir.join("old.lua")).unwrap();
        std::fs::write(dir.join(".init.lua.swp"), "swap").unwrap();
        let added = engine.add(&dir, Some("work")).unwrap();

        let artifact = f.settings.repo_dir().join("work/nvim");
        assert_eq!(added.key.as_key(), ".config/nvim");
        assert!(artifact.join("init.lua").exists());
        assert!(!artifact.join("old.lua").exists());
        assert!(!artifact.join(".init.lua.swp").exists());
    }

    #[test]
    fn add_rejects_bad_profile_name() {
        let mut f = fixture();
        let file = f.settings.home.join(".bashrc");
        std::fs::write(&file, "").unwrap();
        let err = TrackEngine::new(&f.settings, &mut f.store)
            .add(&file, Some("../escape"))
            .unwrap_err();
        assert!(matches!(err, DotdavError::Config(_)));
    }

    #[test]
    fn add_rejects_repository_content() {
        let mut f = fixture();
        let inside = f.settings.repo_dir().join("default");
        std::fs::create_dir_all(&inside).unwrap();
        std::fs::write(inside.join("x"), "").unwrap();
        let err = TrackEngine::new(&f.settings, &mut f.store)
            .add(&inside.join("x"), None)
            .unwrap_err();
        assert!(err.to_string().contains("overlaps the repository"), "{err}");
    }

    #[test]
    fn remove_restores_content_and_cleans_up() {
        let mut f = fixture();
        let file = f.settings.home.join(".vimrc");
        std::fs::write(&file, "set nu").unwrap();

        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&file, Some("work")).unwrap();
        let removed = engine.remove(&file, Some("work")).unwrap();

        assert_eq!(removed.profile, "work");
        assert_eq!(removed.restored.as_deref(), Some(file.as_path()));
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "set nu");
        assert!(f.store.is_empty());
        assert!(!f.settings.repo_dir().join("work").exists());
        assert!(f.settings.repo_dir().exists());
    }

    #[test]
    fn remove_untracked_is_not_tracked() {
        let mut f = fixture();
        let file = f.settings.home.join(".zshrc");
        std::fs::write(&file, "").unwrap();
        let err = TrackEngine::new(&f.settings, &mut f.store)
            .remove(&file, None)
            .unwrap_err();
        assert!(matches!(err, DotdavError::NotTracked(_)));
    }

    #[test]
    fn remove_without_artifact_for_profile() {
        let mut f = fixture();
        let file = f.settings.home.join(".zshrc");
        std::fs::write(&file, "").unwrap();
        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&file, Some("work")).unwrap();

        let err = engine.remove(&file, Some("laptop")).unwrap_err();
        assert!(matches!(err, DotdavError::NoArtifactForProfile { .. }));
        assert!(f.store.contains(".zshrc"));
    }

    #[test]
    fn remove_with_missing_artifact_drops_mapping() {
        let mut f = fixture();
        let file = f.settings.home.join(".profile");
        std::fs::write(&file, "x").unwrap();
        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&file, None).unwrap();
        std::fs::remove_file(f.settings.repo_dir().join("default/.profile")).unwrap();

        let removed = engine.remove(&file, None).unwrap();
        assert!(removed.restored.is_none());
        assert!(f.store.is_empty());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "x");
    }

    #[test]
    fn remove_falls_back_to_default_entry() {
        let mut f = fixture();
        let file = f.settings.home.join(".gitconfig");
        std::fs::write(&file, "[user]").unwrap();
        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&file, Some("default")).unwrap();

        let removed = engine.remove(&file, Some("work")).unwrap();
        assert_eq!(removed.profile, "default");
        assert!(f.store.is_empty());
    }

    #[test]
    fn remove_through_parent_component_targets_the_real_file() {
        let mut f = fixture();
        let nested = f.settings.home.join("foo/.bashrc");
        std::fs::create_dir_all(nested.parent().unwrap()).unwrap();
        std::fs::write(&nested, "nested").unwrap();
        let top = f.settings.home.join(".bashrc");
        std::fs::write(&top, "top").unwrap();

        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&nested, None).unwrap();
        let err = engine
            .remove(&f.settings.home.join("foo/../.bashrc"), None)
            .unwrap_err();

        assert!(matches!(err, DotdavError::NotTracked(_)));
        assert_eq!(std::fs::read_to_string(&top).unwrap(), "top");
        assert!(f.store.contains("foo/.bashrc"));
        assert!(f.settings.repo_dir().join("default/.bashrc").exists());
    }

    #[test]
    fn remove_through_parent_component_finds_tracked_file() {
        let mut f = fixture();
        let file = f.settings.home.join(".inputrc");
        std::fs::write(&file, "set bell-style none").unwrap();
        std::fs::create_dir(f.settings.home.join("tmp")).unwrap();

        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&file, None).unwrap();
        let removed = engine
            .remove(&f.settings.home.join("tmp/../.inputrc"), None)
            .unwrap();

        assert_eq!(removed.key, ".inputrc");
        assert!(f.store.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn remove_by_other_symlink_matches_artifact() {
        let mut f = fixture();
        let file = f.settings.home.join(".bashrc");
        std::fs::write(&file, "alias ll='ls -l'").unwrap();
        let alias = f.settings.home.join("alias");

        let mut engine = TrackEngine::new(&f.settings, &mut f.store);
        engine.add(&file, None).unwrap();
        std::os::unix::fs::symlink(f.settings.repo_dir().join("default/.bashrc"), &alias)
            .unwrap();
        let removed = engine.remove(&alias, None).unwrap();

        assert_eq!(removed.key, ".bashrc");
        assert_eq!(removed.restored.as_deref(), Some(alias.as_path()));
        assert!(f.store.is_empty());
        let meta = std::fs::symlink_metadata(&alias).unwrap();
        assert!(meta.is_file() && !meta.is_symlink());
        assert_eq!(std::fs::read_to_string(&alias).unwrap(), "alias ll='ls -l'");
    }
}
