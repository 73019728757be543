//! Persistent mapping of tracked-file keys to per-profile repository artifacts.
//!
//! The document is TOML:
//!
//! ```toml
//! [files.".bashrc"]
//! default = "default/.bashrc"
//! work = "work/.bashrc"
//!
//! [files."/etc/hosts"]
//! default = "default/hosts"
//! ```
//!
//! Every mutation rewrites the whole file before the in-memory state is
//! committed, so a failed save leaves both in their previous state.
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::toml_loader::{load_config, write_atomic};
use crate::error::ConfigError;

/// Profile consulted when a file has no entry for the requested profile.
pub const DEFAULT_PROFILE: &str = "default";

/// Profile name to repository-relative artifact path.
pub type ProfileMap = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct MappingDocument {
    #[serde(default)]
    files: BTreeMap<String, ProfileMap>,
}

/// The artifact picked for a (key, profile) lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution<'a> {
    /// Profile whose entry matched: the requested one, or [`DEFAULT_PROFILE`].
    pub profile: &'a str,
    /// Repository-relative artifact path.
    pub artifact: &'a str,
}

/// Mapping store backed by `mappings.toml`.
#[derive(Debug)]
pub struct MappingStore {
    path: PathBuf,
    doc: MappingDocument,
}

impl MappingStore {
    /// Read the store at `path`. A missing file is an empty store.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let doc = load_config::<MappingDocument>(path)?.unwrap_or_default();
        let mut store = Self {
            path: path.to_path_buf(),
            doc,
        };
        // A hand-edited file may contain empty tables; they must not exist.
        store.doc.files.retain(|_, profiles| !profiles.is_empty());
        Ok(store)
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of tracked files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.doc.files.len()
    }

    /// Whether no files are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.doc.files.is_empty()
    }

    /// Whether `key` has at least one profile entry.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.doc.files.contains_key(key)
    }

    /// All profile entries for `key`.
    #[must_use]
    pub fn profiles(&self, key: &str) -> Option<&ProfileMap> {
        self.doc.files.get(key)
    }

    /// Iterate tracked files in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProfileMap)> {
        self.doc.files.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Resolve the artifact for `key` under `profile`: the exact profile
    /// entry, else the [`DEFAULT_PROFILE`] entry, else `None`.
    #[must_use]
    pub fn resolve(&self, key: &str, profile: &str) -> Option<Resolution<'_>> {
        let profiles = self.doc.files.get(key)?;
        profiles
            .get_key_value(profile)
            .or_else(|| profiles.get_key_value(DEFAULT_PROFILE))
            .map(|(profile, artifact)| Resolution {
                profile: profile.as_str(),
                artifact: artifact.as_str(),
            })
    }

    /// Record `artifact` for (`key`, `profile`), replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn add(&mut self, key: &str, profile: &str, artifact: &str) -> Result<(), ConfigError> {
        let mut next = self.doc.clone();
        next.files
            .entry(key.to_string())
            .or_default()
            .insert(profile.to_string(), artifact.to_string());
        self.commit(next)
    }

    /// Delete the (`key`, `profile`) entry, and the whole file entry when it
    /// was the last profile. Returns the removed artifact path, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn remove(&mut self, key: &str, profile: &str) -> Result<Option<String>, ConfigError> {
        let mut next = self.doc.clone();
        let Some(profiles) = next.files.get_mut(key) else {
            return Ok(None);
        };
        let removed = profiles.remove(profile);
        if removed.is_none() {
            return Ok(None);
        }
        if profiles.is_empty() {
            next.files.remove(key);
        }
        self.commit(next)?;
        Ok(removed)
    }

    /// Write the current state to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the atomic write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        write_atomic(&self.path, &self.doc)
    }

    fn commit(&mut self, next: MappingDocument) -> Result<(), ConfigError> {
        write_atomic(&self.path, &next)?;
        self.doc = next;
        Ok(())
    }
}
