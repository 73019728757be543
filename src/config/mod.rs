pub mod ignore;
pub mod mappings;
pub mod toml_loader;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ConfigError, DotdavError};
pub use ignore::IgnoreSet;
pub use mappings::{DEFAULT_PROFILE, MappingStore, Resolution};

/// Shared settings file.
pub const CONFIG_FILE: &str = "config.toml";
/// Machine-local overrides; every settings write lands here.
pub const LOCAL_CONFIG_FILE: &str = "config.local.toml";
/// Mapping store document.
pub const MAPPINGS_FILE: &str = "mappings.toml";
/// Repository root directory.
pub const REPO_DIR: &str = "repo";
/// Environment variable naming the dotdav root.
pub const ROOT_ENV: &str = "DOTDAV_ROOT";
/// Largest accepted `debounce_seconds` (one hour).
pub const MAX_DEBOUNCE_SECONDS: u64 = 60 * 60;
/// Largest accepted `sync_interval_minutes` (one week).
pub const MAX_SYNC_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

/// On-disk shape of the merged settings files.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RawSettings {
    rclone_remote: String,
    rclone_path: String,
    current_profile: String,
    debounce_seconds: u64,
    sync_interval_minutes: u64,
    ignores: Vec<String>,
}

impl Default for RawSettings {
    fn default() -> Self {
        Self {
            rclone_remote: String::new(),
            rclone_path: "dotfiles".to_string(),
            current_profile: DEFAULT_PROFILE.to_string(),
            debounce_seconds: 5,
            sync_interval_minutes: 10,
            ignores: Vec::new(),
        }
    }
}

/// Settings loaded once at startup and passed into each component.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Directory holding the settings files, mappings and repository.
    pub root: PathBuf,
    /// User home directory; home-relative keys resolve under it.
    pub home: PathBuf,
    /// Profile used when a command does not name one.
    pub current_profile: String,
    /// rclone remote name, `None` when not configured.
    pub rclone_remote: Option<String>,
    /// Path within the remote.
    pub rclone_path: String,
    /// Quiet period before a push after the last change.
    pub debounce: Duration,
    /// Time between periodic pulls.
    pub sync_interval: Duration,
    /// Compiled ignore patterns.
    pub ignores: IgnoreSet,
}

impl Settings {
    /// Load settings for `root`, taking the home directory from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory is set, or a settings file is
    /// unreadable or invalid.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        Self::load_with_home(root, &home_dir()?)
    }

    /// Load `config.toml` and merge `config.local.toml` over it key by key.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file is unreadable or invalid.
    pub fn load_with_home(root: &Path, home: &Path) -> Result<Self, ConfigError> {
        let base_path = root.join(CONFIG_FILE);
        let local_path = root.join(LOCAL_CONFIG_FILE);
        let mut merged = toml_loader::load_table(&base_path)?.unwrap_or_default();
        let local = toml_loader::load_table(&local_path)?;
        let blame = if local.is_some() { local_path } else { base_path };
        merged.extend(local.unwrap_or_default());

        let raw: RawSettings =
            toml::Value::Table(merged)
                .try_into()
                .map_err(|e: toml::de::Error| ConfigError::InvalidSyntax {
                    path: blame,
                    message: e.message().to_string(),
                })?;
        Self::from_raw(root, home, raw)
    }

    /// Default settings for `root` and `home`, ignoring any files.
    #[must_use]
    pub fn with_defaults(root: &Path, home: &Path) -> Self {
        let raw = RawSettings::default();
        Self {
            root: root.to_path_buf(),
            home: canonical_or_self(home),
            current_profile: raw.current_profile,
            rclone_remote: None,
            rclone_path: raw.rclone_path,
            debounce: Duration::from_secs(raw.debounce_seconds),
            sync_interval: Duration::from_secs(raw.sync_interval_minutes * 60),
            ignores: IgnoreSet::default(),
        }
    }

    fn from_raw(root: &Path, home: &Path, raw: RawSettings) -> Result<Self, ConfigError> {
        validate_profile(&raw.current_profile)?;
        if !(1..=MAX_SYNC_INTERVAL_MINUTES).contains(&raw.sync_interval_minutes) {
            return Err(ConfigError::InvalidValue {
                key: "sync_interval_minutes".to_string(),
                message: format!("must be between 1 and {MAX_SYNC_INTERVAL_MINUTES}"),
            });
        }
        if raw.debounce_seconds > MAX_DEBOUNCE_SECONDS {
            return Err(ConfigError::InvalidValue {
                key: "debounce_seconds".to_string(),
                message: format!("must be at most {MAX_DEBOUNCE_SECONDS}"),
            });
        }
        let remote = raw.rclone_remote.trim().trim_end_matches(':');
        Ok(Self {
            root: root.to_path_buf(),
            home: canonical_or_self(home),
            current_profile: raw.current_profile,
            rclone_remote: (!remote.is_empty()).then(|| remote.to_string()),
            rclone_path: raw.rclone_path,
            debounce: Duration::from_secs(raw.debounce_seconds),
            sync_interval: Duration::from_secs(raw.sync_interval_minutes * 60),
            ignores: IgnoreSet::new(raw.ignores)?,
        })
    }

    /// Repository root: `<root>/repo`.
    #[must_use]
    pub fn repo_dir(&self) -> PathBuf {
        self.root.join(REPO_DIR)
    }

    /// Mapping store path: `<root>/mappings.toml`.
    #[must_use]
    pub fn mappings_file(&self) -> PathBuf {
        self.root.join(MAPPINGS_FILE)
    }

    /// Remote endpoint in rclone notation, `<remote>:<path>`.
    ///
    /// # Errors
    ///
    /// Returns [`DotdavError::RemoteNotConfigured`] when no remote is set.
    pub fn remote_url(&self) -> Result<String, DotdavError> {
        let remote = self
            .rclone_remote
            .as_deref()
            .ok_or(DotdavError::RemoteNotConfigured)?;
        Ok(format!("{remote}:{}", self.rclone_path))
    }

    /// Switch the current profile and persist it to the local settings file.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the file cannot be written.
    pub fn set_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        validate_profile(name)?;
        persist_local(&self.root, "current_profile", name.into())?;
        self.current_profile = name.to_string();
        Ok(())
    }

    /// Persist the remote name and, when given, the remote path.
    ///
    /// # Errors
    ///
    /// Returns an error if the local settings file cannot be written.
    pub fn set_remote(&mut self, remote: &str, path: Option<&str>) -> Result<(), ConfigError> {
        let remote = remote.trim().trim_end_matches(':');
        persist_local(&self.root, "rclone_remote", remote.into())?;
        if let Some(path) = path {
            persist_local(&self.root, "rclone_path", path.into())?;
            self.rclone_path = path.to_string();
        }
        self.rclone_remote = (!remote.is_empty()).then(|| remote.to_string());
        Ok(())
    }
}

/// Write a single `key = value` into `<root>/config.local.toml`, keeping
/// the other keys already there.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or written.
pub fn persist_local(root: &Path, key: &str, value: toml::Value) -> Result<(), ConfigError> {
    let path = root.join(LOCAL_CONFIG_FILE);
    let mut table = toml_loader::load_table(&path)?.unwrap_or_default();
    table.insert(key.to_string(), value);
    toml_loader::write_atomic(&path, &table)
}

/// Reject profile names that would escape the repository when used as a
/// directory name.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] for empty names, `.`/`..`, and
/// names containing a path separator.
pub fn validate_profile(name: &str) -> Result<(), ConfigError> {
    let problem = if name.is_empty() {
        Some("profile name is empty")
    } else if name == "." || name == ".." {
        Some("profile name cannot be '.' or '..'")
    } else if name.contains(['/', '\\']) {
        Some("profile name cannot contain a path separator")
    } else {
        None
    };
    problem.map_or(Ok(()), |message| {
        Err(ConfigError::InvalidValue {
            key: "profile".to_string(),
            message: message.to_string(),
        })
    })
}

/// Home directory from `HOME`, falling back to `USERPROFILE`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingHome`] if neither is set.
pub fn home_dir() -> Result<PathBuf, ConfigError> {
    std::env::var_os("HOME")
        .filter(|h| !h.is_empty())
        .or_else(|| std::env::var_os("USERPROFILE").filter(|h| !h.is_empty()))
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingHome)
}

/// Pick the dotdav root: an explicit path, else `env_root`, else the
/// nearest ancestor of `cwd` holding a settings or mappings file, else `cwd`.
#[must_use]
pub fn locate_root(explicit: Option<&Path>, env_root: Option<PathBuf>, cwd: &Path) -> PathBuf {
    if let Some(root) = explicit {
        return cwd.join(root);
    }
    if let Some(root) = env_root.filter(|r| !r.as_os_str().is_empty()) {
        return cwd.join(root);
    }
    cwd.ancestors()
        .find(|dir| {
            [CONFIG_FILE, LOCAL_CONFIG_FILE, MAPPINGS_FILE]
                .iter()
                .any(|f| dir.join(f).is_file())
        })
        .unwrap_or(cwd)
        .to_path_buf()
}

fn canonical_or_self(path: &Path) -> PathBuf {
    dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
