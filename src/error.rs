//! Domain-specific error types for dotdav.
//!
//! Library code returns [`DotdavError`]; command handlers at the CLI boundary
//! convert it to [`anyhow::Error`] via the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! DotdavError
//! ├── NotFound / NotTracked / RemoteNotConfigured   # abort the command
//! ├── NoArtifactForProfile / MissingArtifact
//! │   Conflict / LinkFailure / TransferFailure       # reported per entry
//! ├── Config(ConfigError)                            # settings, mappings, ignores
//! └── Other(anyhow::Error)                           # contextualised I/O failures
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for dotdav.
#[derive(Error, Debug)]
pub enum DotdavError {
    /// The path given to `add` does not exist.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The path given to `remove` has no mapping.
    #[error("{} is not tracked by dotdav", .0.display())]
    NotTracked(PathBuf),

    /// The file is tracked, but neither the profile nor `default` has an artifact.
    #[error("no version of {key} for profile '{profile}' or default")]
    NoArtifactForProfile {
        /// Tracked-file key.
        key: String,
        /// Profile that was requested.
        profile: String,
    },

    /// The mapping points at a repository artifact that is gone from disk.
    #[error("repository file {} missing for {key}", .artifact.display())]
    MissingArtifact {
        /// Tracked-file key.
        key: String,
        /// Absolute path of the missing artifact.
        artifact: PathBuf,
    },

    /// The deploy destination is occupied by unrelated content.
    #[error("{} exists, use --force to overwrite", .0.display())]
    Conflict(PathBuf),

    /// Creating (or clearing the way for) a symlink failed.
    #[error("failed to link {}: {reason}", .destination.display())]
    LinkFailure {
        /// Where the symlink should have been created.
        destination: PathBuf,
        /// Underlying failure, flattened with its context chain.
        reason: String,
    },

    /// The remote sync client reported a non-success outcome.
    #[error("{direction} failed: {reason}")]
    TransferFailure {
        /// `push` or `pull`.
        direction: String,
        /// Client-reported reason.
        reason: String,
    },

    /// No rclone remote is configured.
    #[error("rclone_remote not configured, run 'dotdav init --remote <name>'")]
    RemoteNotConfigured,

    /// Settings, mappings or ignore patterns could not be loaded or saved.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Filesystem failure with attached path context.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors that arise while loading or persisting configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// An I/O error occurred while reading or writing a config file.
    #[error("IO error on config file {}: {source}", .path.display())]
    Io {
        /// Path to the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML, or does not match the expected shape.
    #[error("Invalid TOML in {}: {message}", .path.display())]
    InvalidSyntax {
        /// Path to the file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// An ignore pattern is not a valid shell glob.
    #[error("Invalid ignore pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Glob compiler message.
        message: String,
    },

    /// A setting has a value dotdav cannot use.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Setting name.
        key: String,
        /// What is wrong with it.
        message: String,
    },

    /// Neither `HOME` nor `USERPROFILE` is set.
    #[error("HOME environment variable is not set")]
    MissingHome,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn not_found_display() {
        let e = DotdavError::NotFound(PathBuf::from("/home/u/.bashrc"));
        assert_eq!(e.to_string(), "file not found: /home/u/.bashrc");
    }

    #[test]
    fn not_tracked_display() {
        let e = DotdavError::NotTracked(PathBuf::from("/home/u/.vimrc"));
        assert_eq!(e.to_string(), "/home/u/.vimrc is not tracked by dotdav");
    }

    #[test]
    fn no_artifact_for_profile_display() {
        let e = DotdavError::NoArtifactForProfile {
            key: ".bashrc".to_string(),
            profile: "work".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "no version of .bashrc for profile 'work' or default"
        );
    }

    #[test]
    fn conflict_mentions_force() {
        let e = DotdavError::Conflict(PathBuf::from("/home/u/.gitconfig"));
        assert!(e.to_string().contains("--force"));
    }

    #[test]
    fn transfer_failure_display() {
        let e = DotdavError::TransferFailure {
            direction: "pull".to_string(),
            reason: "exit 1".to_string(),
        };
        assert_eq!(e.to_string(), "pull failed: exit 1");
    }

    #[test]
    fn config_error_io_has_source() {
        use std::error::Error as StdError;
        let e = ConfigError::Io {
            path: PathBuf::from("config.toml"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.source().is_some());
    }

    #[test]
    fn dotdav_error_from_config_error() {
        let e: DotdavError = ConfigError::MissingHome.into();
        assert!(e.to_string().contains("Configuration error"));
    }

    #[test]
    fn anyhow_context_is_transparent() {
        let e: DotdavError = anyhow::anyhow!("copy a to b").into();
        assert_eq!(e.to_string(), "copy a to b");
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<DotdavError>();
        assert_send_sync::<ConfigError>();
    }

    #[test]
    fn dotdav_error_converts_to_anyhow() {
        let _anyhow_err: anyhow::Error = DotdavError::RemoteNotConfigured.into();
    }
}
