//! TOML file reading and atomic writing shared by the settings and mapping files.
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;

use crate::error::ConfigError;

/// Read `path` as a top-level TOML table.
///
/// Returns `Ok(None)` for a missing file so callers can layer defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_table(path: &Path) -> Result<Option<toml::Table>, ConfigError> {
    load_config(path)
}

/// Deserialize `path` into `T`, or `Ok(None)` when the file is missing.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read, or its content
/// does not deserialize into `T`.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|e| ConfigError::InvalidSyntax {
            path: path.to_path_buf(),
            message: e.message().to_string(),
        })
}

/// Serialize `value` and replace `path` with it via a sibling temp file
/// and a rename, creating the parent directory when needed.
///
/// # Errors
///
/// Returns an error if serialization or any filesystem step fails.
pub fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), ConfigError> {
    let content = toml::to_string(value).map_err(|e| ConfigError::InvalidSyntax {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    std::fs::write(&tmp, content).map_err(io_err)?;
    std::fs::rename(&tmp, path).map_err(|e| {
        std::fs::remove_file(&tmp).ok();
        io_err(e)
    })
}
