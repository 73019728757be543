//! Profile-independent identity of a tracked file.
use std::fmt;
use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve `.` and `..` in `path` without touching the filesystem. `..`
/// never climbs above the root.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}

/// Absolute location of `path` as the user names it.
///
/// The parent directory is resolved on disk so `..` and symlinked directories
/// lead to the real location, while the last component is kept as given
/// because it may be a deployed symlink. Falls back to [`normalize`] when the
/// parent does not exist.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined.
pub fn locate(path: &Path) -> io::Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    if let (Some(parent), Some(name)) = (abs.parent(), abs.file_name())
        && let Ok(dir) = dunce::canonicalize(parent)
    {
        return Ok(dir.join(name));
    }
    Ok(normalize(&abs))
}

/// Mapping key for a user file.
///
/// Files under the home directory are keyed by their home-relative path with
/// `/` separators, so the same key deploys on machines with different home
/// directories. Anything else is keyed by its absolute path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackedKey {
    /// Path relative to the home directory.
    Home(PathBuf),
    /// Absolute path outside the home directory.
    Absolute(PathBuf),
}

impl TrackedKey {
    /// Key for the absolute `path`, after [`normalize`]. `home` and its
    /// canonical form are both tried as prefixes; the home directory itself
    /// is keyed absolutely.
    #[must_use]
    pub fn for_path(path: &Path, home: &Path) -> Self {
        let path = &normalize(path);
        let canonical_home = dunce::canonicalize(home).ok();
        let relative = std::iter::once(home)
            .chain(canonical_home.as_deref())
            .find_map(|h| path.strip_prefix(h).ok())
            .filter(|rel| !rel.as_os_str().is_empty());
        relative.map_or_else(
            || Self::Absolute(path.to_path_buf()),
            |rel| Self::Home(rel.to_path_buf()),
        )
    }

    /// Parse a stored key: absolute paths are [`TrackedKey::Absolute`],
    /// everything else is home-relative.
    #[must_use]
    pub fn parse(key: &str) -> Self {
        let path = PathBuf::from(key);
        if path.is_absolute() {
            Self::Absolute(path)
        } else {
            Self::Home(path)
        }
    }

    /// The string stored in the mapping document. Every component is kept,
    /// so distinct relative paths never share a key.
    #[must_use]
    pub fn as_key(&self) -> String {
        match self {
            Self::Home(rel) => rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/"),
            Self::Absolute(abs) => abs.to_string_lossy().into_owned(),
        }
    }

    /// Where the file lives on this machine.
    #[must_use]
    pub fn destination(&self, home: &Path) -> PathBuf {
        match self {
            Self::Home(rel) => home.join(rel),
            Self::Absolute(abs) => abs.clone(),
        }
    }

    /// Whether the key is home-relative.
    #[must_use]
    pub const fn is_portable(&self) -> bool {
        matches!(self, Self::Home(_))
    }
}

impl fmt::Display for TrackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_key())
    }
}
