//! Ignore pattern set: shell globs matched against basenames.
use std::ffi::OsStr;
use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::ConfigError;

/// Ordered list of shell-glob patterns, compiled once.
///
/// Used when copying a directory into the repository, when filtering
/// change events in the autosync watcher, and passed verbatim to the remote
/// sync client as transfer exclusions. Matching is always by basename.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

impl IgnoreSet {
    /// Compile `patterns` into a matcher.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPattern`] for the first pattern that is
    /// not a valid glob.
    pub fn new(patterns: Vec<String>) -> Result<Self, ConfigError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            let glob = Glob::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                message: e.kind().to_string(),
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| ConfigError::InvalidPattern {
            pattern: patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(Self { patterns, set })
    }

    /// The patterns in configuration order.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether no patterns are configured.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Whether the basename `name` matches any pattern.
    #[must_use]
    pub fn is_ignored(&self, name: &OsStr) -> bool {
        self.set.is_match(Path::new(name))
    }

    /// Whether the basename of `path` matches any pattern.
    #[must_use]
    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.is_ignored(name))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn set(patterns: &[&str]) -> IgnoreSet {
        IgnoreSet::new(patterns.iter().map(ToString::to_string).collect()).unwrap()
    }

    #[test]
    fn empty_set_matches_nothing() {
        let ignores = IgnoreSet::default();
        assert!(ignores.is_empty());
        assert!(!ignores.is_ignored(OsStr::new(".DS_Store")));
    }

    #[test]
    fn matches_by_basename_only() {
        let ignores = set(&["*.swp", "__pycache__"]);
        assert!(ignores.matches_path(Path::new("/repo/default/nvim/.init.lua.swp")));
        assert!(ignores.matches_path(Path::new("plugins/__pycache__")));
        assert!(!ignores.matches_path(Path::new("/repo/__pycache__/mod.py")));
    }

    #[test]
    fn character_classes_and_question_marks() {
        let ignores = set(&["*.py[co]", "?.tmp"]);
        assert!(ignores.is_ignored(OsStr::new("mod.pyc")));
        assert!(ignores.is_ignored(OsStr::new("a.tmp")));
        assert!(!ignores.is_ignored(OsStr::new("ab.tmp")));
        assert!(!ignores.is_ignored(OsStr::new("mod.py")));
    }

    #[test]
    fn keeps_pattern_order() {
        let ignores = set(&["b", "a"]);
        assert_eq!(ignores.patterns(), ["b", "a"]);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = IgnoreSet::new(vec!["[".to_string()]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { ref pattern, .. } if pattern == "["));
    }
}
