// Shared helpers for integration tests.
//
// Provides a temporary dotdav root and a fake home directory so each
// integration test runs isolated from the real home and from other tests.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dotdav::config::{MappingStore, Settings};
use dotdav::logging::Logger;
use dotdav::sync::RemoteSyncClient;

/// An isolated dotdav root plus fake home, backed by a [`tempfile::TempDir`].
///
/// Both live under one canonicalized temporary directory, so symlink targets
/// compare equal to the paths the tests build.
pub struct TestEnv {
    _tmp: tempfile::TempDir,
    /// The dotdav root (settings, mappings and `repo/`).
    pub root: PathBuf,
    /// Fake home directory.
    pub home: PathBuf,
}

impl TestEnv {
    /// Create an empty root and home.
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("create temp dir");
        let base = dunce::canonicalize(tmp.path()).expect("canonicalize temp dir");
        let root = base.join("dots");
        let home = base.join("home");
        std::fs::create_dir_all(&root).expect("create root");
        std::fs::create_dir_all(&home).expect("create home");
        Self {
            _tmp: tmp,
            root,
            home,
        }
    }

    /// Default settings for this root and home.
    pub fn settings(&self) -> Settings {
        Settings::with_defaults(&self.root, &self.home)
    }

    /// Settings with `profile` as the current profile.
    pub fn settings_for(&self, profile: &str) -> Settings {
        let mut settings = self.settings();
        settings.current_profile = profile.to_string();
        settings
    }

    /// Load the mapping store from disk.
    pub fn store(&self) -> MappingStore {
        MappingStore::load(&self.root.join("mappings.toml")).expect("load mappings")
    }

    /// Repository root.
    pub fn repo(&self) -> PathBuf {
        self.root.join("repo")
    }

    /// Write `contents` to `rel` under the fake home, creating parents.
    pub fn write_home(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.home.join(rel);
        write_file(&path, contents);
        path
    }

    /// A path outside the fake home (but inside the temp dir).
    pub fn outside_home(&self, rel: &str) -> PathBuf {
        self.root
            .parent()
            .expect("temp dir has a parent")
            .join("elsewhere")
            .join(rel)
    }
}

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, contents).expect("write file");
}

/// A logger that records entries but writes no log file.
pub fn logger() -> Logger {
    Logger::with_log_file(None)
}

/// One completed `mirror` call.
#[derive(Debug, Clone)]
pub struct Call {
    pub source: String,
    pub destination: String,
    pub started: Instant,
    pub finished: Instant,
}

/// [`RemoteSyncClient`] that records every call with entry and exit times
/// and takes `delay` to complete.
#[derive(Debug, Default)]
pub struct RecordingClient {
    calls: Mutex<Vec<Call>>,
    delay: Duration,
}

impl RecordingClient {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            delay,
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Calls whose destination is `destination`.
    pub fn calls_to(&self, destination: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.destination == destination)
            .count()
    }

    /// Poll until `pred` holds or `timeout` elapses.
    pub fn wait_for(&self, timeout: Duration, pred: impl Fn(&[Call]) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if pred(&self.calls()) {
                return true;
            }
            std::thread::sleep(Duration::from_millis(20));
        }
        pred(&self.calls())
    }
}

impl RemoteSyncClient for RecordingClient {
    fn mirror(&self, source: &str, destination: &str, _excludes: &[String]) -> anyhow::Result<()> {
        let started = Instant::now();
        std::thread::sleep(self.delay);
        let finished = Instant::now();
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Call {
                source: source.to_string(),
                destination: destination.to_string(),
                started,
                finished,
            });
        Ok(())
    }
}
