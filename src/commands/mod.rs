pub mod add;
pub mod autosync;
pub mod completions;
pub mod deploy;
pub mod init;
pub mod list;
pub mod profile;
pub mod remove;
pub mod service;
pub mod sync;
pub mod version;

use anyhow::{Context as _, Result};
use std::path::PathBuf;

use crate::cli::GlobalOpts;
use crate::config::{self, MappingStore, ROOT_ENV, Settings};
use crate::logging::{Log, Logger};

/// Shared state produced by the common command setup sequence.
///
/// Resolves the dotdav root and loads settings so that each command does not
/// have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Settings loaded from the resolved root.
    pub settings: Settings,
}

impl CommandSetup {
    /// Resolve the root and load settings from it.
    ///
    /// # Errors
    ///
    /// Returns an error if the working directory or home directory cannot be
    /// determined, or a settings file fails to parse.
    pub fn init(global: &GlobalOpts, log: &dyn Log) -> Result<Self> {
        let root = resolve_root(global)?;
        log.debug(&format!("root: {}", root.display()));
        let settings = Settings::load(&root)?;
        log.debug(&format!("home: {}", settings.home.display()));
        log.debug(&format!("profile: {}", settings.current_profile));
        if !settings.ignores.is_empty() {
            log.debug(&format!(
                "ignores: {}",
                settings.ignores.patterns().join(", ")
            ));
        }
        Ok(Self { settings })
    }

    /// Load the mapping store for this root.
    ///
    /// # Errors
    ///
    /// Returns an error if `mappings.toml` exists but cannot be parsed.
    pub fn mappings(&self) -> Result<MappingStore> {
        Ok(MappingStore::load(&self.settings.mappings_file())?)
    }
}

/// Resolve the dotdav root from `--root`, `DOTDAV_ROOT`, or the working
/// directory.
///
/// # Errors
///
/// Returns an error if the current directory cannot be determined.
pub fn resolve_root(global: &GlobalOpts) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("determine current directory")?;
    Ok(config::locate_root(
        global.root.as_deref(),
        std::env::var_os(ROOT_ENV).map(PathBuf::from),
        &cwd,
    ))
}

/// Print the summary and bail if any entry conflicted or failed.
///
/// # Errors
///
/// Returns an error if one or more entries recorded a failure.
pub fn finish(log: &Logger) -> Result<()> {
    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} tracked file(s) failed to deploy");
    }
    Ok(())
}
