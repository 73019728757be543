//! Command: restore a tracked file and stop tracking it.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, TrackOpts};
use crate::config::{MappingStore, Settings};
use crate::engine::TrackEngine;
use crate::logging::{Log, Logger};

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if settings or mappings cannot be loaded, or the file
/// cannot be removed.
pub fn run(global: &GlobalOpts, opts: &TrackOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let mut store = setup.mappings()?;
    execute(&setup.settings, &mut store, opts, log)
}

/// Replace the link at `opts.file` with a real copy and drop the mapping.
///
/// # Errors
///
/// Returns an error if the path is not tracked, has no artifact for the
/// profile, or cannot be restored.
pub fn execute(
    settings: &Settings,
    store: &mut MappingStore,
    opts: &TrackOpts,
    log: &dyn Log,
) -> Result<()> {
    let removed = TrackEngine::new(settings, store).remove(&opts.file, opts.profile.as_deref())?;
    match &removed.restored {
        Some(path) => log.info(&format!("restored {}", path.display())),
        None => log.warn(&format!(
            "repository file for {} was already missing, nothing restored",
            removed.key
        )),
    }
    log.info(&format!(
        "removed {} from dotdav management (profile: {})",
        removed.key, removed.profile
    ));
    Ok(())
}
