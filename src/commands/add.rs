//! Command: copy a file into the repository and track it.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, TrackOpts};
use crate::config::{MappingStore, Settings};
use crate::engine::TrackEngine;
use crate::logging::{Log, Logger};

/// Run the add command.
///
/// # Errors
///
/// Returns an error if settings or mappings cannot be loaded, or the file
/// cannot be added.
pub fn run(global: &GlobalOpts, opts: &TrackOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let mut store = setup.mappings()?;
    execute(&setup.settings, &mut store, opts, log)
}

/// Add `opts.file` to the repository under the requested profile.
///
/// # Errors
///
/// Returns an error if the path does not exist, overlaps the repository, or
/// cannot be copied or recorded.
pub fn execute(
    settings: &Settings,
    store: &mut MappingStore,
    opts: &TrackOpts,
    log: &dyn Log,
) -> Result<()> {
    let added = TrackEngine::new(settings, store).add(&opts.file, opts.profile.as_deref())?;
    if !added.key.is_portable() {
        log.warn(&format!(
            "{} is not under {}, using absolute path as key",
            added.source.display(),
            settings.home.display()
        ));
    }
    log.info(&format!(
        "added {} as {} (profile: {})",
        added.source.display(),
        added.artifact,
        added.profile
    ));
    log.debug(&format!("key: {}", added.key));
    Ok(())
}
