//! Command: create the repository layout and persist remote settings.
use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, InitOpts};
use crate::config::{self, MappingStore, Settings};
use crate::logging::{Log, Logger};

/// Run the init command.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, or the repository, mapping
/// store or local settings file cannot be written.
pub fn run(global: &GlobalOpts, opts: &InitOpts, log: &Logger) -> Result<()> {
    let root = super::resolve_root(global)?;
    let mut settings = Settings::load(&root)?;
    execute(&mut settings, opts, log)
}

/// Create `repo/` and an empty mapping store under the settings root, then
/// persist any remote settings to the local settings file.
///
/// Existing repository content and mappings are kept.
///
/// # Errors
///
/// Returns an error if a directory or file cannot be written.
pub fn execute(settings: &mut Settings, opts: &InitOpts, log: &dyn Log) -> Result<()> {
    log.stage("Initializing");
    let repo = settings.repo_dir();
    std::fs::create_dir_all(&repo)
        .with_context(|| format!("create repository: {}", repo.display()))?;
    log.info(&format!("repository: {}", repo.display()));

    let mappings = settings.mappings_file();
    if mappings.exists() {
        log.debug(&format!("mappings already present: {}", mappings.display()));
    } else {
        MappingStore::load(&mappings)?.save()?;
        log.info(&format!("created {}", mappings.display()));
    }

    match (opts.remote.as_deref(), opts.path.as_deref()) {
        (Some(remote), path) => settings.set_remote(remote, path)?,
        (None, Some(path)) => {
            config::persist_local(&settings.root, "rclone_path", path.into())?;
            path.clone_into(&mut settings.rclone_path);
        }
        (None, None) => {}
    }

    match settings.remote_url() {
        Ok(url) => log.info(&format!("remote: {url}")),
        Err(e) => log.warn(&e.to_string()),
    }
    log.info(&format!("initialized dotdav in {}", settings.root.display()));
    Ok(())
}
