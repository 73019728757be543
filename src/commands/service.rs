//! Command: install or uninstall the autosync systemd user service.
use anyhow::{Context as _, Result};
use std::sync::Arc;

use super::resolve_root;
use crate::cli::{GlobalOpts, ServiceAction, ServiceOpts};
use crate::config;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::resources::systemd_unit::ServiceUnitResource;
use crate::resources::{Applicable as _, Resource as _, ResourceChange};

/// Run the service command.
///
/// # Errors
///
/// Returns an error if the root, home directory or executable path cannot be
/// determined, or the unit cannot be written or removed.
pub fn run(global: &GlobalOpts, opts: &ServiceOpts, log: &Logger) -> Result<()> {
    let root = resolve_root(global)?;
    let root = dunce::canonicalize(&root).unwrap_or(root);
    let home = config::home_dir()?;
    let exe = std::env::current_exe().context("locate dotdav executable")?;
    let unit = ServiceUnitResource::autosync(&home, &exe, &root, Arc::new(SystemExecutor));
    execute(&unit, opts.action, log)
}

/// Apply or remove `unit` and report what happened.
///
/// # Errors
///
/// Returns an error if the unit file cannot be written, read or removed, or
/// systemctl cannot be run.
pub fn execute(unit: &ServiceUnitResource, action: ServiceAction, log: &dyn Log) -> Result<()> {
    match action {
        ServiceAction::Install => {
            log.stage("Installing service");
            if !unit.needs_change()? {
                log.debug("unit file already up to date, re-enabling");
            }
            report(unit.apply()?, "service installed and started", log);
        }
        ServiceAction::Uninstall => {
            log.stage("Uninstalling service");
            report(unit.remove()?, "service uninstalled", log);
        }
    }
    log.debug(&unit.description());
    Ok(())
}

fn report(change: ResourceChange, done: &str, log: &dyn Log) {
    match change {
        ResourceChange::Applied => log.info(done),
        ResourceChange::AlreadyCorrect => log.info("service already installed and running"),
        ResourceChange::Skipped { reason } => log.warn(&reason),
    }
}
