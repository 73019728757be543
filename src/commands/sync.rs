//! Command: one manual push or pull.
use anyhow::Result;
use std::sync::Arc;

use super::CommandSetup;
use crate::cli::{GlobalOpts, SyncAction, SyncOpts};
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::sync::{Direction, RcloneClient, SyncGate, Syncer};

/// Run the sync command.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, no remote is configured,
/// or the transfer fails.
pub fn run(global: &GlobalOpts, opts: &SyncOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let client = Arc::new(RcloneClient::new(Arc::new(SystemExecutor)));
    let syncer = Syncer::from_settings(&setup.settings, client, SyncGate::default())?;
    execute(&syncer, direction(opts.action), log)
}

/// Map the CLI action to a transfer direction.
#[must_use]
pub const fn direction(action: SyncAction) -> Direction {
    match action {
        SyncAction::Push => Direction::Push,
        SyncAction::Pull => Direction::Pull,
    }
}

/// Run one transfer through `syncer`.
///
/// # Errors
///
/// Returns [`TransferFailure`](crate::error::DotdavError::TransferFailure)
/// if the client reports failure.
pub fn execute(syncer: &Syncer, direction: Direction, log: &dyn Log) -> Result<()> {
    match direction {
        Direction::Push => log.stage(&format!("Pushing to {}", syncer.remote())),
        Direction::Pull => log.stage(&format!("Pulling from {}", syncer.remote())),
    }
    syncer.transfer(direction)?;
    log.info(&format!("{direction} finished"));
    Ok(())
}
