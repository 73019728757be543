//! Command: run the autosync daemon until interrupted.
use anyhow::{Context as _, Result};
use std::sync::Arc;

use super::CommandSetup;
use crate::cli::GlobalOpts;
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::sync::{AutoSyncDaemon, RcloneClient, ShutdownSignal, SyncGate, Syncer};

/// Run the autosync command.
///
/// Blocks until Ctrl-C (or SIGTERM), then stops the watcher, discards a
/// pending push and joins the workers. A transfer already running finishes
/// first.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, no remote is configured,
/// the signal handler cannot be installed, or the daemon cannot start.
pub fn run(global: &GlobalOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = CommandSetup::init(global, log.as_ref())?;
    let client = Arc::new(RcloneClient::new(Arc::new(SystemExecutor)));
    let syncer = Syncer::from_settings(&setup.settings, client, SyncGate::default())?;

    let shutdown = ShutdownSignal::new();
    let on_interrupt = shutdown.clone();
    ctrlc::set_handler(move || on_interrupt.trigger())
        .context("install interrupt handler")?;

    log.stage("Starting autosync");
    let sink = Arc::clone(log) as Arc<dyn Log>;
    let handle = AutoSyncDaemon::from_settings(&setup.settings, syncer, sink).start(shutdown)?;
    handle.wait();
    log.info("autosync stopped");
    Ok(())
}
