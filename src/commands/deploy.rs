//! Command: link every tracked file into place for the current profile.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{DeployOpts, GlobalOpts};
use crate::config::{MappingStore, Settings};
use crate::engine::{DeployEngine, DeployReport, Deployed};
use crate::logging::{EntryStatus, Log, Logger};

/// Run the deploy command.
///
/// # Errors
///
/// Returns an error if settings or mappings cannot be loaded, or any entry
/// conflicted or failed.
pub fn run(global: &GlobalOpts, opts: &DeployOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let store = setup.mappings()?;
    let reports = execute(&setup.settings, &store, opts, global.parallel, log);
    log.debug(&format!("{} report(s)", reports.len()));
    super::finish(log)
}

/// Reconcile every tracked file and record one summary entry each.
#[must_use]
pub fn execute(
    settings: &Settings,
    store: &MappingStore,
    opts: &DeployOpts,
    parallel: bool,
    log: &dyn Log,
) -> Vec<DeployReport> {
    log.stage(&format!(
        "Deploying {} tracked file(s) for profile {}",
        store.len(),
        settings.current_profile
    ));
    let reports = DeployEngine::new(settings, store, parallel).deploy(opts.force);
    for report in &reports {
        record(report, log);
    }
    reports
}

fn record(report: &DeployReport, log: &dyn Log) {
    let status = report.status();
    match &report.outcome {
        Ok(Deployed::Linked) => {
            log.info(&format!("linked {}", report.key));
            log.record(&report.key, status, None);
        }
        Ok(Deployed::UpToDate) => {
            log.debug(&format!("up to date: {}", report.key));
            log.record(&report.key, status, None);
        }
        Err(e) => {
            let message = e.to_string();
            match status {
                EntryStatus::Skipped => log.debug(&format!("skipping {}: {message}", report.key)),
                EntryStatus::Warning => log.warn(&message),
                _ => log.error(&message),
            }
            log.record(&report.key, status, Some(&message));
        }
    }
}
