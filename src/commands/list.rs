//! Command: list tracked files.
use anyhow::{Context as _, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ListOpts};
use crate::config::{MappingStore, Settings};
use crate::engine::TrackedKey;
use crate::logging::Logger;

/// One tracked file as shown by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// Mapping key.
    pub key: String,
    /// Where the file deploys on this machine.
    pub destination: PathBuf,
    /// Every profile entry, profile name to repository-relative artifact.
    pub profiles: BTreeMap<String, String>,
    /// Profile whose artifact the current profile resolves to, if any.
    pub active_profile: Option<String>,
    /// Artifact the current profile resolves to, if any.
    pub active: Option<String>,
}

/// Run the list command.
///
/// # Errors
///
/// Returns an error if settings or mappings cannot be loaded, or JSON output
/// cannot be serialized.
pub fn run(global: &GlobalOpts, opts: &ListOpts, log: &Logger) -> Result<()> {
    let setup = CommandSetup::init(global, log)?;
    let store = setup.mappings()?;
    let entries = entries(&setup.settings, &store);

    if opts.json {
        let json = serde_json::to_string_pretty(&entries).context("serialize tracked files")?;
        println!("{json}");
        return Ok(());
    }

    if entries.is_empty() {
        log.info("no tracked files, add one with 'dotdav add <file>'");
        return Ok(());
    }
    log.stage(&format!(
        "{} tracked file(s), profile {}",
        entries.len(),
        setup.settings.current_profile
    ));
    for line in render(&entries) {
        println!("{line}");
    }
    Ok(())
}

/// Collect every tracked file in key order, resolved for the current
/// profile.
#[must_use]
pub fn entries(settings: &Settings, store: &MappingStore) -> Vec<ListEntry> {
    store
        .iter()
        .map(|(key, profiles)| {
            let resolution = store.resolve(key, &settings.current_profile);
            ListEntry {
                key: key.to_string(),
                destination: TrackedKey::parse(key).destination(&settings.home),
                profiles: profiles.clone(),
                active_profile: resolution.map(|r| r.profile.to_string()),
                active: resolution.map(|r| r.artifact.to_string()),
            }
        })
        .collect()
}

/// Format entries as aligned text lines: key, active artifact, profiles.
#[must_use]
pub fn render(entries: &[ListEntry]) -> Vec<String> {
    let width = entries.iter().map(|e| e.key.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|e| {
            let active = e.active.as_deref().unwrap_or("-");
            let profiles = e.profiles.keys().cloned().collect::<Vec<_>>().join(", ");
            format!("{:<width$}  {active}  [{profiles}]", e.key)
        })
        .collect()
}
