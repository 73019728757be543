//! Command: show or switch the current profile.
use anyhow::Result;

use super::CommandSetup;
use crate::cli::{GlobalOpts, ProfileOpts};
use crate::logging::Logger;

/// Run the profile command.
///
/// # Errors
///
/// Returns an error if settings cannot be loaded, the name is invalid, or the
/// local settings file cannot be written.
pub fn run(global: &GlobalOpts, opts: &ProfileOpts, log: &Logger) -> Result<()> {
    let mut setup = CommandSetup::init(global, log)?;
    match opts.name.as_deref() {
        Some(name) => {
            setup.settings.set_profile(name)?;
            log.info(&format!("switched to profile: {name}"));
        }
        None => println!("{}", setup.settings.current_profile),
    }
    Ok(())
}
