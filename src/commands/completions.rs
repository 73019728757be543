//! Command: print a shell completion script.
use clap::CommandFactory as _;
use clap_complete::generate;

use crate::cli::{Cli, CompletionsOpts};

/// Write the completion script for `opts.shell` to stdout.
pub fn run(opts: &CompletionsOpts) {
    let mut cmd = Cli::command();
    generate(opts.shell, &mut cmd, "dotdav", &mut std::io::stdout());
}
