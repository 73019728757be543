use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use dotdav::cli::{Cli, Command};
use dotdav::commands;
use dotdav::logging::{Logger, init_subscriber};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    match &args.command {
        Command::Version => {
            commands::version::run();
            return Ok(());
        }
        Command::Completions(opts) => {
            commands::completions::run(opts);
            return Ok(());
        }
        _ => {}
    }

    let name = args.command.name();
    init_subscriber(args.verbose, name, matches!(args.command, Command::Autosync));
    let log = Arc::new(Logger::new(name));
    log.debug(&format!("dotdav {}", commands::version::version()));

    match &args.command {
        Command::Init(opts) => commands::init::run(&args.global, opts, &log),
        Command::Add(opts) => commands::add::run(&args.global, opts, &log),
        Command::Remove(opts) => commands::remove::run(&args.global, opts, &log),
        Command::Profile(opts) => commands::profile::run(&args.global, opts, &log),
        Command::Deploy(opts) => commands::deploy::run(&args.global, opts, &log),
        Command::List(opts) => commands::list::run(&args.global, opts, &log),
        Command::Sync(opts) => commands::sync::run(&args.global, opts, &log),
        Command::Autosync => commands::autosync::run(&args.global, &log),
        Command::Service(opts) => commands::service::run(&args.global, opts, &log),
        Command::Completions(_) | Command::Version => Ok(()),
    }
}
