use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Top-level CLI entry point for dotdav.
#[derive(Parser, Debug)]
#[command(
    name = "dotdav",
    about = "Profile-aware dotfile tracking with symlink deploy and rclone autosync",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone)]
pub struct GlobalOpts {
    /// Override the dotdav root directory (settings, mappings and repo/);
    /// falls back to `DOTDAV_ROOT`
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Disable parallel deploy (parallel is enabled by default)
    #[arg(long = "no-parallel", global = true, action = clap::ArgAction::SetFalse)]
    pub parallel: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the repository and remote settings
    Init(InitOpts),
    /// Copy a file or directory into the repository and track it
    Add(TrackOpts),
    /// Restore a tracked file and stop tracking it
    Remove(TrackOpts),
    /// Show or switch the current profile
    Profile(ProfileOpts),
    /// Symlink tracked files into place for the current profile
    Deploy(DeployOpts),
    /// List tracked files
    List(ListOpts),
    /// Push or pull the repository once
    Sync(SyncOpts),
    /// Run the autosync daemon until interrupted
    Autosync,
    /// Install or uninstall the autosync systemd user service
    Service(ServiceOpts),
    /// Print a shell completion script
    Completions(CompletionsOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Short name used for the log file.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Init(_) => "init",
            Self::Add(_) => "add",
            Self::Remove(_) => "remove",
            Self::Profile(_) => "profile",
            Self::Deploy(_) => "deploy",
            Self::List(_) => "list",
            Self::Sync(_) => "sync",
            Self::Autosync => "autosync",
            Self::Service(_) => "service",
            Self::Completions(_) => "completions",
            Self::Version => "version",
        }
    }
}

/// Options for the `init` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct InitOpts {
    /// rclone remote name
    #[arg(long)]
    pub remote: Option<String>,

    /// Path on the remote
    #[arg(long)]
    pub path: Option<String>,
}

/// Options for the `add` and `remove` subcommands.
#[derive(Parser, Debug, Clone)]
pub struct TrackOpts {
    /// File or directory
    pub file: PathBuf,

    /// Profile to operate on (defaults to the current profile)
    #[arg(short, long)]
    pub profile: Option<String>,
}

/// Options for the `profile` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ProfileOpts {
    /// Profile to switch to; prints the current profile when omitted
    pub name: Option<String>,
}

/// Options for the `deploy` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct DeployOpts {
    /// Replace existing files and directories at the destination
    #[arg(short, long)]
    pub force: bool,
}

/// Options for the `list` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ListOpts {
    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Options for the `sync` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct SyncOpts {
    /// Transfer direction
    #[arg(value_enum)]
    pub action: SyncAction,
}

/// Manual transfer direction.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    /// Mirror the local repository to the remote
    Push,
    /// Mirror the remote to the local repository
    Pull,
}

/// Options for the `service` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct ServiceOpts {
    /// What to do with the unit
    #[arg(value_enum)]
    pub action: ServiceAction,
}

/// Service management action.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceAction {
    /// Write, enable and start the unit
    Install,
    /// Stop, disable and delete the unit
    Uninstall,
}

/// Options for the `completions` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct CompletionsOpts {
    /// Target shell
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_add_with_profile() {
        let cli = Cli::parse_from(["dotdav", "add", "~/.bashrc", "--profile", "work"]);
        assert!(
            matches!(&cli.command, Command::Add(_)),
            "Expected Add command"
        );
        if let Command::Add(opts) = cli.command {
            assert_eq!(opts.file, PathBuf::from("~/.bashrc"));
            assert_eq!(opts.profile.as_deref(), Some("work"));
        }
    }

    #[test]
    fn parse_remove_short_profile() {
        let cli = Cli::parse_from(["dotdav", "remove", ".vimrc", "-p", "laptop"]);
        assert!(
            matches!(&cli.command, Command::Remove(_)),
            "Expected Remove command"
        );
        if let Command::Remove(opts) = cli.command {
            assert_eq!(opts.profile.as_deref(), Some("laptop"));
        }
    }

    #[test]
    fn parse_deploy_force() {
        let cli = Cli::parse_from(["dotdav", "deploy", "--force"]);
        assert!(matches!(cli.command, Command::Deploy(DeployOpts { force: true })));
    }

    #[test]
    fn parse_profile_without_name() {
        let cli = Cli::parse_from(["dotdav", "profile"]);
        assert!(matches!(cli.command, Command::Profile(ProfileOpts { name: None })));
    }

    #[test]
    fn parse_sync_actions() {
        let cli = Cli::parse_from(["dotdav", "sync", "pull"]);
        assert!(matches!(
            cli.command,
            Command::Sync(SyncOpts {
                action: SyncAction::Pull
            })
        ));
        assert!(Cli::try_parse_from(["dotdav", "sync", "both"]).is_err());
    }

    #[test]
    fn parse_service_install() {
        let cli = Cli::parse_from(["dotdav", "service", "install"]);
        assert!(matches!(
            cli.command,
            Command::Service(ServiceOpts {
                action: ServiceAction::Install
            })
        ));
    }

    #[test]
    fn parse_init_remote_and_path() {
        let cli = Cli::parse_from(["dotdav", "init", "--remote", "gdrive", "--path", "dots"]);
        assert!(
            matches!(&cli.command, Command::Init(_)),
            "Expected Init command"
        );
        if let Command::Init(opts) = cli.command {
            assert_eq!(opts.remote.as_deref(), Some("gdrive"));
            assert_eq!(opts.path.as_deref(), Some("dots"));
        }
    }

    #[test]
    fn parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["dotdav", "deploy", "-v", "--no-parallel", "--root", "/dots"]);
        assert!(cli.verbose);
        assert!(!cli.global.parallel);
        assert_eq!(cli.global.root, Some(PathBuf::from("/dots")));
    }

    #[test]
    fn parallel_is_default() {
        let cli = Cli::parse_from(["dotdav", "list"]);
        assert!(cli.global.parallel);
    }

    #[test]
    fn parse_completions_shell() {
        let cli = Cli::parse_from(["dotdav", "completions", "fish"]);
        assert!(matches!(
            cli.command,
            Command::Completions(CompletionsOpts {
                shell: clap_complete::Shell::Fish
            })
        ));
    }

    #[test]
    fn command_names_match_subcommands() {
        let cli = Cli::parse_from(["dotdav", "autosync"]);
        assert_eq!(cli.command.name(), "autosync");
        let cli = Cli::parse_from(["dotdav", "version"]);
        assert_eq!(cli.command.name(), "version");
    }
}
