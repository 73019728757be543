//! Profile-aware dotfile tracking.
//!
//! dotdav copies dotfiles into a repository directory (one subdirectory per
//! profile), records where each one came from in a mapping store, deploys
//! them back as symlinks for the active profile, and keeps the repository
//! mirrored with a remote through rclone.
//!
//! The public API is organised into layers:
//!
//! - **[`config`]**: settings, the mapping store, and ignore patterns (TOML)
//! - **[`resources`]**: idempotent `check + apply` primitives (symlinks, the service unit)
//! - **[`engine`]**: tracked-file identity, add/remove, and deploy
//! - **[`sync`]**: push/pull transfers, the debouncer, and the autosync daemon
//! - **[`commands`]**: top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod exec;
pub mod logging;
pub mod resources;
pub mod sync;
