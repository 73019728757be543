//! [`RemoteSyncClient`] backed by the `rclone` command.
use anyhow::{Result, bail};
use std::fmt;
use std::sync::Arc;

use super::RemoteSyncClient;
use crate::exec::Executor;

/// Runs `rclone sync <source> <destination> --exclude <pattern>...`.
#[derive(Clone)]
pub struct RcloneClient {
    executor: Arc<dyn Executor>,
}

impl fmt::Debug for RcloneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RcloneClient").finish_non_exhaustive()
    }
}

impl RcloneClient {
    /// Create a client running rclone through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }
}

/// Build the rclone argument list for one mirror transfer.
#[must_use]
pub fn sync_args(source: &str, destination: &str, excludes: &[String]) -> Vec<String> {
    let mut args = vec![
        "sync".to_string(),
        source.to_string(),
        destination.to_string(),
    ];
    for pattern in excludes {
        args.push("--exclude".to_string());
        args.push(pattern.clone());
    }
    args
}

impl RemoteSyncClient for RcloneClient {
    fn mirror(&self, source: &str, destination: &str, excludes: &[String]) -> Result<()> {
        if !self.executor.which("rclone") {
            bail!("rclone not found, please install rclone");
        }
        self.executor
            .run("rclone", &sync_args(source, destination, excludes))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::exec::{ExecResult, MockExecutor};
    use mockall::predicate::eq;

    #[test]
    fn args_carry_excludes_in_order() {
        let args = sync_args(
            "/dots/repo",
            "gdrive:dotfiles",
            &["*.swp".to_string(), ".DS_Store".to_string()],
        );
        assert_eq!(
            args,
            [
                "sync",
                "/dots/repo",
                "gdrive:dotfiles",
                "--exclude",
                "*.swp",
                "--exclude",
                ".DS_Store"
            ]
        );
    }

    #[test]
    fn mirror_runs_rclone_sync() {
        let mut exec = MockExecutor::new();
        exec.expect_which().with(eq("rclone")).return_const(true);
        exec.expect_run()
            .with(eq("rclone"), eq(sync_args("gdrive:dotfiles", "/dots/repo", &[])))
            .times(1)
            .returning(|_, _| Ok(ExecResult::default()));
        RcloneClient::new(Arc::new(exec))
            .mirror("gdrive:dotfiles", "/dots/repo", &[])
            .unwrap();
    }

    #[test]
    fn missing_rclone_is_an_error() {
        let mut exec = MockExecutor::new();
        exec.expect_which().return_const(false);
        exec.expect_run().never();
        let err = RcloneClient::new(Arc::new(exec))
            .mirror("a", "b", &[])
            .unwrap_err();
        assert!(err.to_string().contains("rclone not found"));
    }

    #[test]
    fn nonzero_exit_is_an_error() {
        let mut exec = MockExecutor::new();
        exec.expect_which().return_const(true);
        exec.expect_run()
            .returning(|_, _| Err(anyhow::anyhow!("rclone failed (exit 3): directory not found")));
        let err = RcloneClient::new(Arc::new(exec))
            .mirror("a", "b", &[])
            .unwrap_err();
        assert!(err.to_string().contains("exit 3"));
    }
}
