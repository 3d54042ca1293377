//! LoRA adapter merging
//!
//! Fusing an adapter into its base model is delegated to an external tool
//! (`python -m mlx_lm fuse` by default). This module builds that invocation
//! and runs it through a [`CommandRunner`].

pub mod merger;

pub use merger::{AdapterMerger, FuseRequest};

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::{Error, Result};

/// Captured result of a finished subprocess
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` when terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Runs an external program to completion and captures its output
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

/// Runs commands as real child processes
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        tracing::debug!("Running: {} {}", program, args.join(" "));

        let output = Command::new(program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| Error::Spawn {
                program: program.to_string(),
                source,
            })?;

        Ok(CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_system_runner_reports_missing_program() {
        let err = SystemRunner
            .run("lora-convert-definitely-not-installed", &[])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_system_runner_captures_exit_code() {
        let ok = SystemRunner.run("true", &[]).await.unwrap();
        assert!(ok.success());

        let failed = SystemRunner.run("false", &[]).await.unwrap();
        assert!(!failed.success());
        assert_eq!(failed.code, Some(1));
    }
}
