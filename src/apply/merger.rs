//! Adapter fusion through the external merge tool

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::apply::CommandRunner;
use crate::config::MergeConfig;
use crate::error::{Error, Result};

/// Inputs and destination of one fuse invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuseRequest {
    pub model: PathBuf,
    pub adapter: PathBuf,
    pub save_path: PathBuf,
}

impl FuseRequest {
    pub fn new(
        model: impl Into<PathBuf>,
        adapter: impl Into<PathBuf>,
        save_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            model: model.into(),
            adapter: adapter.into(),
            save_path: save_path.into(),
        }
    }
}

/// Merges LoRA adapters into base models by shelling out to the merge tool
pub struct AdapterMerger<R: CommandRunner> {
    runner: R,
    merge: MergeConfig,
}

impl<R: CommandRunner> AdapterMerger<R> {
    pub fn new(runner: R, merge: MergeConfig) -> Self {
        Self { runner, merge }
    }

    /// Interpreter the command is run with
    pub fn program(&self) -> &str {
        &self.merge.python
    }

    /// Arguments passed to the interpreter for `request`
    pub fn args(&self, request: &FuseRequest) -> Vec<String> {
        let mut args = vec![
            "-m".to_string(),
            self.merge.module.clone(),
            self.merge.subcommand.clone(),
            "--model".to_string(),
            path_arg(&request.model),
            "--adapter-path".to_string(),
            path_arg(&request.adapter),
            "--save-path".to_string(),
            path_arg(&request.save_path),
        ];
        args.extend(self.merge.extra_args.iter().cloned());
        args
    }

    /// Full command line, for display
    pub fn command_line(&self, request: &FuseRequest) -> String {
        let mut parts = vec![self.program().to_string()];
        parts.extend(self.args(request));
        parts.join(" ")
    }

    /// Fuse the adapter into the base model, returning the merged model path
    pub async fn merge(&self, request: &FuseRequest) -> Result<PathBuf> {
        debug!("Merge command: {}", self.command_line(request));

        let output = self
            .runner
            .run(self.program(), &self.args(request))
            .await?;

        if !output.success() {
            return Err(Error::MergeFailed {
                code: output.code,
                stderr: output.stderr.trim_end().to_string(),
            });
        }

        if !output.stdout.trim().is_empty() {
            debug!("Merge tool output:\n{}", output.stdout.trim_end());
        }

        debug!("Merge tool finished, output in {}", request.save_path.display());
        Ok(request.save_path.clone())
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::{CommandOutput, MockCommandRunner};

    fn request() -> FuseRequest {
        FuseRequest::new("models/base", "adapters/sft", "exports/merged/demo")
    }

    #[test]
    fn test_args_follow_fuse_cli() {
        let merger = AdapterMerger::new(MockCommandRunner::new(), MergeConfig::default());

        assert_eq!(
            merger.args(&request()),
            vec![
                "-m",
                "mlx_lm",
                "fuse",
                "--model",
                "models/base",
                "--adapter-path",
                "adapters/sft",
                "--save-path",
                "exports/merged/demo",
            ]
        );
        assert_eq!(
            merger.command_line(&request()),
            "python3 -m mlx_lm fuse --model models/base --adapter-path adapters/sft \
             --save-path exports/merged/demo"
        );
    }

    #[test]
    fn test_extra_args_are_appended() {
        let merge = MergeConfig {
            extra_args: vec!["--de-quantize".to_string()],
            ..MergeConfig::default()
        };
        let merger = AdapterMerger::new(MockCommandRunner::new(), merge);

        assert_eq!(merger.args(&request()).last().unwrap(), "--de-quantize");
    }

    #[tokio::test]
    async fn test_merge_success_returns_save_path() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|program, args| program == "python3" && args.len() == 9)
            .times(1)
            .returning(|_, _| {
                Ok(CommandOutput {
                    code: Some(0),
                    stdout: "Loading pretrained model\n".to_string(),
                    stderr: String::new(),
                })
            });

        let merger = AdapterMerger::new(runner, MergeConfig::default());
        let merged = merger.merge(&request()).await.unwrap();

        assert_eq!(merged, PathBuf::from("exports/merged/demo"));
    }

    #[tokio::test]
    async fn test_merge_failure_carries_stderr() {
        let mut runner = MockCommandRunner::new();
        runner.expect_run().returning(|_, _| {
            Ok(CommandOutput {
                code: Some(1),
                stdout: String::new(),
                stderr: "No module named mlx_lm\n".to_string(),
            })
        });

        let merger = AdapterMerger::new(runner, MergeConfig::default());
        let err = merger.merge(&request()).await.unwrap_err();

        match &err {
            Error::MergeFailed { code, stderr } => {
                assert_eq!(*code, Some(1));
                assert_eq!(stderr, "No module named mlx_lm");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.to_string(), "Merge failed: No module named mlx_lm");
    }

    #[tokio::test]
    async fn test_killed_merge_is_a_failure() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .returning(|_, _| Ok(CommandOutput::default()));

        let merger = AdapterMerger::new(runner, MergeConfig::default());
        assert!(matches!(
            merger.merge(&request()).await,
            Err(Error::MergeFailed { code: None, .. })
        ));
    }
}
