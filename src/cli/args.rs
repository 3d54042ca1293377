use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::config::{Config, MergeConfig};
use crate::convert::ConvertOptions;

#[derive(Parser, Debug)]
#[command(
    name = "lora-convert",
    version,
    about = "Merge a LoRA adapter and prepare the model for GGUF/Ollama",
    long_about = "Fuses a LoRA adapter into its base model with `mlx_lm fuse`, prints the \
                  steps for converting the result to GGUF and writes an Ollama Modelfile \
                  for the converted model."
)]
#[command(propagate_version = true, args_conflicts_with_subcommands = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[command(flatten)]
    pub convert: ConvertArgs,

    /// Set the verbosity level (can be repeated for more verbose output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Silence all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "LORA_CONVERT_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Flags of the default convert run. Unset values come from the config file.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertArgs {
    /// Base model path [default: models/Qwen_Qwen2.5-1.5B/mlx]
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// LoRA adapter path [default: adapters/sft]
    #[arg(long, value_name = "PATH")]
    pub adapter: Option<PathBuf>,

    /// Output model name [default: qmd-expansion]
    #[arg(short, long, value_name = "NAME")]
    pub output: Option<String>,

    /// Skip adapter merge
    #[arg(long)]
    pub skip_merge: bool,

    /// Python interpreter that runs the merge tool [default: python3]
    #[arg(long, value_name = "PROG", env = "LORA_CONVERT_PYTHON")]
    pub python: Option<String>,

    /// Directory for merged models and Modelfiles [default: exports]
    #[arg(long, value_name = "DIR")]
    pub export_dir: Option<PathBuf>,

    /// Print the merge command instead of running it
    #[arg(long)]
    pub dry_run: bool,
}

impl ConvertArgs {
    /// Layer the flags over `config`
    pub fn resolve(&self, config: &Config) -> (ConvertOptions, MergeConfig) {
        let mut options = ConvertOptions::from_config(config);
        if let Some(model) = &self.model {
            options.model = model.clone();
        }
        if let Some(adapter) = &self.adapter {
            options.adapter = adapter.clone();
        }
        if let Some(output) = &self.output {
            options.output_name = output.clone();
        }
        if let Some(export_dir) = &self.export_dir {
            options.export_root = export_dir.clone();
        }
        options.skip_merge = self.skip_merge;
        options.dry_run = self.dry_run;

        let mut merge = config.merge.clone();
        if let Some(python) = &self.python {
            merge.python = python.clone();
        }

        (options, merge)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage lora-convert configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },

    /// Generate shell completions
    Completions {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Force overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Print the default configuration file location
    Path,
}
