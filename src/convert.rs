//! Conversion pipeline: optional adapter merge followed by export scaffolding

use std::path::PathBuf;
use tracing::{debug, instrument};

use crate::apply::{AdapterMerger, CommandRunner, FuseRequest};
use crate::config::{validate_output_name, Config, MergeConfig, ModelfileConfig};
use crate::error::{Error, Result};
use crate::export::{ensure_parent, ConversionGuide, ExportLayout, Modelfile};

/// Fully resolved options for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    pub model: PathBuf,
    pub adapter: PathBuf,
    pub output_name: String,
    pub skip_merge: bool,
    /// Report the merge command without running it
    pub dry_run: bool,
    pub export_root: PathBuf,
}

impl ConvertOptions {
    /// Options taken entirely from `config`
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.paths.model.clone(),
            adapter: config.paths.adapter.clone(),
            output_name: config.paths.output_name.clone(),
            skip_merge: false,
            dry_run: false,
            export_root: config.paths.export_root.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_output_name(&self.output_name)?;

        if self.model.as_os_str().is_empty() {
            return Err(Error::invalid_input("Model path cannot be empty"));
        }

        Ok(())
    }
}

/// What happened to the adapter during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeStatus {
    /// Adapter fused into the model at this path
    Merged(PathBuf),
    /// Merge disabled by the caller
    Skipped,
    /// No adapter found at the configured path
    AdapterMissing(PathBuf),
    /// Merge command that would have run
    DryRun(String),
}

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    pub merge: MergeStatus,
    pub guide: ConversionGuide,
    pub modelfile_path: PathBuf,
}

impl ConversionOutcome {
    /// Model directory the GGUF conversion should start from
    pub fn model_path(&self) -> &std::path::Path {
        self.guide.model_path()
    }
}

/// Merges the adapter when present, then prepares the GGUF export
pub struct ConversionPipeline<R: CommandRunner> {
    merger: AdapterMerger<R>,
    modelfile: ModelfileConfig,
}

impl<R: CommandRunner> ConversionPipeline<R> {
    pub fn new(runner: R, merge: MergeConfig, modelfile: ModelfileConfig) -> Self {
        Self {
            merger: AdapterMerger::new(runner, merge),
            modelfile,
        }
    }

    /// Run the merge step. Returns the model path to export and the merge status.
    #[instrument(skip(self, options), fields(output = %options.output_name))]
    async fn merge_step(&self, options: &ConvertOptions) -> Result<(PathBuf, MergeStatus)> {
        if options.skip_merge {
            debug!("Skipping adapter merge");
            return Ok((options.model.clone(), MergeStatus::Skipped));
        }

        if !options.adapter.exists() {
            debug!("No adapter at {}", options.adapter.display());
            return Ok((
                options.model.clone(),
                MergeStatus::AdapterMissing(options.adapter.clone()),
            ));
        }

        let layout = ExportLayout::new(&options.export_root);
        let merged_path = layout.merged_dir(&options.output_name);
        let request = FuseRequest::new(&options.model, &options.adapter, &merged_path);

        if options.dry_run {
            let command = self.merger.command_line(&request);
            debug!("Dry run, merge command not executed");
            return Ok((merged_path, MergeStatus::DryRun(command)));
        }

        ensure_parent(&merged_path)?;
        let merged = self.merger.merge(&request).await?;
        Ok((merged.clone(), MergeStatus::Merged(merged)))
    }

    /// Lay out the export directory and write the Modelfile for `model_path`
    #[instrument(skip(self, options), fields(output = %options.output_name))]
    fn export_step(
        &self,
        options: &ConvertOptions,
        model_path: PathBuf,
    ) -> Result<(ConversionGuide, PathBuf)> {
        debug!("Preparing GGUF export");
        let layout = ExportLayout::new(&options.export_root);

        // Staging area for a Hugging Face copy of the model
        ensure_parent(&layout.hf_dir(&options.output_name))?;

        let modelfile_path = layout.modelfile_path(&options.output_name);
        Modelfile::new(&options.output_name, self.modelfile.clone()).write(&modelfile_path)?;
        debug!("Wrote Modelfile to {}", modelfile_path.display());

        let guide = ConversionGuide::new(&options.output_name, model_path, &modelfile_path);
        Ok((guide, modelfile_path))
    }

    /// Merge (when applicable) and export
    pub async fn run(&self, options: &ConvertOptions) -> Result<ConversionOutcome> {
        options.validate()?;

        let (model_path, merge) = self.merge_step(options).await?;
        let (guide, modelfile_path) = self.export_step(options, model_path)?;

        Ok(ConversionOutcome {
            merge,
            guide,
            modelfile_path,
        })
    }
}
