use tracing::info;

use crate::apply::SystemRunner;
use crate::cli::{args::ConvertArgs, error::CliResult, logging, progress::ProgressReporter};
use crate::config::Config;
use crate::convert::{ConversionPipeline, ConvertOptions, MergeStatus};

/// How much terminal decoration the run may use
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    pub spinner: bool,
}

pub async fn execute(args: ConvertArgs, config: Config, mode: OutputMode) -> CliResult<()> {
    info!("Starting lora-convert {}", crate::VERSION);

    let (options, merge) = args.resolve(&config);
    let pipeline = ConversionPipeline::new(SystemRunner, merge, config.modelfile);

    let progress = if mode.spinner && will_merge(&options) {
        ProgressReporter::new("Merging adapter into base model...")
    } else {
        ProgressReporter::hidden()
    };
    let outcome = pipeline.run(&options).await;
    progress.finish_and_clear();
    let outcome = outcome?;

    report_merge(&outcome.merge);

    println!();
    logging::info("Converting to GGUF...");
    let guide = &outcome.guide;

    println!("{}", guide.conversion_steps());
    println!();
    logging::success(&format!(
        "Modelfile template saved to: {}",
        outcome.modelfile_path.display()
    ));
    println!();
    println!("{}", guide.next_steps());

    Ok(())
}

fn will_merge(options: &ConvertOptions) -> bool {
    !options.skip_merge && !options.dry_run && options.adapter.exists()
}

fn report_merge(status: &MergeStatus) {
    match status {
        MergeStatus::Merged(path) => {
            logging::success(&format!("Merged model saved to: {}", path.display()));
        }
        MergeStatus::DryRun(command) => {
            logging::info(&format!("Dry run, merge command: {}", command));
        }
        MergeStatus::AdapterMissing(path) => {
            logging::warning(&format!(
                "No adapter at {}, using the base model as is",
                path.display()
            ));
        }
        MergeStatus::Skipped => {}
    }
}
