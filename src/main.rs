use clap::{CommandFactory, Parser};
use clap_complete::{generate, Generator};
use lora_convert::cli::{self, commands, Cli, CliResult, Commands};
use lora_convert::config::load_config;
use std::io::{self, IsTerminal};

fn print_completions<G: Generator>(gen: G, cmd: &mut clap::Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.print_error();
        std::process::exit(e.exit_code());
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    // Initialize logging based on verbosity
    cli::logging::init_logging(cli.verbose, cli.quiet, cli.json)?;

    match cli.command {
        None => {
            let config = load_config(cli.config.as_deref())?;
            let mode = commands::OutputMode {
                spinner: !cli.quiet && !cli.json && io::stderr().is_terminal(),
            };
            commands::convert::execute(cli.convert, config, mode).await
        }
        Some(Commands::Config { subcommand }) => {
            commands::config::execute(subcommand, cli.config.as_deref())
        }
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            print_completions(shell, &mut cmd);
            Ok(())
        }
    }
}
