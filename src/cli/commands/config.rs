use std::path::Path;

use crate::cli::args::ConfigSubcommand;
use crate::cli::error::{CliError, CliResult};
use crate::config::{default_config_path, load_config, Config};

pub fn execute(subcommand: ConfigSubcommand, config_path: Option<&Path>) -> CliResult<()> {
    match subcommand {
        ConfigSubcommand::Show => {
            let config = load_config(config_path)?;
            show_config(&config)
        }
        ConfigSubcommand::Init { force } => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => default_config_path()?,
            };
            init_config(&path, force)?;
            println!("Configuration file created: {}", path.display());
            Ok(())
        }
        ConfigSubcommand::Path => {
            let path = match config_path {
                Some(path) => path.to_path_buf(),
                None => default_config_path()?,
            };
            println!("{}", path.display());
            Ok(())
        }
    }
}

pub fn show_config(config: &Config) -> CliResult<()> {
    let yaml_content = serde_yaml::to_string(config)?;
    println!("{}", yaml_content);
    Ok(())
}

/// Write the default configuration to `path`
pub fn init_config(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::ConfigExists(path.to_path_buf()));
    }

    Config::default().save(path)?;
    Ok(())
}
