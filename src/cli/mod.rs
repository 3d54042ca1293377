pub mod args;
pub mod commands;
pub mod error;
pub mod logging;
pub mod progress;

pub use args::{Cli, Commands, ConfigSubcommand, ConvertArgs};
pub use error::{CliError, CliResult};
