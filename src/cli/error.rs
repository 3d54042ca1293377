use colored::*;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration file already exists: {0}")]
    ConfigExists(std::path::PathBuf),

    #[error(transparent)]
    Convert(#[from] crate::error::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        1
    }

    /// Print a user-friendly error message
    pub fn print_error(&self) {
        eprintln!("{} {}", "Error:".red().bold(), self);

        // Add helpful suggestions based on error type
        match self {
            CliError::Convert(crate::error::Error::Spawn { program, .. }) => {
                eprintln!(
                    "\n{} Make sure '{}' is installed, or choose another interpreter with {}",
                    "Hint:".yellow(),
                    program.cyan(),
                    "--python".cyan()
                );
            }
            CliError::Convert(crate::error::Error::MergeFailed { .. }) => {
                eprintln!(
                    "\n{} Check that {} is installed for this interpreter, or rerun with {}",
                    "Hint:".yellow(),
                    "mlx-lm".cyan(),
                    "--skip-merge".cyan()
                );
            }
            CliError::Convert(crate::error::Error::Config(_)) | CliError::Config(_) => {
                eprintln!(
                    "\n{} Run {} to see the effective configuration",
                    "Hint:".yellow(),
                    "lora-convert config show".cyan()
                );
            }
            CliError::ConfigExists(_) => {
                eprintln!("\n{} Use {} to overwrite it", "Hint:".yellow(), "--force".cyan());
            }
            _ => {}
        }
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(err: serde_yaml::Error) -> Self {
        CliError::Config(err.to_string())
    }
}
