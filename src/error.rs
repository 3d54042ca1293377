//! Error types for lora-convert

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for conversion operations
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The merge tool ran and exited unsuccessfully
    #[error("Merge failed: {stderr}")]
    MergeFailed {
        /// Exit code, `None` when the process was killed by a signal
        code: Option<i32>,
        /// Captured standard error of the merge tool
        stderr: String,
    },

    /// The merge tool could not be started at all
    #[error("Failed to launch '{program}': {source}")]
    Spawn {
        /// Program that was being executed
        program: String,
        /// Underlying launch error
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error with the path that caused it
    #[error("IO error at {}: {source}", path.display())]
    Path {
        /// Path being read or written
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Result type alias for conversion operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Attach a path to an IO error
    pub fn path(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Path {
            path: path.into(),
            source,
        }
    }
}

// Config files are the only serde documents this crate reads or writes.

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Config(err.to_string())
    }
}
