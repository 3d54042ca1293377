//! lora-convert - merge a LoRA adapter and prepare a GGUF/Ollama export
//!
//! The adapter is fused into its base model by an external tool
//! (`mlx_lm fuse`), after which the crate prints the steps for converting the
//! result to GGUF and writes an Ollama Modelfile for the converted file.

#![warn(rustdoc::broken_intra_doc_links)]

pub mod apply;
pub mod cli;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;

// Re-exports
pub use apply::{AdapterMerger, CommandOutput, CommandRunner, FuseRequest, SystemRunner};
pub use config::Config;
pub use convert::{ConversionOutcome, ConversionPipeline, ConvertOptions, MergeStatus};
pub use error::{Error, Result};
pub use export::{ConversionGuide, ExportLayout, Modelfile};

/// Current version of lora-convert
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
