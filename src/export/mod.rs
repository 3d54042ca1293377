//! GGUF export scaffolding
//!
//! The actual GGUF conversion happens outside this tool. This module lays out
//! the export directory, renders the conversion guide and writes the Ollama
//! Modelfile that consumes the converted file.

pub mod guide;
pub mod modelfile;

pub use guide::ConversionGuide;
pub use modelfile::Modelfile;

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Locations of the generated artifacts under one export root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    root: PathBuf,
}

impl ExportLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Destination of the fused model
    pub fn merged_dir(&self, name: &str) -> PathBuf {
        self.root.join("merged").join(name)
    }

    /// Staging directory for a Hugging Face formatted copy
    pub fn hf_dir(&self, name: &str) -> PathBuf {
        self.root.join("hf").join(name)
    }

    pub fn modelfile_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.Modelfile", name))
    }
}

/// Create the parent directory of `path` if it has one
pub fn ensure_parent(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| Error::path(parent, e))
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_layout_paths() {
        let layout = ExportLayout::new("exports");
        assert_eq!(layout.merged_dir("demo"), PathBuf::from("exports/merged/demo"));
        assert_eq!(layout.hf_dir("demo"), PathBuf::from("exports/hf/demo"));
        assert_eq!(layout.modelfile_path("demo"), PathBuf::from("exports/demo.Modelfile"));
    }

    #[test]
    fn test_ensure_parent_creates_only_the_parent() {
        let dir = TempDir::new().unwrap();
        let layout = ExportLayout::new(dir.path().join("exports"));
        let merged = layout.merged_dir("demo");

        ensure_parent(&merged).unwrap();

        assert!(dir.path().join("exports/merged").is_dir());
        assert!(!merged.exists());
    }

    #[test]
    fn test_ensure_parent_accepts_bare_file_name() {
        assert!(ensure_parent(Path::new("demo.Modelfile")).is_ok());
    }
}
