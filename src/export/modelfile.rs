//! Ollama Modelfile template

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::config::ModelfileConfig;
use crate::error::{Error, Result};
use crate::export::ensure_parent;

/// Modelfile pointing Ollama at the converted GGUF file
#[derive(Debug, Clone, PartialEq)]
pub struct Modelfile {
    name: String,
    gguf_file: String,
    settings: ModelfileConfig,
}

impl Modelfile {
    /// Modelfile for `<name>.gguf` placed next to it. For a namespaced name
    /// such as `hub/model` the GGUF file is `model.gguf`.
    pub fn new(name: impl Into<String>, settings: ModelfileConfig) -> Self {
        let name = name.into();
        let stem = name.rsplit('/').next().unwrap_or(&name);
        Self {
            gguf_file: format!("{}.gguf", stem),
            name,
            settings,
        }
    }

    /// Render the Modelfile. `location` is where it will be written and
    /// only appears in the usage comment.
    pub fn render(&self, location: &Path) -> String {
        let settings = &self.settings;
        let mut out = format!(
            "# Modelfile for {name}\n\
             # After converting to GGUF, run: {create}\n\
             \n\
             FROM ./{gguf}\n\
             \n\
             TEMPLATE \"\"\"{template}\"\"\"\n\
             \n\
             PARAMETER temperature {temperature}\n\
             PARAMETER top_p {top_p}\n",
            name = self.name,
            create = ollama_create_command(&self.name, location),
            gguf = self.gguf_file,
            template = settings.prompt_template,
            temperature = settings.temperature,
            top_p = settings.top_p,
        );

        for stop in settings.stop.iter().filter(|s| !s.is_empty()) {
            let _ = writeln!(out, "PARAMETER stop \"{}\"", quote(stop));
        }

        out
    }

    /// Render and write the Modelfile to `path`, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        ensure_parent(path)?;
        fs::write(path, self.render(path)).map_err(|e| Error::path(path, e))?;
        tracing::debug!("Wrote Modelfile for {} to {}", self.name, path.display());
        Ok(())
    }
}

/// Escape a value for a double-quoted Modelfile argument
fn quote(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Command that builds the Ollama model from a Modelfile
pub fn ollama_create_command(name: &str, modelfile: &Path) -> String {
    format!("ollama create {} -f {}", name, modelfile.display())
}
