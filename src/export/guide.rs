//! Instructions for the GGUF conversion performed by other tools

use std::path::{Path, PathBuf};

use crate::export::modelfile::ollama_create_command;

const LLAMA_CPP_REPO: &str = "https://github.com/ggerganov/llama.cpp";

/// Step-by-step conversion instructions for one exported model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionGuide {
    output_name: String,
    model_path: PathBuf,
    modelfile_path: PathBuf,
}

impl ConversionGuide {
    pub fn new(
        output_name: impl Into<String>,
        model_path: impl Into<PathBuf>,
        modelfile_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            output_name: output_name.into(),
            model_path: model_path.into(),
            modelfile_path: modelfile_path.into(),
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn huggingface_upload_command(&self) -> String {
        format!(
            "huggingface-cli upload {} {}",
            self.output_name,
            self.model_path.display()
        )
    }

    pub fn llama_cpp_convert_command(&self) -> String {
        format!(
            "python llama.cpp/convert_hf_to_gguf.py {} --outfile {}.gguf",
            self.model_path.display(),
            self.output_name
        )
    }

    pub fn ollama_create_command(&self) -> String {
        ollama_create_command(&self.output_name, &self.modelfile_path)
    }

    /// Options for getting from the model directory to a GGUF file
    pub fn conversion_steps(&self) -> String {
        format!(
            "Model at: {model}\n\
             \n\
             To convert to GGUF, you have two options:\n\
             \n\
             1. Upload to HuggingFace and use their GGUF converter:\n   \
                {upload}\n   \
                Then use HF's GGUF conversion in the model settings\n\
             \n\
             2. Use llama.cpp's convert script:\n   \
                git clone {repo}\n   \
                {convert}\n\
             \n\
             3. Create Ollama Modelfile:",
            model = self.model_path.display(),
            upload = self.huggingface_upload_command(),
            repo = LLAMA_CPP_REPO,
            convert = self.llama_cpp_convert_command(),
        )
    }

    /// What to run once the GGUF file exists
    pub fn next_steps(&self) -> String {
        format!(
            "After GGUF conversion, create Ollama model with:\n   {}",
            self.ollama_create_command()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guide() -> ConversionGuide {
        ConversionGuide::new(
            "qmd-expansion",
            "exports/merged/qmd-expansion",
            "exports/qmd-expansion.Modelfile",
        )
    }

    #[test]
    fn test_commands_use_model_path_and_name() {
        let guide = guide();
        assert_eq!(
            guide.huggingface_upload_command(),
            "huggingface-cli upload qmd-expansion exports/merged/qmd-expansion"
        );
        assert_eq!(
            guide.llama_cpp_convert_command(),
            "python llama.cpp/convert_hf_to_gguf.py exports/merged/qmd-expansion \
             --outfile qmd-expansion.gguf"
        );
        assert_eq!(
            guide.ollama_create_command(),
            "ollama create qmd-expansion -f exports/qmd-expansion.Modelfile"
        );
    }

    #[test]
    fn test_conversion_steps_layout() {
        let steps = guide().conversion_steps();
        let lines: Vec<&str> = steps.lines().collect();

        assert_eq!(lines[0], "Model at: exports/merged/qmd-expansion");
        assert!(lines.contains(&"   git clone https://github.com/ggerganov/llama.cpp"));
        assert!(lines.contains(&"   Then use HF's GGUF conversion in the model settings"));
        assert_eq!(*lines.last().unwrap(), "3. Create Ollama Modelfile:");
    }

    #[test]
    fn test_next_steps() {
        assert_eq!(
            guide().next_steps(),
            "After GGUF conversion, create Ollama model with:\n   \
             ollama create qmd-expansion -f exports/qmd-expansion.Modelfile"
        );
    }
}
