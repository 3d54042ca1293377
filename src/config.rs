//! Configuration structures for lora-convert

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration. Every section falls back to its defaults when absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Input and output locations
    pub paths: PathsConfig,
    /// External merge tool invocation
    pub merge: MergeConfig,
    /// Generated Ollama Modelfile
    pub modelfile: ModelfileConfig,
}

/// Input and output locations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Base model directory
    pub model: PathBuf,
    /// LoRA adapter directory
    pub adapter: PathBuf,
    /// Name of the exported model, used for file and directory names
    pub output_name: String,
    /// Root directory for everything the tool generates
    pub export_root: PathBuf,
}

/// External merge tool invocation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MergeConfig {
    /// Python interpreter that has the merge module installed
    pub python: String,
    /// Module run with `python -m`
    pub module: String,
    /// Subcommand of the module that fuses an adapter
    pub subcommand: String,
    /// Extra arguments appended to the merge command
    pub extra_args: Vec<String>,
}

/// Generated Ollama Modelfile
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelfileConfig {
    /// Body of the TEMPLATE block, in Ollama's Go template syntax
    pub prompt_template: String,
    pub temperature: f32,
    pub top_p: f32,
    /// Stop sequences, one PARAMETER line each
    pub stop: Vec<String>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("models/Qwen_Qwen2.5-1.5B/mlx"),
            adapter: PathBuf::from("adapters/sft"),
            output_name: "qmd-expansion".to_string(),
            export_root: PathBuf::from("exports"),
        }
    }
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            python: "python3".to_string(),
            module: "mlx_lm".to_string(),
            subcommand: "fuse".to_string(),
            extra_args: Vec::new(),
        }
    }
}

impl Default for ModelfileConfig {
    fn default() -> Self {
        Self {
            prompt_template: "<|im_start|>user\n\
                              /no_think Expand this search query: {{.Prompt}}<|im_end|>\n\
                              <|im_start|>assistant\n"
                .to_string(),
            temperature: 0.3,
            top_p: 0.9,
            stop: vec!["<|im_end|>".to_string()],
        }
    }
}

impl Config {
    /// Load configuration from a file, picking the format from its extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::path(path, e))?;

        let config: Self = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::from_str(&content)?,
            ConfigFormat::Toml => toml::from_str(&content)?,
            ConfigFormat::Json => serde_json::from_str(&content)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Write configuration to a file, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::path(parent, e))?;
        }

        let content = match ConfigFormat::from_path(path) {
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
            ConfigFormat::Toml => toml::to_string(self)?,
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
        };

        fs::write(path, content).map_err(|e| Error::path(path, e))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        validate_output_name(&self.paths.output_name)?;

        if self.merge.python.trim().is_empty() {
            return Err(Error::config("Python interpreter must not be empty"));
        }

        if self.merge.module.trim().is_empty() || self.merge.subcommand.trim().is_empty() {
            return Err(Error::config("Merge module and subcommand must not be empty"));
        }

        if !(0.0..=2.0).contains(&self.modelfile.temperature) {
            return Err(Error::config("Temperature must be between 0.0 and 2.0"));
        }

        if !(self.modelfile.top_p > 0.0 && self.modelfile.top_p <= 1.0) {
            return Err(Error::config("Top-p must be between 0.0 and 1.0"));
        }

        if self.modelfile.stop.iter().all(|s| s.is_empty()) {
            return Err(Error::config("At least one stop sequence is required"));
        }

        Ok(())
    }
}

/// The output name becomes a file stem and a directory name under the export
/// root. Namespaced names such as `user/model` are allowed.
pub fn validate_output_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(Error::invalid_input("Output name cannot be empty"));
    }

    let path = Path::new(name);
    let backslash = cfg!(windows) && name.contains('\\');
    let dotted = name.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    let normal = path
        .components()
        .all(|component| matches!(component, Component::Normal(_)));

    if path.is_absolute() || backslash || dotted || !normal {
        return Err(Error::invalid_input(format!(
            "Output name '{}' must be a relative name without '.' or '..' components",
            name
        )));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigFormat {
    Yaml,
    Toml,
    Json,
}

impl ConfigFormat {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::Yaml,
            Some("toml") => Self::Toml,
            _ => Self::Json,
        }
    }
}

/// Default location of the user configuration file
pub fn default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("dev", "lorax", "lora-convert")
        .ok_or_else(|| Error::config("Failed to determine config directory"))?;

    Ok(proj_dirs.config_dir().join("config.yaml"))
}

/// Load the configuration from `path` or the default location.
/// A missing file yields the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let config_file = match path {
        Some(path) => path.to_path_buf(),
        None => default_config_path()?,
    };

    if !config_file.exists() {
        tracing::debug!("No config file at {}, using defaults", config_file.display());
        return Ok(Config::default());
    }

    tracing::debug!("Loading config from {}", config_file.display());
    Config::from_file(&config_file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.paths.model, PathBuf::from("models/Qwen_Qwen2.5-1.5B/mlx"));
        assert_eq!(config.paths.adapter, PathBuf::from("adapters/sft"));
        assert_eq!(config.paths.output_name, "qmd-expansion");
        assert_eq!(config.paths.export_root, PathBuf::from("exports"));
        assert_eq!(config.merge.module, "mlx_lm");
        assert_eq!(config.merge.subcommand, "fuse");
        assert!(config.validate().is_ok());
    }

    #[test_case("qmd-expansion", true ; "plain name")]
    #[test_case("my.model-v2", true ; "dots and dashes")]
    #[test_case("", false ; "empty")]
    #[test_case("   ", false ; "whitespace")]
    #[test_case("hub/model", true ; "namespaced")]
    #[test_case("/abs/model", false ; "absolute")]
    #[test_case("hub/../model", false ; "parent component")]
    #[test_case("hub/./model", false ; "current dir component")]
    #[test_case("hub/", false ; "trailing slash")]
    #[test_case("..", false ; "parent dir")]
    fn test_validate_output_name(name: &str, ok: bool) {
        assert_eq!(validate_output_name(name).is_ok(), ok);
    }

    #[test_case(0.0, 0.9, true ; "zero temperature")]
    #[test_case(2.5, 0.9, false ; "temperature too high")]
    #[test_case(0.3, 0.0, false ; "zero top p")]
    #[test_case(0.3, 1.0, true ; "top p one")]
    #[test_case(0.3, f32::NAN, false ; "nan top p")]
    #[test_case(f32::NAN, 0.9, false ; "nan temperature")]
    fn test_validate_sampling(temperature: f32, top_p: f32, ok: bool) {
        let mut config = Config::default();
        config.modelfile.temperature = temperature;
        config.modelfile.top_p = top_p;
        assert_eq!(config.validate().is_ok(), ok);
    }

    #[cfg(windows)]
    #[test]
    fn test_backslash_output_name_rejected_on_windows() {
        assert!(validate_output_name("hub\\model").is_err());
    }

    #[test]
    fn test_malformed_files_are_config_errors() {
        let dir = TempDir::new().unwrap();
        for (name, content) in [
            ("config.yaml", "paths: [unclosed"),
            ("config.json", "{\"paths\":"),
            ("config.toml", "[paths\n"),
        ] {
            let path = dir.path().join(name);
            fs::write(&path, content).unwrap();
            assert!(
                matches!(Config::from_file(&path), Err(Error::Config(_))),
                "format of {}",
                name
            );
        }
    }

    #[test]
    fn test_validate_rejects_empty_stop_list() {
        let mut config = Config::default();
        config.modelfile.stop.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "paths:\n  output_name: custom\nmerge:\n  python: /opt/venv/bin/python\n")
            .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.paths.output_name, "custom");
        assert_eq!(config.paths.adapter, PathBuf::from("adapters/sft"));
        assert_eq!(config.merge.python, "/opt/venv/bin/python");
        assert_eq!(config.modelfile, ModelfileConfig::default());
    }

    #[test]
    fn test_toml_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[modelfile]\ntemperature = 0.7\nstop = [\"</s>\"]\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.modelfile.temperature, 0.7);
        assert_eq!(config.modelfile.stop, vec!["</s>".to_string()]);
    }

    #[test]
    fn test_invalid_config_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"paths": {"output_name": "../escape"}}"#).unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_save_and_reload_each_format() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.paths.output_name = "saved".to_string();

        for name in ["nested/config.yaml", "config.toml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config, "format of {}", name);
        }
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config(Some(&dir.path().join("absent.yaml"))).unwrap();
        assert_eq!(config, Config::default());
    }
}
