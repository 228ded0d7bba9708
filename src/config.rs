use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{Result, TranslateError};

// Default values for model configuration
fn default_provider_prefix() -> String {
    "Helsinki-NLP/opus-mt".to_string()
}

fn default_hub_endpoint() -> String {
    "https://huggingface.co".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_check_availability() -> bool {
    true
}

fn default_hub_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model naming prefix; the key is `<prefix>-<source>-<target>`
    #[serde(default = "default_provider_prefix")]
    pub provider_prefix: String,
    /// Base URL of the model hub serving the pretrained artifacts
    #[serde(default = "default_hub_endpoint")]
    pub hub_endpoint: String,
    /// Hub revision (branch, tag or commit) to download from
    #[serde(default = "default_revision")]
    pub revision: String,
    /// Execution device for inference
    #[serde(default)]
    pub device: DeviceChoice,
    /// Ask the hub whether a model exists before trying to load it
    #[serde(default = "default_check_availability")]
    pub check_availability: bool,
    /// Timeout for the availability request, in seconds
    #[serde(default = "default_hub_timeout_secs")]
    pub hub_timeout_secs: u64,
    /// Directory of converted models, one `<model name>/` folder each
    /// (e.g. `opus-mt-en-es/rust_model.ot`); checked before the hub
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceChoice {
    /// CUDA when a GPU is visible to libtorch, CPU otherwise
    #[default]
    Auto,
    Cpu,
    Cuda,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of loaded models kept between requests.
    /// 0 reloads the model for every translation.
    #[serde(default)]
    pub capacity: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider_prefix: default_provider_prefix(),
            hub_endpoint: default_hub_endpoint(),
            revision: default_revision(),
            device: DeviceChoice::default(),
            check_availability: default_check_availability(),
            hub_timeout_secs: default_hub_timeout_secs(),
            local_dir: None,
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslateError::Config(format!("Failed to read config file: {}", e)))?;

        Ok(toml::from_str(&content)?)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml()?;

        std::fs::write(path, content)
            .map_err(|e| TranslateError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| TranslateError::Config(format!("Failed to serialize config: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_at_opus_mt() {
        let config = Config::default();
        assert_eq!(config.model.provider_prefix, "Helsinki-NLP/opus-mt");
        assert_eq!(config.model.hub_endpoint, "https://huggingface.co");
        assert_eq!(config.model.device, DeviceChoice::Auto);
        assert!(config.model.check_availability);
        assert_eq!(config.cache.capacity, 0);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str("[cache]\ncapacity = 4\n").unwrap();
        assert_eq!(config.cache.capacity, 4);
        assert_eq!(config.model.revision, "main");

        let config: Config = toml::from_str("[model]\ndevice = \"Cpu\"\n").unwrap();
        assert_eq!(config.model.device, DeviceChoice::Cpu);
        assert_eq!(config.model.hub_timeout_secs, 30);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.model.check_availability = false;
        config.cache.capacity = 2;
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert!(!loaded.model.check_availability);
        assert_eq!(loaded.cache.capacity, 2);
    }

    #[test]
    fn test_malformed_file_is_toml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[cache]\ncapacity = \"many\"\n").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, TranslateError::Toml(_)));
        assert!(err.to_string().starts_with("TOML parsing error:"));
    }

    #[test]
    fn test_local_dir_round_trips() {
        let config: Config = toml::from_str("[model]\nlocal_dir = \"/opt/models\"\n").unwrap();
        assert_eq!(config.model.local_dir, Some(PathBuf::from("/opt/models")));
        assert!(Config::default().model.local_dir.is_none());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, TranslateError::Config(_)));
    }
}
