use async_trait::async_trait;
use indicatif::{ProgressBar, ProgressStyle};
use rust_bert::marian::MarianGenerator;
use rust_bert::pipelines::common::{ModelResource, ModelType};
use rust_bert::pipelines::generation_utils::{GenerateConfig, LanguageGenerator};
use rust_bert::resources::{LocalResource, RemoteResource, ResourceProvider};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tch::Device;
use tracing::{debug, info, warn};

use super::hub::{artifact_url, HubClient, CONFIG_FILE, WEIGHTS_FILE};
use super::{ModelKey, ModelRegistry, Seq2SeqModel};
use crate::config::{DeviceChoice, ModelConfig};
use crate::error::{Result, TranslateError};

/// Loads OPUS-MT Marian models published on the model hub
pub struct MarianRegistry {
    config: ModelConfig,
    hub: HubClient,
}

impl MarianRegistry {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let hub = HubClient::new(&config)?;
        Ok(Self { config, hub })
    }

    fn device(&self) -> Device {
        match self.config.device {
            DeviceChoice::Auto => Device::cuda_if_available(),
            DeviceChoice::Cpu => Device::Cpu,
            DeviceChoice::Cuda => Device::Cuda(0),
        }
    }

    /// Folder under `local_dir` holding converted weights for `key`, if any
    fn local_model_dir(&self, key: &ModelKey) -> Option<PathBuf> {
        let dir = self.config.local_dir.as_ref()?.join(key.short_name());
        dir.join(WEIGHTS_FILE).is_file().then_some(dir)
    }

    async fn ensure_available(&self, key: &ModelKey) -> Result<()> {
        if self.config.check_availability {
            self.hub.check(key).await
        } else {
            debug!("Skipping hub availability check for {}", key);
            Ok(())
        }
    }

    fn generate_config(&self, key: &ModelKey, local_dir: Option<&Path>) -> GenerateConfig {
        let resource = |file: &str, kind: &str| -> Box<dyn ResourceProvider + Send> {
            match local_dir {
                Some(dir) => Box::new(LocalResource {
                    local_path: dir.join(file),
                }),
                None => Box::new(RemoteResource::new(
                    &artifact_url(&self.config.hub_endpoint, &self.config.revision, key, file),
                    &format!("{}/{}", key.short_name(), kind),
                )),
            }
        };

        // Decoding settings are left at the library defaults.
        GenerateConfig {
            model_type: ModelType::Marian,
            model_resource: ModelResource::Torch(resource(WEIGHTS_FILE, "model")),
            config_resource: resource(CONFIG_FILE, "config"),
            vocab_resource: resource("vocab.json", "vocab"),
            merges_resource: Some(resource("source.spm", "spiece")),
            device: self.device(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ModelRegistry for MarianRegistry {
    async fn load(&self, key: &ModelKey) -> Result<Arc<dyn Seq2SeqModel>> {
        let local_dir = self.local_model_dir(key);
        match &local_dir {
            Some(dir) => info!("Using converted weights for {} from {}", key, dir.display()),
            None => self.ensure_available(key).await?,
        }

        let generate_config = self.generate_config(key, local_dir.as_deref());

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .map_err(|e| TranslateError::Load(format!("Invalid progress template: {}", e)))?);
        pb.set_message(format!("Loading {}", key));
        pb.enable_steady_tick(Duration::from_millis(120));

        info!("Loading model {} on {:?}", key, generate_config.device);
        let joined = tokio::task::spawn_blocking(move || MarianGenerator::new(generate_config)).await;
        pb.finish_and_clear();

        let generator = joined
            .map_err(|e| TranslateError::Load(format!("Model loader thread failed: {}", e)))?
            .map_err(|e| {
                warn!("Loading {} failed: {}", key, e);
                TranslateError::Load(e.to_string())
            })?;

        info!("Model {} loaded", key);
        Ok(Arc::new(MarianModel {
            generator: Mutex::new(generator),
        }))
    }
}

/// A Marian generator bundled with its SentencePiece tokenizer
pub struct MarianModel {
    generator: Mutex<MarianGenerator>,
}

impl Seq2SeqModel for MarianModel {
    fn generate(&self, text: &str) -> Result<String> {
        let generator = self
            .generator
            .lock()
            .map_err(|_| TranslateError::Inference("Model state is poisoned".to_string()))?;

        let input = [text];
        let outputs = generator
            .generate(Some(&input[..]), None)
            .map_err(|e| TranslateError::Inference(e.to_string()))?;

        outputs
            .into_iter()
            .next()
            .map(|output| output.text)
            .ok_or_else(|| TranslateError::Inference("Model produced no output sequence".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::hub::test_server::serve;

    fn cpu_config() -> ModelConfig {
        ModelConfig {
            device: DeviceChoice::Cpu,
            hub_timeout_secs: 5,
            ..ModelConfig::default()
        }
    }

    fn key(source: &str, target: &str) -> ModelKey {
        ModelKey::new("Helsinki-NLP/opus-mt", source, target).unwrap()
    }

    #[test]
    fn test_device_choice_mapping() {
        let registry = MarianRegistry::new(cpu_config()).unwrap();
        assert_eq!(registry.device(), Device::Cpu);

        let config = ModelConfig {
            device: DeviceChoice::Cuda,
            ..ModelConfig::default()
        };
        let registry = MarianRegistry::new(config).unwrap();
        assert_eq!(registry.device(), Device::Cuda(0));
    }

    #[test]
    fn test_generate_config_targets_marian() {
        let registry = MarianRegistry::new(cpu_config()).unwrap();
        let generate_config = registry.generate_config(&key("en", "fr"), None);
        assert!(matches!(generate_config.model_type, ModelType::Marian));
        assert!(generate_config.merges_resource.is_some());
        assert_eq!(generate_config.device, Device::Cpu);
    }

    #[test]
    fn test_converted_weights_are_read_from_local_dir() {
        let models = tempfile::tempdir().unwrap();
        let model_dir = models.path().join("opus-mt-en-es");
        std::fs::create_dir_all(&model_dir).unwrap();
        std::fs::write(model_dir.join(WEIGHTS_FILE), b"weights").unwrap();

        let config = ModelConfig {
            local_dir: Some(models.path().to_path_buf()),
            ..cpu_config()
        };
        let registry = MarianRegistry::new(config).unwrap();

        assert_eq!(registry.local_model_dir(&key("en", "es")), Some(model_dir.clone()));
        assert_eq!(registry.local_model_dir(&key("en", "fr")), None);

        let generate_config = registry.generate_config(&key("en", "es"), Some(&model_dir));
        assert_eq!(
            generate_config.config_resource.get_local_path().unwrap(),
            model_dir.join(CONFIG_FILE)
        );
    }

    #[tokio::test]
    async fn test_disabled_check_skips_the_hub() {
        let config = ModelConfig {
            hub_endpoint: "http://127.0.0.1:9".to_string(),
            check_availability: false,
            ..cpu_config()
        };
        let registry = MarianRegistry::new(config).unwrap();
        registry.ensure_available(&key("en", "fr")).await.unwrap();
    }

    #[tokio::test]
    async fn test_enabled_check_reports_unreachable_hub() {
        let config = ModelConfig {
            hub_endpoint: "http://127.0.0.1:9".to_string(),
            ..cpu_config()
        };
        let registry = MarianRegistry::new(config).unwrap();
        let err = registry.ensure_available(&key("en", "fr")).await.unwrap_err();
        assert!(matches!(err, TranslateError::Load(_)));
    }

    #[tokio::test]
    async fn test_unpublished_pair_stops_before_download() {
        let (endpoint, requests) = serve(vec![(CONFIG_FILE, 404)]).await;
        let config = ModelConfig {
            hub_endpoint: endpoint,
            ..cpu_config()
        };
        let registry = MarianRegistry::new(config).unwrap();

        let err = match registry.load(&key("hi", "nl")).await {
            Err(e) => e,
            Ok(_) => panic!("expected the load to fail"),
        };
        assert!(matches!(err, TranslateError::ModelUnavailable(k) if k == "Helsinki-NLP/opus-mt-hi-nl"));

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].starts_with("HEAD "));
    }
}
