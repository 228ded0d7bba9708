// Pretrained model access
//
// This module resolves a language pair to a loaded sequence-to-sequence model:
// - Key: composite (prefix, source, target) identifying a directional model
// - Hub: availability check against the model hub before any download
// - Marian: rust-bert backed registry that downloads and loads OPUS-MT models
// - Resolver: key construction, registry lookup and the optional handle cache
//
// To plug in another backend, implement ModelRegistry and Seq2SeqModel and
// add it to RegistryFactory.

pub mod hub;
pub mod marian;
pub mod resolver;

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

pub use hub::HubClient;
pub use marian::MarianRegistry;
pub use resolver::ModelResolver;

use crate::config::ModelConfig;
use crate::error::{Result, TranslateError};

/// Identifier of one directional pretrained model, e.g. `Helsinki-NLP/opus-mt-en-fr`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelKey {
    prefix: String,
    source: String,
    target: String,
}

impl ModelKey {
    pub fn new(prefix: &str, source: &str, target: &str) -> Result<Self> {
        let prefix = prefix.trim().trim_end_matches('-');
        if prefix.is_empty() {
            return Err(TranslateError::Config("Model provider prefix is empty".to_string()));
        }
        for code in [source, target] {
            if !is_valid_code(code) {
                return Err(TranslateError::UnknownLanguage(code.to_string()));
            }
        }
        if source == target {
            return Err(TranslateError::SameLanguagePair);
        }

        Ok(Self {
            prefix: prefix.to_string(),
            source: source.to_string(),
            target: target.to_string(),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Full hub repository id
    pub fn repo_id(&self) -> String {
        format!("{}-{}-{}", self.prefix, self.source, self.target)
    }

    /// Last path segment of the repository id, used for local cache folders
    pub fn short_name(&self) -> String {
        let repo_id = self.repo_id();
        match repo_id.rsplit_once('/') {
            Some((_, name)) => name.to_string(),
            None => repo_id,
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.repo_id())
    }
}

fn is_valid_code(code: &str) -> bool {
    (2..=3).contains(&code.len()) && code.bytes().all(|b| b.is_ascii_lowercase())
}

/// A loaded model together with its tokenizer
#[cfg_attr(test, mockall::automock)]
pub trait Seq2SeqModel: Send + Sync {
    /// Encode one input, generate with the library's default decoding settings
    /// and decode the first sequence with special tokens skipped.
    fn generate(&self, text: &str) -> Result<String>;
}

/// Source of loaded models
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelRegistry: Send + Sync {
    /// Load the model published under `key`
    async fn load(&self, key: &ModelKey) -> Result<Arc<dyn Seq2SeqModel>>;
}

/// A model ready for translation, owned by the request (or cache) that resolved it
#[derive(Clone)]
pub struct ModelHandle {
    pub key: ModelKey,
    pub model: Arc<dyn Seq2SeqModel>,
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelHandle").field("key", &self.key).finish_non_exhaustive()
    }
}

/// Registry implementation type
#[derive(Debug, Clone)]
pub enum RegistryImplementation {
    Marian,
}

/// Factory for creating registry instances
pub struct RegistryFactory;

impl RegistryFactory {
    /// Create a registry based on implementation type
    pub fn create_registry(
        implementation: RegistryImplementation,
        config: ModelConfig,
    ) -> Result<Box<dyn ModelRegistry>> {
        match implementation {
            RegistryImplementation::Marian => Ok(Box::new(MarianRegistry::new(config)?)),
        }
    }

    /// Create with default implementation
    pub fn create_default(config: ModelConfig) -> Result<Box<dyn ModelRegistry>> {
        Self::create_registry(RegistryImplementation::Marian, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_for_english_french() {
        let key = ModelKey::new("Helsinki-NLP/opus-mt", "en", "fr").unwrap();
        assert_eq!(key.repo_id(), "Helsinki-NLP/opus-mt-en-fr");
        assert_eq!(key.to_string(), "Helsinki-NLP/opus-mt-en-fr");
        assert_eq!(key.short_name(), "opus-mt-en-fr");
    }

    #[test]
    fn test_key_is_directional() {
        let forward = ModelKey::new("Helsinki-NLP/opus-mt", "en", "de").unwrap();
        let reverse = ModelKey::new("Helsinki-NLP/opus-mt", "de", "en").unwrap();
        assert_ne!(forward, reverse);
        assert_eq!(reverse.repo_id(), "Helsinki-NLP/opus-mt-de-en");
    }

    #[test]
    fn test_trailing_dash_in_prefix_is_not_doubled() {
        let key = ModelKey::new("Helsinki-NLP/opus-mt-", "es", "it").unwrap();
        assert_eq!(key.repo_id(), "Helsinki-NLP/opus-mt-es-it");
    }

    #[test]
    fn test_rejects_malformed_codes() {
        for bad in ["", "e", "EN", "en/fr", "engl", "e1"] {
            assert!(
                matches!(
                    ModelKey::new("Helsinki-NLP/opus-mt", bad, "fr"),
                    Err(TranslateError::UnknownLanguage(_))
                ),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_rejects_identical_codes() {
        assert!(matches!(
            ModelKey::new("Helsinki-NLP/opus-mt", "fr", "fr"),
            Err(TranslateError::SameLanguagePair)
        ));
    }

    #[test]
    fn test_rejects_empty_prefix() {
        for prefix in ["", "  ", "-", " -- "] {
            assert!(
                matches!(ModelKey::new(prefix, "en", "fr"), Err(TranslateError::Config(_))),
                "accepted prefix {:?}",
                prefix
            );
        }
    }

    #[test]
    fn test_prefix_whitespace_is_trimmed() {
        let key = ModelKey::new(" Helsinki-NLP/opus-mt- ", "en", "fr").unwrap();
        assert_eq!(key.repo_id(), "Helsinki-NLP/opus-mt-en-fr");
    }
}
