use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{ModelHandle, ModelKey, ModelRegistry};
use crate::error::Result;

/// Turns an ordered language pair into a loaded model handle.
///
/// With a zero capacity every call goes to the registry, so each translation
/// pays the full load cost. A positive capacity keeps that many handles in a
/// least-recently-used cache.
pub struct ModelResolver {
    prefix: String,
    registry: Box<dyn ModelRegistry>,
    cache: Option<Mutex<LruCache<ModelKey, ModelHandle>>>,
}

impl ModelResolver {
    pub fn new(prefix: impl Into<String>, registry: Box<dyn ModelRegistry>, capacity: usize) -> Self {
        let cache = NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap)));
        Self {
            prefix: prefix.into(),
            registry,
            cache,
        }
    }

    /// Model key for a pair of language codes
    pub fn key_for(&self, source_code: &str, target_code: &str) -> Result<ModelKey> {
        ModelKey::new(&self.prefix, source_code, target_code)
    }

    pub async fn resolve(&self, source_code: &str, target_code: &str) -> Result<ModelHandle> {
        let key = self.key_for(source_code, target_code)?;

        if let Some(cache) = &self.cache {
            if let Some(handle) = cache.lock().await.get(&key) {
                debug!("Model cache hit: {}", key);
                return Ok(handle.clone());
            }
        } else {
            debug!("Model cache disabled, loading {} from the registry", key);
        }

        let model = self.registry.load(&key).await?;
        let handle = ModelHandle { key, model };

        if let Some(cache) = &self.cache {
            let mut cache = cache.lock().await;
            if let Some((evicted, _)) = cache.push(handle.key.clone(), handle.clone()) {
                if evicted != handle.key {
                    info!("Evicted model {} from cache", evicted);
                }
            }
        }

        Ok(handle)
    }

    /// Keys currently held in the cache, most recently used first
    pub async fn cached_keys(&self) -> Vec<ModelKey> {
        match &self.cache {
            Some(cache) => cache.lock().await.iter().map(|(k, _)| k.clone()).collect(),
            None => Vec::new(),
        }
    }
}
