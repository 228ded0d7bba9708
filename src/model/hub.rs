use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

use super::ModelKey;
use crate::config::ModelConfig;
use crate::error::{Result, TranslateError};

/// Present in every published model repository
pub const CONFIG_FILE: &str = "config.json";

/// libtorch weights rust-bert loads; only converted repositories carry it
pub const WEIGHTS_FILE: &str = "rust_model.ot";

/// Checks the model hub for a published model before anything is downloaded
pub struct HubClient {
    client: Client,
    endpoint: String,
    revision: String,
}

impl HubClient {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("opus-translate/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.hub_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.hub_endpoint.trim_end_matches('/').to_string(),
            revision: config.revision.clone(),
        })
    }

    /// Download URL of one artifact of the model repository
    pub fn artifact_url(&self, key: &ModelKey, file: &str) -> String {
        artifact_url(&self.endpoint, &self.revision, key, file)
    }

    /// Succeeds when the hub publishes this ordered pair with loadable weights.
    ///
    /// A missing repository is `ModelUnavailable`; a repository without
    /// libtorch weights is a `Load` error since the model itself exists.
    pub async fn check(&self, key: &ModelKey) -> Result<()> {
        let status = self.head(key, CONFIG_FILE).await?;
        classify_repository(status, key)?;

        let status = self.head(key, WEIGHTS_FILE).await?;
        classify_weights(status, key)?;

        info!("Model '{}' is available", key);
        Ok(())
    }

    async fn head(&self, key: &ModelKey, file: &str) -> Result<StatusCode> {
        let url = self.artifact_url(key, file);
        debug!("Checking model hub: {}", url);

        let response = self
            .client
            .head(&url)
            .send()
            .await
            .map_err(|e| TranslateError::Load(format!("Failed to reach model hub: {}", e)))?;

        Ok(response.status())
    }
}

pub(crate) fn artifact_url(endpoint: &str, revision: &str, key: &ModelKey, file: &str) -> String {
    format!(
        "{}/{}/resolve/{}/{}",
        endpoint.trim_end_matches('/'),
        key.repo_id(),
        revision,
        file
    )
}

/// The hub answers 401 for repositories that do not exist and 404 for missing files
fn classify_repository(status: StatusCode, key: &ModelKey) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => {
            Err(TranslateError::ModelUnavailable(key.repo_id()))
        }
        s => Err(TranslateError::Load(format!(
            "Model hub returned {} for {}",
            s, key
        ))),
    }
}

fn classify_weights(status: StatusCode, key: &ModelKey) -> Result<()> {
    match status {
        s if s.is_success() => Ok(()),
        StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => Err(TranslateError::Load(format!(
            "{} is published but has no Rust (libtorch) weights; convert it with rust-bert's \
             conversion script and point model.local_dir at the result",
            key
        ))),
        s => Err(TranslateError::Load(format!(
            "Model hub returned {} for the weights of {}",
            s, key
        ))),
    }
}
