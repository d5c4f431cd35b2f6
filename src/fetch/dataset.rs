//! CommunityDragon static dataset client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::info;
use url::Url;

use super::{classify_status, FetchError, ReferenceSource};
use crate::config::ReferenceConfig;
use crate::reference::NativeTraitIndex;

/// Downloads the TFT dataset and indexes native traits per unit.
pub struct CommunityDragonClient {
    client: Client,
    url: Url,
}

impl CommunityDragonClient {
    pub fn new(config: &ReferenceConfig) -> Result<Self, FetchError> {
        let url = Url::parse(&config.dataset_url)
            .map_err(|_| FetchError::InvalidUrl(config.dataset_url.clone()))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { client, url })
    }
}

#[async_trait]
impl ReferenceSource for CommunityDragonClient {
    async fn load(&self) -> Result<NativeTraitIndex, FetchError> {
        let response = self.client.get(self.url.clone()).send().await?;
        if let Some(err) = classify_status(response.status(), self.url.as_str(), Duration::ZERO) {
            return Err(err);
        }

        let dataset: Value = response.json().await?;
        let index = NativeTraitIndex::from_dataset(&dataset);
        info!("Loaded native traits for {} units", index.len());
        Ok(index)
    }
}
