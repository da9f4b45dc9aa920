//! Network metadata lookup client
//!
//! Queries ip-api.com for ISP/organization strings keyed by IP, with a
//! bounded request timeout and a short-lived in-process cache. Lookup
//! failures degrade to [`NetworkCategory::Unknown`] rather than failing the
//! assessment.

use crate::{classify_metadata, NetworkCategory, NetworkError, SsidAllowList};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::warn;

/// ISP/organization strings returned by the metadata provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpMetadata {
    #[serde(default)]
    pub isp: String,
    #[serde(default)]
    pub org: String,
}

/// Seam for the external metadata lookup, fakeable in tests
#[async_trait]
pub trait NetworkMetadataProvider: Send + Sync {
    async fn fetch(&self, identifier: &str) -> Result<IpMetadata, NetworkError>;
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct IpApiConfig {
    /// Base URL of the metadata API
    pub base_url: String,
    /// Cache TTL in seconds
    pub cache_ttl_sec: u64,
    /// Request timeout in seconds
    pub timeout_sec: u64,
}

impl Default for IpApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://ip-api.com".to_string(),
            cache_ttl_sec: 300,
            timeout_sec: 5,
        }
    }
}

/// Cache entry with expiry
struct CacheEntry {
    metadata: IpMetadata,
    expires_at: Instant,
}

/// reqwest-backed ip-api.com client
pub struct IpApiClient {
    config: IpApiConfig,
    client: reqwest::Client,
    cache: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

impl IpApiClient {
    pub fn new(config: IpApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config,
            client,
            cache: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Cache statistics: (total entries, unexpired entries)
    pub async fn cache_stats(&self) -> (usize, usize) {
        let cache = self.cache.read().await;
        let total = cache.len();
        let valid = cache
            .values()
            .filter(|e| e.expires_at > Instant::now())
            .count();
        (total, valid)
    }
}

impl Default for IpApiClient {
    fn default() -> Self {
        Self::new(IpApiConfig::default())
    }
}

#[async_trait]
impl NetworkMetadataProvider for IpApiClient {
    async fn fetch(&self, identifier: &str) -> Result<IpMetadata, NetworkError> {
        {
            let cache = self.cache.read().await;
            if let Some(entry) = cache.get(identifier) {
                if entry.expires_at > Instant::now() {
                    return Ok(entry.metadata.clone());
                }
            }
        }

        let url = format!("{}/json/{}?fields=isp,org", self.config.base_url, identifier);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| NetworkError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NetworkError::Api(format!(
                "metadata API returned status: {}",
                response.status()
            )));
        }

        let metadata: IpMetadata = response
            .json()
            .await
            .map_err(|e| NetworkError::Parse(e.to_string()))?;

        {
            let mut cache = self.cache.write().await;
            cache.insert(
                identifier.to_string(),
                CacheEntry {
                    metadata: metadata.clone(),
                    expires_at: Instant::now() + Duration::from_secs(self.config.cache_ttl_sec),
                },
            );
        }

        Ok(metadata)
    }
}

/// Classifier combining the loopback rule, SSID allow-list, and provider lookup
pub struct NetworkClassifier {
    provider: Arc<dyn NetworkMetadataProvider>,
    ssids: SsidAllowList,
}

impl NetworkClassifier {
    pub fn new(provider: Arc<dyn NetworkMetadataProvider>, ssids: SsidAllowList) -> Self {
        Self { provider, ssids }
    }

    /// Classify a connection identifier into a trust category.
    ///
    /// Loopback is trusted local with no provider call. Allow-listed SSIDs
    /// are trusted public. Everything else goes through the provider; a
    /// failed lookup yields `Unknown`, never an error.
    pub async fn classify_identifier(&self, identifier: &str) -> NetworkCategory {
        if identifier == "127.0.0.1" {
            return NetworkCategory::Residential;
        }

        if self.ssids.contains(identifier) {
            return NetworkCategory::TrustedPublic;
        }

        match self.provider.fetch(identifier).await {
            Ok(metadata) => classify_metadata(&metadata),
            Err(e) => {
                warn!("Could not get network metadata for {}: {}", identifier, e);
                NetworkCategory::Unknown
            }
        }
    }
}
