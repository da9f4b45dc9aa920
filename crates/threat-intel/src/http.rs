//! HTTP threat feed client
//!
//! Expects a JSON body of the form `{"threats": [{"threat_type": "...",
//! "severity": "..."}]}` from `{base_url}/threats/{area_key}`.

use crate::{ThreatError, ThreatFeed, ThreatReport};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

/// Feed client configuration
#[derive(Debug, Clone)]
pub struct ThreatFeedConfig {
    /// Base URL of the threat feed
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_sec: u64,
}

impl ThreatFeedConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_sec: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    threats: Vec<FeedThreat>,
}

#[derive(Debug, Deserialize)]
struct FeedThreat {
    threat_type: String,
    #[serde(default)]
    #[allow(dead_code)] // Severity is not weighted in v1 scoring
    severity: Option<String>,
}

/// reqwest-backed threat feed
pub struct HttpThreatFeed {
    config: ThreatFeedConfig,
    client: reqwest::Client,
}

impl HttpThreatFeed {
    pub fn new(config: ThreatFeedConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_sec))
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

#[async_trait]
impl ThreatFeed for HttpThreatFeed {
    async fn lookup(&self, area_key: &str) -> Result<ThreatReport, ThreatError> {
        let url = format!("{}/threats/{}", self.config.base_url, area_key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ThreatError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ThreatError::Api(format!(
                "threat feed returned status: {}",
                response.status()
            )));
        }

        let data: FeedResponse = response
            .json()
            .await
            .map_err(|e| ThreatError::Parse(e.to_string()))?;

        Ok(ThreatReport {
            count: data.threats.len() as u32,
            kinds: data.threats.into_iter().map(|t| t.threat_type).collect(),
        })
    }
}
