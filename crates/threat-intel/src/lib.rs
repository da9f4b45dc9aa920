//! Area-keyed threat intelligence
//!
//! The engine consumes threat data through the [`ThreatFeed`] seam. Provider
//! failures never propagate into scoring: [`lookup_or_none`] maps any error
//! to the zero-count sentinel. Note the documented limitation: "no threat
//! data" and "zero threats confirmed" both degrade to the same zero-weight
//! outcome.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

pub mod http;

pub use http::{HttpThreatFeed, ThreatFeedConfig};

#[derive(Error, Debug)]
pub enum ThreatError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("feed API error: {0}")]
    Api(String),
    #[error("response parse error: {0}")]
    Parse(String),
}

/// Threat intelligence for an area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatReport {
    /// Number of reported threats
    pub count: u32,
    /// Threat kinds, e.g. "Phishing Scam", "Ransomware Attack"
    pub kinds: Vec<String>,
}

impl ThreatReport {
    /// The "no threat data" sentinel
    pub fn none() -> Self {
        Self {
            count: 0,
            kinds: Vec::new(),
        }
    }

    pub fn has_threats(&self) -> bool {
        self.count > 0
    }
}

/// Pluggable threat intelligence source
#[async_trait]
pub trait ThreatFeed: Send + Sync {
    async fn lookup(&self, area_key: &str) -> Result<ThreatReport, ThreatError>;
}

/// Look up threats for an area, degrading provider errors to the zero sentinel
pub async fn lookup_or_none(feed: &dyn ThreatFeed, area_key: &str) -> ThreatReport {
    match feed.lookup(area_key).await {
        Ok(report) => report,
        Err(e) => {
            tracing::warn!("Threat lookup failed for {}: {}", area_key, e);
            ThreatReport::none()
        }
    }
}

/// Fixed in-memory feed, used when no feed URL is configured and in tests
#[derive(Debug, Clone, Default)]
pub struct StaticThreatFeed {
    reports: HashMap<String, ThreatReport>,
}

impl StaticThreatFeed {
    pub fn new(reports: HashMap<String, ThreatReport>) -> Self {
        Self { reports }
    }

    /// Empty feed: every area reports zero threats
    pub fn empty() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ThreatFeed for StaticThreatFeed {
    async fn lookup(&self, area_key: &str) -> Result<ThreatReport, ThreatError> {
        Ok(self
            .reports
            .get(area_key)
            .cloned()
            .unwrap_or_else(ThreatReport::none))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenFeed;

    #[async_trait]
    impl ThreatFeed for BrokenFeed {
        async fn lookup(&self, _area_key: &str) -> Result<ThreatReport, ThreatError> {
            Err(ThreatError::Api("upstream returned status: 503".to_string()))
        }
    }

    #[tokio::test]
    async fn test_static_feed_returns_configured_report() {
        let mut reports = HashMap::new();
        reports.insert(
            "New York".to_string(),
            ThreatReport {
                count: 2,
                kinds: vec!["Phishing Scam".to_string(), "Data Breach".to_string()],
            },
        );
        let feed = StaticThreatFeed::new(reports);

        let report = feed.lookup("New York").await.unwrap();
        assert_eq!(report.count, 2);
        assert!(report.has_threats());

        let quiet = feed.lookup("Chicago").await.unwrap();
        assert_eq!(quiet, ThreatReport::none());
    }

    #[tokio::test]
    async fn test_lookup_or_none_degrades_errors() {
        let report = lookup_or_none(&BrokenFeed, "New York").await;
        assert_eq!(report, ThreatReport::none());
        assert!(!report.has_threats());
    }
}
