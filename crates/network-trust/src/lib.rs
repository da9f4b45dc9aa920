//! Connection trust classification
//!
//! Maps a connection identifier (IP address or SSID) to a discrete trust
//! category. IP identifiers go through an external metadata provider and a
//! curated substring table of known ISPs and hosting organizations; SSID
//! identifiers are matched against a configured allow-list. Anything the
//! tables do not recognize classifies as untrusted, and a failed provider
//! lookup classifies as [`NetworkCategory::Unknown`] — a distinct category
//! that downstream scoring penalizes the same way as untrusted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod client;

pub use client::{IpApiClient, IpMetadata, NetworkClassifier, NetworkMetadataProvider};

/// Known residential ISP substrings
const RESIDENTIAL_ISPS: &[&str] = &["comcast", "verizon", "cox", "spectrum", "at&t"];

/// Known public-hotspot provider substrings
const HOTSPOT_PROVIDERS: &[&str] = &["boingo", "gogo"];

/// Known cloud/hosting organization substrings
const HOSTING_ORGS: &[&str] = &["amazon", "google", "digitalocean"];

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("metadata API error: {0}")]
    Api(String),
    #[error("response parse error: {0}")]
    Parse(String),
}

/// Trust category of the current connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkCategory {
    /// Residential or private network
    Residential,
    /// Public network with no trust signal (also the no-match default)
    UntrustedPublic,
    /// Public network on the configured allow-list
    TrustedPublic,
    /// VPN, proxy, or cloud-hosted egress
    VpnProxy,
    /// Lookup failed; could not determine
    Unknown,
}

impl NetworkCategory {
    /// Human-readable name, used in risk factor descriptions
    pub fn label(&self) -> &'static str {
        match self {
            Self::Residential => "Residential/Private Network",
            Self::UntrustedPublic => "Untrusted/Unknown Public Network",
            Self::TrustedPublic => "Trusted Public Network",
            Self::VpnProxy => "VPN/Proxy Network",
            Self::Unknown => "Unknown Network",
        }
    }

    /// Categories that do not attract the network penalty during scoring
    pub fn is_trusted(&self) -> bool {
        matches!(self, Self::Residential | Self::TrustedPublic | Self::VpnProxy)
    }
}

/// Classify provider metadata into a trust category.
///
/// Case-insensitive substring match against the curated tables; no match
/// defaults to untrusted rather than trusted.
pub fn classify_metadata(metadata: &IpMetadata) -> NetworkCategory {
    let isp = metadata.isp.to_lowercase();
    let org = metadata.org.to_lowercase();

    if RESIDENTIAL_ISPS.iter().any(|term| isp.contains(term)) {
        return NetworkCategory::Residential;
    }
    if HOTSPOT_PROVIDERS.iter().any(|term| isp.contains(term)) {
        return NetworkCategory::UntrustedPublic;
    }
    if HOSTING_ORGS.iter().any(|term| org.contains(term)) {
        return NetworkCategory::VpnProxy;
    }

    NetworkCategory::UntrustedPublic
}

/// Configured list of trusted network names for SSID-mode identifiers
#[derive(Debug, Clone, Default)]
pub struct SsidAllowList {
    names: Vec<String>,
}

impl SsidAllowList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    /// Parse a comma-separated configuration value
    pub fn from_env_value(value: &str) -> Self {
        Self {
            names: value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.names.iter().any(|n| n == identifier)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
