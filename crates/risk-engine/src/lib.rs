//! Weighted security risk scoring engine
//!
//! Combines the location, network, and optional threat signals into an
//! additive score, a zone classification, and an itemized factor list.
//!
//! # Scoring Model
//!
//! ```text
//! score = 2·[not within safe zone] + 4·[network untrusted or unknown] + 5·[threats > 0]
//! ```
//!
//! | Factor   | Weight | Penalized when |
//! |----------|--------|----------------|
//! | Location | 2      | no safe location within 0.5 km |
//! | Network  | 4      | category is untrusted or unknown |
//! | Threat   | 5      | reported threat count > 0 |
//!
//! Zone banding is a fixed design constant: 0 is Green, 1-5 is Yellow, 6 and
//! above is Red. The engine is pure and stateless; identical signals always
//! produce an identical assessment, and no error is possible for well-typed
//! input.

use network_trust::NetworkCategory;
use serde::{Deserialize, Serialize};
use threat_intel::ThreatReport;
use tracing::debug;

pub mod advice;

pub use advice::{base_recommendations, zone_message};

/// Version of the canonical weight table below
pub const WEIGHTS_VERSION: u32 = 1;

/// Points added when the point is outside every safe zone
pub const LOCATION_WEIGHT: u32 = 2;
/// Points added for an untrusted or unknown network
pub const NETWORK_WEIGHT: u32 = 4;
/// Points added when threats are reported in the area
pub const THREAT_WEIGHT: u32 = 5;

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub location_weight: u32,
    pub network_weight: u32,
    pub threat_weight: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            location_weight: LOCATION_WEIGHT,
            network_weight: NETWORK_WEIGHT,
            threat_weight: THREAT_WEIGHT,
        }
    }
}

/// Whether a factor raised or lowered concern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    Good,
    Bad,
}

/// One evaluated signal's contribution to the assessment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub polarity: Polarity,
    pub description: String,
    /// Suggested actions; empty for Good factors
    pub actions: Vec<String>,
}

impl RiskFactor {
    fn good(description: impl Into<String>) -> Self {
        Self {
            polarity: Polarity::Good,
            description: description.into(),
            actions: Vec::new(),
        }
    }

    fn bad(description: impl Into<String>, actions: Vec<String>) -> Self {
        Self {
            polarity: Polarity::Bad,
            description: description.into(),
            actions,
        }
    }
}

/// Discrete risk tier derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    Green,
    Yellow,
    Red,
}

impl Zone {
    /// Classify a score into its zone. 0 is Green, 1-5 Yellow, 6+ Red.
    pub fn from_score(score: u32) -> Self {
        match score {
            0 => Zone::Green,
            1..=5 => Zone::Yellow,
            _ => Zone::Red,
        }
    }
}

/// Validated inputs to the engine, produced by the classifiers
#[derive(Debug, Clone, PartialEq)]
pub struct RiskSignals {
    /// Some safe location is within the safe radius
    pub within_safe_zone: bool,
    /// Distance to the nearest safe location in km; infinite when the
    /// whitelist is empty
    pub nearest_safe_km: f64,
    /// Trust category of the current connection
    pub network: NetworkCategory,
    /// Threat intelligence for the area; `None` when no area key could be
    /// resolved, which skips the threat factor entirely
    pub threats: Option<ThreatReport>,
}

/// Immutable assessment result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub score: u32,
    pub zone: Zone,
    /// One factor per evaluated signal, in evaluation order
    pub factors: Vec<RiskFactor>,
    /// Non-empty suggested actions, in the order their factor was evaluated
    pub actions: Vec<String>,
}

/// Render the nearest-safe distance for factor descriptions.
///
/// The infinite sentinel for an empty whitelist must never reach the float
/// formatter.
fn describe_distance(km: f64) -> String {
    if km.is_finite() {
        format!("{:.1}km from the closest safe location", km)
    } else {
        "no safe locations configured".to_string()
    }
}

/// Score the combined signals into a risk assessment.
///
/// Evaluation order is fixed: location, network, then threat (only when a
/// threat report is present). Deterministic and side-effect free apart from
/// a debug log of the factor breakdown.
pub fn assess(signals: &RiskSignals, config: &EngineConfig) -> RiskAssessment {
    let mut score = 0u32;
    let mut factors = Vec::with_capacity(3);

    // Factor 1: location proximity
    if signals.within_safe_zone {
        factors.push(RiskFactor::good(format!(
            "Location: {}",
            describe_distance(signals.nearest_safe_km)
        )));
    } else {
        score += config.location_weight;
        factors.push(RiskFactor::bad(
            format!("Location: {}", describe_distance(signals.nearest_safe_km)),
            vec!["Enable your VPN".to_string()],
        ));
    }

    // Factor 2: network trust
    if signals.network.is_trusted() {
        factors.push(RiskFactor::good(format!(
            "Network: connected via {}",
            signals.network.label()
        )));
    } else {
        score += config.network_weight;
        factors.push(RiskFactor::bad(
            format!("Unsafe network: you are on {}", signals.network.label()),
            vec![
                "Enable 2-Factor Authentication on critical accounts".to_string(),
                "Consider relocating to a more secure location".to_string(),
            ],
        ));
    }

    // Factor 3: area threat intelligence, when available
    if let Some(report) = &signals.threats {
        if report.has_threats() {
            score += config.threat_weight;
            let kinds = if report.kinds.is_empty() {
                "Unknown threat".to_string()
            } else {
                report.kinds.join(", ")
            };
            factors.push(RiskFactor::bad(
                format!("Active threats: {} reported in area ({})", report.count, kinds),
                vec!["Avoid accessing sensitive information".to_string()],
            ));
        } else {
            factors.push(RiskFactor::good("No active threats reported in area"));
        }
    }

    let zone = Zone::from_score(score);
    let actions: Vec<String> = factors
        .iter()
        .flat_map(|f| f.actions.iter().cloned())
        .collect();

    debug!(
        "Assessed score={} zone={:?} factors={}",
        score,
        zone,
        factors.len()
    );

    RiskAssessment {
        score,
        zone,
        factors,
        actions,
    }
}
