//! Coordinate math and safe-location proximity classification
//!
//! A point is considered inside the safe zone when its great-circle distance
//! to any whitelisted location is at most [`SAFE_RADIUS_KM`]. Classification
//! always scans the full set and reports the true minimum distance, so the
//! reported distance is deterministic regardless of set ordering.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

pub mod geocode;
pub mod loader;

pub use loader::SafeLocationSet;

/// Radius around a safe location that still counts as "at" it, in km
pub const SAFE_RADIUS_KM: f64 = 0.5;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("coordinate out of range: lat={latitude}, lon={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("malformed safe-location entry at index {index}")]
    MalformedEntry { index: usize },
}

pub type Result<T> = std::result::Result<T, GeoError>;

/// A validated geographic coordinate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Construct a coordinate, rejecting non-finite or out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !is_valid_latitude(latitude) || !is_valid_longitude(longitude) {
            return Err(GeoError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }
}

/// Validate latitude is finite and in valid range
pub fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && lat.is_finite()
}

/// Validate longitude is finite and in valid range
pub fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon) && lon.is_finite()
}

/// A whitelisted location (home, office) from the safe-location store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafeLocation {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
}

/// Outcome of classifying a point against the safe-location set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityReport {
    /// True when some safe location is within [`SAFE_RADIUS_KM`]
    pub within_safe_zone: bool,
    /// Distance to the nearest safe location in km; infinity for an empty set
    pub nearest_distance_km: f64,
    /// Id of the nearest safe location, if the set is non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nearest_id: Option<String>,
}

/// Haversine distance between two points in km
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    const R: f64 = 6371.0; // Earth radius in km

    let lat1_rad = a.latitude * PI / 180.0;
    let lat2_rad = b.latitude * PI / 180.0;
    let dlat = (b.latitude - a.latitude) * PI / 180.0;
    let dlon = (b.longitude - a.longitude) * PI / 180.0;

    let h = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    R * c
}

impl SafeLocationSet {
    /// Classify a point against the whitelist.
    ///
    /// Full scan: the returned distance is the global minimum over the set,
    /// compared against the threshold afterwards. An empty set yields
    /// `within_safe_zone = false` with an infinite distance sentinel.
    pub fn classify(&self, point: Coordinate) -> ProximityReport {
        let mut nearest_distance_km = f64::INFINITY;
        let mut nearest_id = None;

        for location in self.iter() {
            let d = haversine_km(point, location.coordinate);
            if d < nearest_distance_km {
                nearest_distance_km = d;
                nearest_id = Some(location.id.clone());
            }
        }

        ProximityReport {
            within_safe_zone: nearest_distance_km <= SAFE_RADIUS_KM,
            nearest_distance_km,
            nearest_id,
        }
    }
}
