//! Safe-location whitelist loading from JSON
//!
//! The store is read-only during scoring; it is loaded once at startup and
//! malformed entries fail the load rather than being skipped per request.

use crate::{is_valid_latitude, is_valid_longitude, GeoError, Result, SafeLocation};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Raw whitelist entry from JSON
#[derive(Debug, Deserialize)]
struct RawSafeLocation {
    id: Option<String>,
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

/// Read-only set of whitelisted locations
#[derive(Debug, Clone, Default)]
pub struct SafeLocationSet {
    locations: Vec<SafeLocation>,
}

impl SafeLocationSet {
    /// Build a set from already-validated locations
    pub fn from_locations(locations: Vec<SafeLocation>) -> Self {
        Self { locations }
    }

    /// Load the whitelist from a JSON file, failing fast on malformed entries
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading safe locations from {:?}", path);

        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let raw: Vec<RawSafeLocation> = serde_json::from_reader(reader)?;

        let mut locations = Vec::with_capacity(raw.len());
        for (i, entry) in raw.into_iter().enumerate() {
            let lat = entry
                .latitude
                .filter(|l| is_valid_latitude(*l))
                .ok_or(GeoError::MalformedEntry { index: i })?;
            let lon = entry
                .longitude
                .filter(|l| is_valid_longitude(*l))
                .ok_or(GeoError::MalformedEntry { index: i })?;

            locations.push(SafeLocation {
                id: entry.id.unwrap_or_else(|| format!("safe-{}", i)),
                name: entry.name.unwrap_or_else(|| "Unnamed".to_string()),
                coordinate: crate::Coordinate {
                    latitude: lat,
                    longitude: lon,
                },
            });
        }

        info!("Loaded {} safe locations", locations.len());
        Ok(Self { locations })
    }

    pub fn iter(&self) -> impl Iterator<Item = &SafeLocation> {
        self.locations.iter()
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_well_formed_file() {
        let json = r#"[
            {"id": "home", "name": "Home", "latitude": 40.7128, "longitude": -74.0060},
            {"latitude": 41.8781, "longitude": -87.6298}
        ]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let set = SafeLocationSet::load(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().next().unwrap().id, "home");
        // Missing id/name get defaults
        assert_eq!(set.iter().nth(1).unwrap().id, "safe-1");
    }

    #[test]
    fn test_load_rejects_missing_coordinates() {
        let json = r#"[
            {"id": "home", "latitude": 40.7128, "longitude": -74.0060},
            {"id": "broken", "name": "No Coords"}
        ]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let err = SafeLocationSet::load(file.path()).unwrap_err();
        assert!(matches!(err, GeoError::MalformedEntry { index: 1 }));
    }

    #[test]
    fn test_load_rejects_out_of_range_coordinates() {
        let json = r#"[{"id": "bad", "latitude": 140.0, "longitude": -74.0}]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let err = SafeLocationSet::load(file.path()).unwrap_err();
        assert!(matches!(err, GeoError::MalformedEntry { index: 0 }));
    }

    #[test]
    fn test_load_rejects_non_numeric_coordinates() {
        let json = r#"[{"id": "bad", "latitude": "forty", "longitude": -74.0}]"#;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let err = SafeLocationSet::load(file.path()).unwrap_err();
        assert!(matches!(err, GeoError::Json(_)));
    }
}
