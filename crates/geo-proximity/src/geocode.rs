//! Offline reverse geocoding over a curated region table
//!
//! Bounding-box lookup only; coordinates outside every known region return
//! `None` and callers skip area-keyed lookups for them.

use crate::Coordinate;
use serde::{Deserialize, Serialize};

/// Region resolved from coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub region: String,
}

/// Resolve coordinates to a known region, if any.
///
/// Boxes are checked in order; the first hit wins, so regions nested inside
/// a larger box must be listed first.
pub fn reverse_geocode(point: Coordinate) -> Option<RegionInfo> {
    // (lat_min, lat_max, lon_min, lon_max, region)
    let bounds: &[(f64, f64, f64, f64, &str)] = &[
        (37.7081, 37.8085, -122.5170, -122.3558, "San Francisco"),
        (25.7617, 25.8554, -80.3762, -80.1301, "Miami"),
        (40.4774, 40.9176, -74.2591, -73.7004, "New York"),
        (41.6444, 42.0230, -87.9401, -87.5244, "Chicago"),
        (33.7037, 34.3373, -118.6682, -118.1553, "Los Angeles"),
        (51.2868, 51.6919, -0.5103, 0.3340, "London"),
        (1.1496, 1.4784, 103.6057, 104.0885, "Singapore"),
    ];

    for &(lat_min, lat_max, lon_min, lon_max, region) in bounds {
        if point.latitude >= lat_min
            && point.latitude <= lat_max
            && point.longitude >= lon_min
            && point.longitude <= lon_max
        {
            return Some(RegionInfo {
                region: region.to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_known_regions() {
        assert_eq!(
            reverse_geocode(coord(40.7128, -74.0060)).unwrap().region,
            "New York"
        );
        assert_eq!(
            reverse_geocode(coord(41.8781, -87.6298)).unwrap().region,
            "Chicago"
        );
        assert_eq!(
            reverse_geocode(coord(51.5074, -0.1278)).unwrap().region,
            "London"
        );
    }

    #[test]
    fn test_unknown_region_is_none() {
        // Middle of the Atlantic
        assert!(reverse_geocode(coord(30.0, -40.0)).is_none());
    }
}
