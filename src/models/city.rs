//! Resolved city model

use serde::{Deserialize, Serialize};

/// A city resolved through geocoding. Lives for a single lookup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityInfo {
    /// City name as reported by the geocoder
    pub name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
    /// Country name, empty when the geocoder omits it
    pub country: String,
}

impl CityInfo {
    #[must_use]
    pub fn new(name: String, latitude: f64, longitude: f64, country: String) -> Self {
        Self {
            name,
            latitude,
            longitude,
            country,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}
