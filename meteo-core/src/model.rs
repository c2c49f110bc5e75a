use serde::{Deserialize, Serialize};

use crate::wmo::WeatherCode;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One geocoding result as stored in the coordinate cache.
///
/// Example JSON:
/// {"lat": 47.6, "lon": -122.3, "name": "Seattle", "country": "United States"}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
    #[serde(rename = "name")]
    pub resolved_name: String,
    #[serde(default)]
    pub country: String,
}

impl GeoRecord {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates { latitude: self.latitude, longitude: self.longitude }
    }
}

/// Output of the geocoding resolver.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPlace {
    pub coordinates: Coordinates,
    /// What the user typed, qualifier included; falls back to `resolved_name`.
    pub display_name: String,
    pub resolved_name: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_f: f64,
    pub weather_code: WeatherCode,
    pub humidity_pct: Option<u8>,
    pub wind_mph: Option<f64>,
    /// Provider local time, e.g. "2024-05-01T14:45".
    pub observed_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyEntry {
    pub timestamp: String,
    pub temperature_f: f64,
    pub precipitation_probability: Option<u8>,
}

/// Hourly outlook. The three sequences always have the same length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    pub timestamps: Vec<String>,
    pub temperatures_f: Vec<f64>,
    pub precipitation_probabilities: Vec<Option<u8>>,
}

impl HourlySeries {
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn entry(&self, index: usize) -> Option<HourlyEntry> {
        Some(HourlyEntry {
            timestamp: self.timestamps.get(index)?.clone(),
            temperature_f: *self.temperatures_f.get(index)?,
            precipitation_probability: self
                .precipitation_probabilities
                .get(index)
                .copied()
                .flatten(),
        })
    }
}
