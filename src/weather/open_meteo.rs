//! `OpenMeteo` API response structures and conversion utilities

use chrono::NaiveDateTime;
use serde::Deserialize;

use crate::error::WeatherError;
use crate::models::{CityInfo, ForecastRow};

/// Timestamp format of hourly `time` values (local ISO 8601 without seconds)
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Geocoding response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct GeocodingResponse {
    pub results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
pub struct GeocodingResult {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
}

impl From<GeocodingResult> for CityInfo {
    fn from(result: GeocodingResult) -> Self {
        CityInfo {
            name: result.name,
            latitude: result.latitude,
            longitude: result.longitude,
            country: result.country.unwrap_or_default(),
        }
    }
}

impl GeocodingResponse {
    /// First result, if the provider returned any.
    pub fn into_first(self) -> Option<CityInfo> {
        self.results
            .unwrap_or_default()
            .into_iter()
            .next()
            .map(CityInfo::from)
    }
}

/// Forecast response from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct ForecastResponse {
    pub hourly: Option<HourlyData>,
}

/// Hourly weather data from `OpenMeteo`
#[derive(Debug, Deserialize)]
pub struct HourlyData {
    pub time: Vec<String>,
    #[serde(rename = "temperature_2m")]
    pub temperature: Option<Vec<f64>>,
}

impl ForecastResponse {
    /// Reshape the hourly arrays into display rows, keeping source order and at
    /// most `limit` rows.
    pub fn into_rows(self, limit: usize) -> Result<Vec<ForecastRow>, WeatherError> {
        let hourly = self
            .hourly
            .ok_or_else(|| WeatherError::malformed("Forecast response has no hourly block"))?;
        let temperatures = hourly.temperature.ok_or_else(|| {
            WeatherError::malformed("Forecast response has no temperature_2m series")
        })?;

        if hourly.time.len() != temperatures.len() {
            return Err(WeatherError::malformed(format!(
                "Hourly series length mismatch: {} timestamps, {} temperatures",
                hourly.time.len(),
                temperatures.len()
            )));
        }

        hourly
            .time
            .iter()
            .zip(temperatures)
            .take(limit)
            .map(|(time, temperature)| {
                let timestamp = NaiveDateTime::parse_from_str(time, TIME_FORMAT).map_err(|e| {
                    WeatherError::malformed(format!("Invalid forecast timestamp '{time}': {e}"))
                })?;
                Ok(ForecastRow::new(timestamp, temperature))
            })
            .collect()
    }
}
