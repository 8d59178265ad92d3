//! Hourly forecast row model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display format for forecast time labels
pub const TIME_LABEL_FORMAT: &str = "%H:%M";

/// One hour of forecast: a "HH:MM" label and the temperature at 2 m in Celsius.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastRow {
    #[serde(rename = "formatted_time")]
    pub time: String,
    #[serde(rename = "temperature_2m")]
    pub temperature: f64,
}

impl ForecastRow {
    #[must_use]
    pub fn new(timestamp: NaiveDateTime, temperature: f64) -> Self {
        Self {
            time: timestamp.format(TIME_LABEL_FORMAT).to_string(),
            temperature,
        }
    }
}
