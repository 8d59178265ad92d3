//! Data models for the QuickWeather service
//!
//! This module contains the core domain models organized by concern:
//! - City: resolved geocoding result
//! - Forecast: hourly temperature rows
//! - History: per-session search history entries

pub mod city;
pub mod forecast;
pub mod history;

// Re-export all public types for convenient access
pub use city::CityInfo;
pub use forecast::ForecastRow;
pub use history::HistoryEntry;
