//! `QuickWeather` - city weather lookups with a per-session search history
//!
//! This library resolves city names to coordinates, fetches hourly temperature
//! forecasts from `OpenMeteo`, and keeps a short, deduplicated list of the
//! cities each session has looked up.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod form;
pub mod history;
pub mod logging;
pub mod models;
pub mod session;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use api::AppState;
pub use cache::ResponseCache;
pub use config::QuickWeatherConfig;
pub use error::WeatherError;
pub use models::{CityInfo, ForecastRow, HistoryEntry};
pub use session::{MemorySessionStore, SessionId, SessionStore};
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result of provider, cache and lookup operations
pub type Result<T> = std::result::Result<T, WeatherError>;
