//! Configuration management for QuickWeather
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use anyhow::{Context, Result, bail};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the QuickWeather service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuickWeatherConfig {
    /// Weather provider configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Response cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Session store configuration
    #[serde(default)]
    pub session: SessionConfig,
}

/// Weather provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Forecast endpoint
    #[serde(default = "default_forecast_url")]
    pub forecast_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for transient failures
    #[serde(default = "default_weather_max_retries")]
    pub max_retries: u32,
    /// Number of geocoding results to request
    #[serde(default = "default_geocoding_count")]
    pub geocoding_count: u32,
    /// Language hint for geocoding results
    #[serde(default = "default_language")]
    pub language: String,
    /// Forecast window in days
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u32,
    /// Maximum number of forecast rows returned
    #[serde(default = "default_max_rows")]
    pub max_rows: usize,
}

/// Response cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Entry lifetime in seconds
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
}

/// Session store settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Seconds a session survives without being written
    #[serde(default = "default_session_ttl")]
    pub ttl_seconds: u64,
    /// Seconds between sweeps that drop expired sessions
    #[serde(default = "default_session_purge_interval")]
    pub purge_interval_seconds: u64,
}

// Default value functions
fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_forecast_url() -> String {
    "https://api.open-meteo.com/v1/forecast".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_weather_max_retries() -> u32 {
    3
}

fn default_geocoding_count() -> u32 {
    1
}

fn default_language() -> String {
    "ru".to_string()
}

fn default_forecast_days() -> u32 {
    1
}

fn default_max_rows() -> usize {
    24
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> u64 {
    3600
}

fn default_cache_location() -> String {
    ".cache".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    8000
}

fn default_session_ttl() -> u64 {
    14 * 24 * 3600
}

fn default_session_purge_interval() -> u64 {
    600
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            forecast_url: default_forecast_url(),
            timeout_seconds: default_weather_timeout(),
            max_retries: default_weather_max_retries(),
            geocoding_count: default_geocoding_count(),
            language: default_language(),
            forecast_days: default_forecast_days(),
            max_rows: default_max_rows(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_seconds: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_session_ttl(),
            purge_interval_seconds: default_session_purge_interval(),
        }
    }
}

impl QuickWeatherConfig {
    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = match config_path {
            Some(path) if !path.exists() => {
                bail!("Config file not found: {}", path.display());
            }
            Some(path) => path,
            None => Self::get_config_path()
                .filter(|path| path.exists())
                .unwrap_or_else(|| PathBuf::from("config.toml")),
        };

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // QUICKWEATHER_WEATHER__MAX_ROWS=12 overrides weather.max_rows
        builder = builder.add_source(
            Environment::with_prefix("QUICKWEATHER")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: QuickWeatherConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("quickweather").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.weather.forecast_url.is_empty() {
            self.weather.forecast_url = default_forecast_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.weather.geocoding_count == 0 {
            self.weather.geocoding_count = default_geocoding_count();
        }
        if self.weather.language.is_empty() {
            self.weather.language = default_language();
        }
        if self.weather.forecast_days == 0 {
            self.weather.forecast_days = default_forecast_days();
        }
        if self.weather.max_rows == 0 {
            self.weather.max_rows = default_max_rows();
        }
        if self.cache.ttl_seconds == 0 {
            self.cache.ttl_seconds = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.host.is_empty() {
            self.server.host = default_server_host();
        }
        if self.session.ttl_seconds == 0 {
            self.session.ttl_seconds = default_session_ttl();
        }
        if self.session.purge_interval_seconds == 0 {
            self.session.purge_interval_seconds = default_session_purge_interval();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            bail!("Weather API timeout cannot exceed 300 seconds");
        }

        if self.weather.max_retries > 10 {
            bail!("Weather API max retries cannot exceed 10");
        }

        if self.weather.geocoding_count > 100 {
            bail!("Geocoding result count cannot exceed 100");
        }

        if self.weather.forecast_days > 16 {
            bail!("Forecast window cannot exceed 16 days");
        }

        if self.weather.max_rows > 168 {
            bail!("Forecast rows cannot exceed 168 (one week of hours)");
        }

        if self.cache.ttl_seconds > 7 * 24 * 3600 {
            bail!("Cache TTL cannot exceed one week");
        }

        if self.session.ttl_seconds > 365 * 24 * 3600 {
            bail!("Session TTL cannot exceed one year");
        }

        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            bail!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            );
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            bail!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            );
        }

        for url in [&self.weather.geocoding_url, &self.weather.forecast_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                bail!("Weather endpoint '{url}' must be a valid HTTP or HTTPS URL");
            }
        }

        Ok(())
    }
}
