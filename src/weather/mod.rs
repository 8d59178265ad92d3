//! Weather lookup service for `OpenMeteo`
//!
//! Resolves a city name to coordinates through the geocoding API, then fetches
//! the hourly temperature forecast for those coordinates. The HTTP client is
//! built once, with timeout and retry policy, and reused for every lookup.

use std::time::{Duration, Instant};

use reqwest::Url;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use tracing::{debug, error, info, instrument, warn};

use crate::Result;
use crate::cache::ResponseCache;
use crate::config::WeatherConfig;
use crate::error::WeatherError;
use crate::models::{CityInfo, ForecastRow};

pub mod open_meteo;

use open_meteo::{ForecastResponse, GeocodingResponse};

const USER_AGENT: &str = concat!("QuickWeather/", env!("CARGO_PKG_VERSION"));

/// City weather lookups against `OpenMeteo`
pub struct WeatherService {
    client: ClientWithMiddleware,
    settings: WeatherConfig,
    cache: Option<(ResponseCache, Duration)>,
}

impl WeatherService {
    /// Create a service with its long-lived HTTP client
    pub fn new(settings: WeatherConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds.into()))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| WeatherError::provider(format!("Failed to create HTTP client: {e}")))?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(settings.max_retries);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            settings,
            cache: None,
        })
    }

    /// Serve successful provider responses from `cache` for `ttl`
    #[must_use]
    pub fn with_cache(mut self, cache: ResponseCache, ttl: Duration) -> Self {
        self.cache = Some((cache, ttl));
        self
    }

    /// Resolve a city name to its first geocoding match.
    ///
    /// `Ok(None)` means the provider answered but knows no such city.
    #[instrument(skip(self))]
    pub async fn resolve_city(&self, city_name: &str) -> Result<Option<CityInfo>> {
        let url = build_url(
            &self.settings.geocoding_url,
            &[
                ("name", city_name.to_string()),
                ("count", self.settings.geocoding_count.to_string()),
                ("language", self.settings.language.clone()),
                ("format", "json".to_string()),
            ],
        )?;

        let body = match self.get_body(url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Geocoding request for '{}' failed: {}", city_name, e);
                return Err(e);
            }
        };

        let response: GeocodingResponse = serde_json::from_str(&body).inspect_err(|e| {
            error!("Failed to parse geocoding response for '{}': {}", city_name, e);
        })?;

        let city = response.into_first();
        match &city {
            Some(city) => debug!(
                "Geocoded '{}' to {} ({})",
                city_name,
                city.name,
                city.format_coordinates()
            ),
            None => warn!("No results found for city '{}'", city_name),
        }
        Ok(city)
    }

    /// Fetch the hourly temperature forecast for a coordinate pair
    #[instrument(skip(self))]
    pub async fn fetch_forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastRow>> {
        let url = build_url(
            &self.settings.forecast_url,
            &[
                ("latitude", latitude.to_string()),
                ("longitude", longitude.to_string()),
                ("hourly", "temperature_2m".to_string()),
                ("forecast_days", self.settings.forecast_days.to_string()),
            ],
        )?;

        let body = self.get_body(url).await?;

        let response: ForecastResponse = serde_json::from_str(&body).inspect_err(|e| {
            error!("Failed to parse forecast response: {}", e);
        })?;

        let rows = response.into_rows(self.settings.max_rows).inspect_err(|e| {
            error!("Unexpected forecast shape: {}", e);
        })?;
        debug!("Forecast reshaped into {} rows", rows.len());
        Ok(rows)
    }

    /// Resolve `city_name`, then fetch its forecast.
    #[instrument(skip(self))]
    pub async fn get_weather_by_city(&self, city_name: &str) -> Result<Vec<ForecastRow>> {
        let start_time = Instant::now();

        let city = self
            .resolve_city(city_name)
            .await?
            .ok_or_else(|| WeatherError::city_not_found(city_name))?;
        info!("Found city: {}, {}", city.name, city.country);

        let rows = self.fetch_forecast(city.latitude, city.longitude).await?;

        info!(
            "Weather for '{}' retrieved in {:.3}s",
            city_name,
            start_time.elapsed().as_secs_f64()
        );
        Ok(rows)
    }

    /// GET `url` and return the body of a successful response. Cache failures
    /// are logged and bypassed.
    async fn get_body(&self, url: Url) -> Result<String> {
        if let Some((cache, _)) = &self.cache {
            match cache.get(url.as_str()).await {
                Ok(Some(body)) => {
                    debug!("Serving {} from cache", url);
                    return Ok(body);
                }
                Ok(None) => {}
                Err(e) => warn!("Cache lookup failed, bypassing: {}", e),
            }
        }

        let request_start = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        debug!(
            "HTTP response received: {} in {:.3}s",
            status,
            request_start.elapsed().as_secs_f64()
        );

        let body = response.error_for_status()?.text().await?;

        if let Some((cache, ttl)) = &self.cache {
            if let Err(e) = cache.put(url.as_str(), body.clone(), *ttl).await {
                warn!("Failed to cache response: {}", e);
            }
        }

        Ok(body)
    }
}

fn build_url(base: &str, params: &[(&str, String)]) -> Result<Url> {
    Url::parse_with_params(base, params)
        .map_err(|e| WeatherError::provider(format!("Invalid endpoint URL '{base}': {e}")))
}
