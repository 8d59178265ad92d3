//! Error types and handling for the QuickWeather service

use thiserror::Error;

/// Outcome of a failed weather lookup.
///
/// Callers branch on the variant: a missing city is an answer from the
/// provider, while `Provider` means the provider could not be asked at all.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Geocoding returned no match for the requested name
    #[error("City '{city}' not found")]
    CityNotFound { city: String },

    /// Network failure, timeout or non-2xx status from a provider
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Provider answered with a body we cannot interpret
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Response cache failure
    #[error("Cache error: {message}")]
    Cache { message: String },
}

impl WeatherError {
    /// Create a new not-found error
    pub fn city_not_found<S: Into<String>>(city: S) -> Self {
        Self::CityNotFound { city: city.into() }
    }

    /// Create a new provider error
    pub fn provider<S: Into<String>>(message: S) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Create a new malformed response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::CityNotFound { city } => format!("City '{city}' not found"),
            WeatherError::Provider { .. } => {
                "Weather service is temporarily unavailable. Please try again later.".to_string()
            }
            WeatherError::MalformedResponse { .. } => {
                "Weather service returned unexpected data.".to_string()
            }
            WeatherError::Cache { .. } => {
                "Cache operation failed. You may need to clear your cache.".to_string()
            }
        }
    }
}

impl From<reqwest_middleware::Error> for WeatherError {
    fn from(err: reqwest_middleware::Error) -> Self {
        WeatherError::provider(err.to_string())
    }
}

impl From<reqwest::Error> for WeatherError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            WeatherError::malformed(err.to_string())
        } else {
            WeatherError::provider(err.to_string())
        }
    }
}

impl From<serde_json::Error> for WeatherError {
    fn from(err: serde_json::Error) -> Self {
        WeatherError::malformed(err.to_string())
    }
}
