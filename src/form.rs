//! City input validation

use serde::Deserialize;
use thiserror::Error;

/// Longest accepted city name, in characters
pub const CITY_MAX_LENGTH: usize = 100;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter a city name")]
    Required,

    #[error("City name must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },
}

/// The city field as submitted, either in a query string or an urlencoded body
#[derive(Debug, Default, Deserialize)]
pub struct CityForm {
    pub city: Option<String>,
}

impl CityForm {
    /// Whether the request carried a city field at all
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.city.is_some()
    }

    /// Validate and return the trimmed city name
    pub fn clean(&self) -> Result<String, FormError> {
        let city = self.city.as_deref().unwrap_or_default().trim();
        if city.is_empty() {
            return Err(FormError::Required);
        }

        let length = city.chars().count();
        if length > CITY_MAX_LENGTH {
            return Err(FormError::TooLong {
                max: CITY_MAX_LENGTH,
                actual: length,
            });
        }

        Ok(city.to_string())
    }
}
