//! Search history entry model

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display format for history timestamps
pub const HISTORY_DATE_FORMAT: &str = "%d.%m.%Y %H:%M";

/// A city the session has looked up successfully, with the time of the lookup.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub city: String,
    pub date: String,
}

impl HistoryEntry {
    #[must_use]
    pub fn new(city: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            city: city.into(),
            date: at.format(HISTORY_DATE_FORMAT).to_string(),
        }
    }

    /// Case-insensitive comparison of the stored city against `city`
    #[must_use]
    pub fn is_city(&self, city: &str) -> bool {
        self.city.to_lowercase() == city.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_entry_date_format() {
        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let entry = HistoryEntry::new("Moscow", at);
        assert_eq!(entry.date, "01.01.2024 10:00");
    }

    #[test]
    fn test_is_city_ignores_case() {
        let entry = HistoryEntry {
            city: "Москва".to_string(),
            date: "01.01.2024 10:00".to_string(),
        };
        assert!(entry.is_city("МОСКВА"));
        assert!(entry.is_city("москва"));
        assert!(!entry.is_city("Казань"));
    }
}
