//! Per-session search history
//!
//! The history is an ordered list of [`HistoryEntry`] values, newest first,
//! with at most [`HISTORY_LIMIT`] entries and no two cities that compare equal
//! ignoring case. Updates are pure; persisting the result into the session is
//! left to [`load`] and [`save`].

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{debug, warn};

use crate::models::HistoryEntry;
use crate::session::{SessionId, SessionStore};

/// Maximum number of entries kept per session
pub const HISTORY_LIMIT: usize = 10;

/// Session key under which the history is stored
pub const HISTORY_SESSION_KEY: &str = "search_history";

/// Record a successful lookup of `city_name` at `now`.
///
/// A city already present (ignoring case) leaves the history untouched, neither
/// moved nor re-dated. Otherwise the new entry goes first and the oldest entries
/// beyond [`HISTORY_LIMIT`] are dropped.
#[must_use]
pub fn record_lookup(
    mut history: Vec<HistoryEntry>,
    city_name: &str,
    now: NaiveDateTime,
) -> Vec<HistoryEntry> {
    if history.iter().any(|entry| entry.is_city(city_name)) {
        return history;
    }

    history.insert(0, HistoryEntry::new(city_name, now));
    history.truncate(HISTORY_LIMIT);
    history
}

/// Reset a history.
#[must_use]
pub fn clear(_history: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    Vec::new()
}

/// Read the session's history. A missing or undecodable value is an empty history.
pub async fn load(store: &dyn SessionStore, session: &SessionId) -> Vec<HistoryEntry> {
    let Some(value) = store.get(session, HISTORY_SESSION_KEY).await else {
        return Vec::new();
    };

    match serde_json::from_value(value) {
        Ok(history) => history,
        Err(e) => {
            warn!("Discarding undecodable search history: {}", e);
            Vec::new()
        }
    }
}

/// Write the session's history back.
pub async fn save(store: &dyn SessionStore, session: &SessionId, history: &[HistoryEntry]) {
    debug!("Saving {} history entries", history.len());
    store_encoded(store, session, history).await;
}

/// Encode `history` into the session. An encoding failure leaves the stored
/// value as it was.
async fn store_encoded<T: Serialize + ?Sized>(
    store: &dyn SessionStore,
    session: &SessionId,
    history: &T,
) {
    match serde_json::to_value(history) {
        Ok(value) => store.set(session, HISTORY_SESSION_KEY, value).await,
        Err(e) => warn!("Keeping previous search history, failed to encode update: {}", e),
    }
}

/// Drop the session's history value entirely.
pub async fn remove(store: &dyn SessionStore, session: &SessionId) {
    store.remove(session, HISTORY_SESSION_KEY).await;
}
