use crate::Result;
use crate::error::WeatherError;
use fjall::Keyspace;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    body: String,
    expires_at: u64, // Unix timestamp (seconds)
}

/// Disk-backed cache of provider response bodies, keyed by request URL.
#[derive(Clone)]
pub struct ResponseCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store
        .get(key)
        .map_err(|e| WeatherError::cache(e.to_string()))?
        .map(|v| v.to_vec()))
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| WeatherError::cache(e.to_string()))
}

impl ResponseCache {
    /// Opens (or creates) the cache database under `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(|e| WeatherError::cache(format!("Failed to open cache database: {e}")))?;
        let items = db
            .keyspace("responses", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| WeatherError::cache(e.to_string()))?;
        Ok(ResponseCache { store: items })
    }

    /// Stores a response body with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, body))]
    pub async fn put(&self, key: &str, body: String, ttl: Duration) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();
        let expires_at = unix_now()?.saturating_add(ttl.as_secs());
        let entry = StoredEntry { body, expires_at };
        let bytes = postcard::to_stdvec(&entry).map_err(|e| WeatherError::cache(e.to_string()))?;

        task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(|e| WeatherError::cache(e.to_string()))?
            .map_err(|e| WeatherError::cache(e.to_string()))?;
        Ok(())
    }

    /// Retrieves a body if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key_bytes))
            .await
            .map_err(|e| WeatherError::cache(e.to_string()))??;

        let Some(bytes) = maybe_bytes else {
            tracing::debug!("Key not found");
            return Ok(None);
        };

        let entry: StoredEntry =
            postcard::from_bytes(&bytes).map_err(|e| WeatherError::cache(e.to_string()))?;

        if unix_now()? < entry.expires_at {
            tracing::debug!("Key found and still fresh");
            Ok(Some(entry.body))
        } else {
            tracing::debug!("Key found but expired");
            self.remove(key).await?;
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(|e| WeatherError::cache(e.to_string()))?
            .map_err(|e| WeatherError::cache(e.to_string()))?;
        Ok(())
    }
}
