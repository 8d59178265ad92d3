//! Session storage
//!
//! Sessions are identified by a random id carried in a cookie. Each session
//! holds named JSON values; callers own the typing of what they store.
//! Sessions that go unwritten for longer than the store's TTL are dropped.

use std::collections::HashMap;
use std::fmt::Display;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use axum::http::{HeaderMap, HeaderValue, header};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "quickweather_session";

/// Idle lifetime of a session: two weeks
pub const DEFAULT_SESSION_TTL: Duration = Duration::from_secs(14 * 24 * 3600);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Session id from the request's cookie header, if present and well formed.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
            .map(Self)
    }

    /// `Set-Cookie` value binding the client to this session for `max_age`
    #[must_use]
    pub fn to_cookie(&self, max_age: Duration) -> HeaderValue {
        let cookie = format!(
            "{SESSION_COOKIE}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
            self.0,
            max_age.as_secs()
        );
        // A hyphenated UUID and the fixed attributes are always valid header text
        HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named values attached to a session
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session: &SessionId, key: &str) -> Option<Value>;
    async fn set(&self, session: &SessionId, key: &str, value: Value);
    async fn remove(&self, session: &SessionId, key: &str);

    /// How long an idle session is kept, and so the client cookie's lifetime
    fn max_age(&self) -> Duration;
}

struct Session {
    values: HashMap<String, Value>,
    last_write: Instant,
}

impl Session {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_write.elapsed() >= ttl
    }
}

/// Process-local session store. Concurrent writers to the same session
/// overwrite each other; the last write wins.
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, Session>>,
    ttl: Duration,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::with_ttl(DEFAULT_SESSION_TTL)
    }
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose sessions expire `ttl` after their last write
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Drop every session idle for longer than the TTL. Returns how many went.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        purge(&mut sessions, self.ttl)
    }
}

fn purge(sessions: &mut HashMap<SessionId, Session>, ttl: Duration) -> usize {
    let before = sessions.len();
    sessions.retain(|_, session| !session.is_expired(ttl));
    let purged = before - sessions.len();
    if purged > 0 {
        debug!("Expired {} idle sessions", purged);
    }
    purged
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, session: &SessionId, key: &str) -> Option<Value> {
        self.sessions
            .read()
            .await
            .get(session)
            .filter(|stored| !stored.is_expired(self.ttl))
            .and_then(|stored| stored.values.get(key))
            .cloned()
    }

    async fn set(&self, session: &SessionId, key: &str, value: Value) {
        let mut sessions = self.sessions.write().await;
        purge(&mut sessions, self.ttl);

        let stored = sessions.entry(session.clone()).or_insert_with(|| Session {
            values: HashMap::new(),
            last_write: Instant::now(),
        });
        stored.values.insert(key.to_string(), value);
        stored.last_write = Instant::now();
    }

    async fn remove(&self, session: &SessionId, key: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(stored) = sessions.get_mut(session) {
            stored.values.remove(key);
            if stored.values.is_empty() {
                sessions.remove(session);
            }
        }
    }

    fn max_age(&self) -> Duration {
        self.ttl
    }
}
