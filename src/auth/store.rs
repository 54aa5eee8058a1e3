// Session store backends
//
// Sessions live outside the process in Redis; the store owns their time-to-live.
// An in-process store with the same contract serves local runs and tests.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::auth::session::Session;

/// Key prefix for session records in Redis
const KEY_PREFIX: &str = "sess:";

/// Session store failures
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] redis::RedisError),

    #[error("corrupt session record: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Server-side session storage keyed by opaque token
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Stores the session under `token`, starting its time-to-live
    async fn save(&self, token: &str, session: &Session) -> Result<(), SessionError>;

    /// Returns the session, or None when absent or expired
    async fn load(&self, token: &str) -> Result<Option<Session>, SessionError>;

    /// Removes the session. Removing an absent session is not an error.
    async fn destroy(&self, token: &str) -> Result<(), SessionError>;
}

/// Redis-backed session store
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: ConnectionManager,
    ttl: Duration,
}

impl RedisSessionStore {
    /// Connects to Redis and prepares a multiplexed, auto-reconnecting connection
    pub async fn connect(redis_url: &str, ttl: Duration) -> Result<Self, SessionError> {
        tracing::debug!("Connecting to session store at {}", redis_url);
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Session store connection established");
        Ok(Self { conn, ttl })
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn save(&self, token: &str, session: &Session) -> Result<(), SessionError> {
        let value = serde_json::to_string(session)?;
        let mut conn = self.conn.clone();

        redis::cmd("SET")
            .arg(Self::key(token))
            .arg(value)
            .arg("EX")
            .arg(self.ttl.as_secs().max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn load(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let mut conn = self.conn.clone();

        let value: Option<String> = redis::cmd("GET")
            .arg(Self::key(token))
            .query_async(&mut conn)
            .await?;

        match value {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        let mut conn = self.conn.clone();

        redis::cmd("DEL")
            .arg(Self::key(token))
            .query_async::<_, ()>(&mut conn)
            .await?;

        Ok(())
    }
}

/// In-process session store with per-entry expiry
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, (Session, Instant)>>,
    ttl: Duration,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Drops every expired entry, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        before - entries.len()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, token: &str, session: &Session) -> Result<(), SessionError> {
        let expires_at = Instant::now() + self.ttl;
        self.entries
            .write()
            .await
            .insert(token.to_string(), (session.clone(), expires_at));
        Ok(())
    }

    async fn load(&self, token: &str) -> Result<Option<Session>, SessionError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(token)
            .filter(|(_, expires_at)| *expires_at > Instant::now())
            .map(|(session, _)| session.clone()))
    }

    async fn destroy(&self, token: &str) -> Result<(), SessionError> {
        self.entries.write().await.remove(token);
        Ok(())
    }
}
