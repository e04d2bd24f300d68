use async_trait::async_trait;
use dashmap::DashMap;
use rand::Rng;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::warn;

use crate::{config::RedisConfig, error::AppError, models::SessionData};

pub const SESSION_COOKIE: &str = "booking_session";

const SESSION_KEY_PREFIX: &str = "session:";

/// Opaque, unguessable session handle carried by the cookie.
pub fn new_session_handle() -> String {
    let bytes: [u8; 32] = rand::rngs::OsRng.gen();
    hex::encode(bytes)
}

/// Session persistence seam. Handles are opaque strings; expiry is the
/// store's concern.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, handle: &str) -> Result<Option<SessionData>, AppError>;
    async fn put(&self, handle: &str, data: &SessionData) -> Result<(), AppError>;
    async fn destroy(&self, handle: &str) -> Result<(), AppError>;
    async fn health_check(&self) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct RedisSessionStore {
    manager: ConnectionManager,
    ttl_seconds: i64,
}

impl RedisSessionStore {
    pub async fn new(config: &RedisConfig, ttl_seconds: i64) -> Result<Self, AppError> {
        let client = redis::Client::open(config.url.as_str())?;
        let manager = ConnectionManager::new(client).await?;
        Ok(Self {
            manager,
            ttl_seconds,
        })
    }

    fn key(handle: &str) -> String {
        format!("{SESSION_KEY_PREFIX}{handle}")
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, handle: &str) -> Result<Option<SessionData>, AppError> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = conn.get(Self::key(handle)).await?;
        match raw {
            Some(json) => match serde_json::from_str(&json) {
                Ok(data) => Ok(Some(data)),
                Err(e) => {
                    // a corrupt session reads as absent; the client just
                    // re-authenticates
                    warn!(error = %e, "discarding unreadable session payload");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    async fn put(&self, handle: &str, data: &SessionData) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        let json = serde_json::to_string(data).map_err(|e| AppError::Internal(e.into()))?;
        conn.set_ex::<_, _, ()>(Self::key(handle), json, self.ttl_seconds as u64)
            .await?;
        Ok(())
    }

    async fn destroy(&self, handle: &str) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(Self::key(handle)).await?;
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        let mut conn = self.manager.clone();
        redis::cmd("PING").query_async::<_, ()>(&mut conn).await?;
        Ok(())
    }
}

/// In-memory session store used by tests. Never expires entries.
#[derive(Default)]
pub struct MemorySessionStore {
    pub sessions: DashMap<String, SessionData>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, handle: &str) -> Result<Option<SessionData>, AppError> {
        Ok(self.sessions.get(handle).map(|data| data.clone()))
    }

    async fn put(&self, handle: &str, data: &SessionData) -> Result<(), AppError> {
        self.sessions.insert(handle.to_string(), data.clone());
        Ok(())
    }

    async fn destroy(&self, handle: &str) -> Result<(), AppError> {
        self.sessions.remove(handle);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
