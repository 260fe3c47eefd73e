//! Redis backend using a multiplexed `ConnectionManager` that reconnects on
//! its own after transient failures.

use crate::cache::errors::{CacheError, CacheResult};
use crate::cache::traits::CacheBackend;
use std::time::Duration;
use tracing::debug;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone)]
pub struct RedisCache {
    connection_manager: redis::aio::ConnectionManager,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("connection_manager", &"ConnectionManager")
            .finish()
    }
}

impl RedisCache {
    pub async fn connect(url: &str) -> CacheResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {e}")))?;

        // ConnectionManager retries with backoff; startup must not hang on a dead server.
        let connection_manager = tokio::time::timeout(
            CONNECT_TIMEOUT,
            redis::aio::ConnectionManager::new(client),
        )
        .await
        .map_err(|_| CacheError::Connection("Timed out connecting to Redis".to_string()))?
        .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {e}")))?;

        debug!(url = %redact_url(url), "Redis cache connected");

        Ok(Self { connection_manager })
    }
}

#[async_trait::async_trait]
impl CacheBackend for RedisCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection_manager.clone();
        redis::cmd("GET")
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis GET failed: {e}")))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();
        let ttl_seconds = ttl.as_secs().max(1);

        redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_seconds)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis SETEX failed: {e}")))
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let mut conn = self.connection_manager.clone();

        redis::cmd("DEL")
            .arg(key)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis DEL failed: {e}")))
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let mut conn = self.connection_manager.clone();

        let count: u64 = redis::cmd("EXISTS")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis EXISTS failed: {e}")))?;

        Ok(count > 0)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        let mut conn = self.connection_manager.clone();
        let pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| CacheError::Backend(format!("Redis PING failed: {e}")))?;

        Ok(pong == "PONG")
    }

    fn provider_name(&self) -> &'static str {
        "redis"
    }
}

/// Masks the password part of a Redis URL for logging.
fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            let _ = parsed.set_password(Some("***"));
            parsed.to_string()
        }
        _ => url.to_string(),
    }
}
