use super::providers::{MemoryCache, NoOpCache, RedisCache};
use super::traits::CacheBackend;
use crate::config::CacheConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Read-through/write-through cache in front of the record store.
///
/// Keys are `{prefix}_{pk}`. Backend faults are logged and counted but never
/// returned: a failed read behaves like a miss and a failed write is dropped,
/// so the database path always completes.
#[derive(Clone)]
pub struct CacheLayer {
    backend: Arc<dyn CacheBackend>,
    prefix: String,
    ttl: Duration,
    enabled: bool,
}

impl std::fmt::Debug for CacheLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheLayer")
            .field("provider", &self.backend.provider_name())
            .field("prefix", &self.prefix)
            .field("ttl", &self.ttl)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl CacheLayer {
    /// An active layer over `backend`.
    pub fn new(backend: Arc<dyn CacheBackend>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            backend,
            prefix: prefix.into(),
            ttl,
            enabled: true,
        }
    }

    /// A pass-through layer: nothing is ever stored.
    pub fn disabled(prefix: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(NoOpCache::new()),
            prefix: prefix.into(),
            ttl: Duration::ZERO,
            enabled: false,
        }
    }

    /// Builds the layer from configuration. An unknown backend or an
    /// unreachable Redis degrades to a pass-through layer instead of failing
    /// startup.
    pub async fn from_config(config: &CacheConfig) -> Self {
        if !config.enabled {
            info!("Record cache disabled by configuration");
            return Self::disabled(config.key_prefix.clone());
        }

        let backend: Arc<dyn CacheBackend> = match config.backend.as_str() {
            "redis" => match RedisCache::connect(&config.redis_url).await {
                Ok(cache) => Arc::new(cache),
                Err(e) => {
                    warn!(error = %e, "Redis unavailable, record cache disabled");
                    return Self::disabled(config.key_prefix.clone());
                }
            },
            "memory" | "in-memory" | "moka" => Arc::new(MemoryCache::new(config.max_capacity)),
            other => {
                warn!(backend = other, "Unknown cache backend, record cache disabled");
                return Self::disabled(config.key_prefix.clone());
            }
        };

        info!(
            backend = backend.provider_name(),
            ttl_seconds = config.default_ttl_seconds,
            prefix = %config.key_prefix,
            "Record cache initialized"
        );

        Self::new(backend, config.key_prefix.clone(), config.ttl())
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn key(&self, pk: impl Display) -> String {
        format!("{}_{}", self.prefix, pk)
    }

    pub async fn health_check(&self) -> bool {
        match self.backend.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Cache health check failed");
                false
            }
        }
    }

    /// Returns the cached value, treating backend faults and undecodable
    /// entries as misses.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.enabled {
            return None;
        }

        let raw = match self.backend.get(key).await {
            Ok(raw) => raw,
            Err(e) => {
                self.record_fault("get", key, &e);
                return None;
            }
        };

        let Some(raw) = raw else {
            metrics::counter!("flight_cache_misses_total", "prefix" => self.prefix.clone())
                .increment(1);
            debug!(key, "Cache MISS");
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                metrics::counter!("flight_cache_hits_total", "prefix" => self.prefix.clone())
                    .increment(1);
                debug!(key, "Cache HIT");
                Some(value)
            }
            Err(e) => {
                warn!(key, error = %e, "Discarding undecodable cache entry");
                self.delete(key).await;
                None
            }
        }
    }

    /// Read-through with the layer's default TTL.
    pub async fn get_or_set<T, E, F, Fut>(&self, key: &str, supplier: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        self.get_or_set_with_ttl(key, self.ttl, supplier).await
    }

    /// Serves a cached copy when present; otherwise runs `supplier`, stores
    /// its value and returns it. Supplier errors propagate and nothing is
    /// stored.
    pub async fn get_or_set_with_ttl<T, E, F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        supplier: F,
    ) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(cached) = self.get(key).await {
            return Ok(cached);
        }

        let value = supplier().await?;
        self.set_with_ttl(key, &value, ttl).await;
        Ok(value)
    }

    /// Unconditional write-through with the layer's default TTL.
    pub async fn set<T: Serialize>(&self, key: &str, value: &T) {
        self.set_with_ttl(key, value, self.ttl).await;
    }

    pub async fn set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        if !self.enabled {
            return;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key, error = %e, "Failed to encode value for cache");
                return;
            }
        };

        match self.backend.set(key, &payload, ttl).await {
            Ok(()) => debug!(key, ttl_seconds = ttl.as_secs(), "Cache SET"),
            Err(e) => self.record_fault("set", key, &e),
        }
    }

    pub async fn delete(&self, key: &str) {
        if !self.enabled {
            return;
        }

        match self.backend.delete(key).await {
            Ok(()) => debug!(key, "Cache DEL"),
            Err(e) => self.record_fault("delete", key, &e),
        }
    }

    /// Whether a live entry exists. A faulty backend reports `false`.
    pub async fn contains(&self, key: &str) -> bool {
        if !self.enabled {
            return false;
        }

        match self.backend.exists(key).await {
            Ok(exists) => exists,
            Err(e) => {
                self.record_fault("contains", key, &e);
                false
            }
        }
    }

    fn record_fault(&self, op: &'static str, key: &str, err: &super::CacheError) {
        metrics::counter!("flight_cache_errors_total", "op" => op).increment(1);
        warn!(op, key, error = %err, "Cache backend error, continuing without cache");
    }
}
