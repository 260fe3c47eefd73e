use super::errors::CacheResult;
use std::time::Duration;

/// Raw key/value operations a cache backend must provide.
///
/// Values are opaque strings; typed encoding happens in [`super::CacheLayer`].
#[async_trait::async_trait]
pub trait CacheBackend: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()>;

    /// Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    async fn exists(&self, key: &str) -> CacheResult<bool>;

    async fn health_check(&self) -> CacheResult<bool>;

    fn provider_name(&self) -> &'static str;
}
