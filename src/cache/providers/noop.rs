//! Backend used when caching is switched off or the configured backend could
//! not be reached at startup. Every read misses and every write succeeds.

use crate::cache::errors::CacheResult;
use crate::cache::traits::CacheBackend;
use std::time::Duration;

#[derive(Debug, Clone, Default)]
pub struct NoOpCache;

impl NoOpCache {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl CacheBackend for NoOpCache {
    async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn exists(&self, _key: &str) -> CacheResult<bool> {
        Ok(false)
    }

    async fn health_check(&self) -> CacheResult<bool> {
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "noop"
    }
}
