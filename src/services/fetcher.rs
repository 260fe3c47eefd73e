//! External flight fetch, run either inline or as a background task with a
//! bounded wait. Both modes return the same `FetchResponse`/`FetchError`
//! values so the lookup logic never branches on the mode.

use crate::clients::{FetchResponse, FlightApiClient};
use crate::config::{FetchMode, FlightApiConfig};
use crate::models::NaturalKey;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// One external lookup for a natural key.
#[async_trait::async_trait]
pub trait FlightFetcher: Send + Sync {
    async fn fetch(&self, key: &NaturalKey) -> anyhow::Result<FetchResponse>;
}

#[async_trait::async_trait]
impl FlightFetcher for FlightApiClient {
    async fn fetch(&self, key: &NaturalKey) -> anyhow::Result<FetchResponse> {
        Self::fetch(self, key).await
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timed out after {0}s waiting for flight details.")]
    TimedOut(u64),

    #[error("{0}")]
    Failed(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct FetchStrategy {
    fetcher: Arc<dyn FlightFetcher>,
    mode: FetchMode,
    wait: Duration,
}

impl FetchStrategy {
    pub fn immediate(fetcher: Arc<dyn FlightFetcher>) -> Self {
        Self {
            fetcher,
            mode: FetchMode::Immediate,
            wait: Duration::ZERO,
        }
    }

    pub fn deferred(fetcher: Arc<dyn FlightFetcher>, wait: Duration) -> Self {
        Self {
            fetcher,
            mode: FetchMode::Deferred,
            wait,
        }
    }

    pub fn from_config(fetcher: Arc<dyn FlightFetcher>, config: &FlightApiConfig) -> Self {
        match config.fetch_mode {
            FetchMode::Immediate => Self::immediate(fetcher),
            FetchMode::Deferred => {
                Self::deferred(fetcher, Duration::from_secs(config.deferred_wait_seconds))
            }
        }
    }

    #[must_use]
    pub const fn mode(&self) -> FetchMode {
        self.mode
    }

    pub async fn fetch(&self, key: &NaturalKey) -> Result<FetchResponse, FetchError> {
        match self.mode {
            FetchMode::Immediate => self.fetch_now(key).await,
            FetchMode::Deferred => self.fetch_async_then_await(key, self.wait).await,
        }
    }

    pub async fn fetch_now(&self, key: &NaturalKey) -> Result<FetchResponse, FetchError> {
        Ok(self.fetcher.fetch(key).await?)
    }

    /// Runs the fetch on a separate task and waits at most `wait` for it.
    /// On timeout the task is aborted, so a late response is never observed.
    pub async fn fetch_async_then_await(
        &self,
        key: &NaturalKey,
        wait: Duration,
    ) -> Result<FetchResponse, FetchError> {
        let fetcher = Arc::clone(&self.fetcher);
        let task_key = key.clone();
        let mut handle = tokio::spawn(async move { fetcher.fetch(&task_key).await });

        debug!(wait_ms = wait.as_millis() as u64, "Deferred fetch dispatched for {}", key);

        match tokio::time::timeout(wait, &mut handle).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(join_err)) => Err(FetchError::Failed(anyhow::anyhow!(
                "Fetch task failed: {join_err}"
            ))),
            Err(_) => {
                handle.abort();
                warn!(wait_seconds = wait.as_secs(), "Deferred fetch timed out for {}", key);
                Err(FetchError::TimedOut(wait.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct DelayedFetcher {
        delay: Duration,
        response: FetchResponse,
        completed: Arc<AtomicBool>,
    }

    #[async_trait::async_trait]
    impl FlightFetcher for DelayedFetcher {
        async fn fetch(&self, _key: &NaturalKey) -> anyhow::Result<FetchResponse> {
            tokio::time::sleep(self.delay).await;
            self.completed.store(true, Ordering::SeqCst);
            Ok(self.response.clone())
        }
    }

    struct BrokenFetcher;

    #[async_trait::async_trait]
    impl FlightFetcher for BrokenFetcher {
        async fn fetch(&self, _key: &NaturalKey) -> anyhow::Result<FetchResponse> {
            anyhow::bail!("Service Unavailable")
        }
    }

    fn key() -> NaturalKey {
        NaturalKey::new("AA", "100", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    fn delayed(delay: Duration) -> (Arc<DelayedFetcher>, Arc<AtomicBool>) {
        let completed = Arc::new(AtomicBool::new(false));
        let fetcher = Arc::new(DelayedFetcher {
            delay,
            response: FetchResponse {
                status: 200,
                document: Some(serde_json::json!({"flightId": 1})),
            },
            completed: completed.clone(),
        });
        (fetcher, completed)
    }

    #[tokio::test]
    async fn test_modes_return_identical_results() {
        let (fetcher, _) = delayed(Duration::from_millis(10));

        let now = FetchStrategy::immediate(fetcher.clone())
            .fetch(&key())
            .await
            .unwrap();
        let later = FetchStrategy::deferred(fetcher, Duration::from_secs(5))
            .fetch(&key())
            .await
            .unwrap();

        assert_eq!(now, later);
    }

    #[tokio::test]
    async fn test_modes_propagate_the_same_error() {
        let now = FetchStrategy::immediate(Arc::new(BrokenFetcher))
            .fetch(&key())
            .await
            .unwrap_err();
        let later = FetchStrategy::deferred(Arc::new(BrokenFetcher), Duration::from_secs(5))
            .fetch(&key())
            .await
            .unwrap_err();

        assert_eq!(now.to_string(), "Service Unavailable");
        assert_eq!(later.to_string(), "Service Unavailable");
    }

    #[tokio::test]
    async fn test_deferred_times_out_and_discards_late_result() {
        let (fetcher, completed) = delayed(Duration::from_millis(300));
        let strategy = FetchStrategy::deferred(fetcher, Duration::from_millis(50));

        let err = strategy.fetch(&key()).await.unwrap_err();
        assert!(matches!(err, FetchError::TimedOut(_)));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!completed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_from_config_selects_mode() {
        let (fetcher, _) = delayed(Duration::ZERO);
        let mut config = FlightApiConfig::default();
        assert_eq!(
            FetchStrategy::from_config(fetcher.clone(), &config).mode(),
            FetchMode::Immediate
        );

        config.fetch_mode = FetchMode::Deferred;
        assert_eq!(
            FetchStrategy::from_config(fetcher, &config).mode(),
            FetchMode::Deferred
        );
    }
}
