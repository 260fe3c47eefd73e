use std::sync::Arc;
use std::time::Duration;

use crate::cache::CacheLayer;
use crate::clients::FlightApiClient;
use crate::config::{Config, FetchMode};
use crate::db::Store;
use crate::services::{FetchStrategy, FlightFetcher, FlightService, SeaOrmFlightService};

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub cache: CacheLayer,

    pub fetch_mode: FetchMode,

    pub flight_service: Arc<dyn FlightService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let client = FlightApiClient::new(
            config.flight_api.url_template.clone(),
            Duration::from_secs(config.flight_api.request_timeout_seconds),
        )?;
        Self::with_fetcher(config, Arc::new(client)).await
    }

    /// Wires the state around a caller-supplied fetcher instead of the HTTP
    /// client.
    pub async fn with_fetcher(
        config: Config,
        fetcher: Arc<dyn FlightFetcher>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let cache = CacheLayer::from_config(&config.cache).await;
        let strategy = FetchStrategy::from_config(fetcher, &config.flight_api);
        let fetch_mode = strategy.mode();

        let flight_service = Arc::new(SeaOrmFlightService::new(
            store.clone(),
            cache.clone(),
            strategy,
            config.cache.refresh_on_read,
        )) as Arc<dyn FlightService + Send + Sync + 'static>;

        Ok(Self {
            config: Arc::new(config),
            store,
            cache,
            fetch_mode,
            flight_service,
        })
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
