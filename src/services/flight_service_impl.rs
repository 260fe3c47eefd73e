//! `SeaORM` implementation of the `FlightService` trait.

use crate::cache::CacheLayer;
use crate::db::{CreateOutcome, Store};
use crate::models::{FlightRecord, NaturalKey};
use crate::services::fetcher::{FetchError, FetchStrategy};
use crate::services::flight_service::{FlightError, FlightService};
use async_trait::async_trait;
use tracing::{debug, info, warn};

pub struct SeaOrmFlightService {
    store: Store,
    cache: CacheLayer,
    fetcher: FetchStrategy,
    refresh_on_read: bool,
}

impl SeaOrmFlightService {
    #[must_use]
    pub const fn new(
        store: Store,
        cache: CacheLayer,
        fetcher: FetchStrategy,
        refresh_on_read: bool,
    ) -> Self {
        Self {
            store,
            cache,
            fetcher,
            refresh_on_read,
        }
    }

    /// Natural key -> stored record, going to the provider on a miss.
    async fn resolve(&self, key: &NaturalKey) -> Result<FlightRecord, FlightError> {
        if let Some(record) = self.find_unique(key).await? {
            metrics::counter!("flight_lookups_total", "source" => "store").increment(1);
            return Ok(record);
        }

        metrics::counter!("flight_lookups_total", "source" => "upstream").increment(1);
        self.fetch_and_store(key).await
    }

    async fn find_unique(&self, key: &NaturalKey) -> Result<Option<FlightRecord>, FlightError> {
        let mut matches = self.store.find_flights_by_natural_key(key).await?;

        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => {
                warn!(matches = n, "Natural key {} matches several rows", key);
                Err(FlightError::Conflict)
            }
        }
    }

    async fn fetch_and_store(&self, key: &NaturalKey) -> Result<FlightRecord, FlightError> {
        let response = self.fetcher.fetch(key).await.map_err(|e| match e {
            FetchError::TimedOut(seconds) => FlightError::Timeout(seconds),
            FetchError::Failed(cause) => FlightError::Internal(cause.to_string()),
        })?;

        if response.is_server_fault() {
            return Err(FlightError::Upstream);
        }
        if !response.is_success() {
            return Err(FlightError::NotFound);
        }

        let document = response
            .document
            .filter(|doc| !is_empty_document(doc))
            .ok_or(FlightError::NoData)?;

        match self.store.create_flight(key, document).await? {
            CreateOutcome::Created(record) => Ok(record),
            CreateOutcome::Duplicate => {
                // A concurrent lookup stored the same flight first; serve its row.
                info!("Flight {} was stored concurrently, using existing row", key);
                self.find_unique(key).await?.ok_or_else(|| {
                    FlightError::Internal(format!("flight {key} vanished after duplicate insert"))
                })
            }
        }
    }

    /// Cache read-through keyed by pk. `known` is used as the value to cache
    /// on a miss instead of a database read.
    async fn retrieve_with(
        &self,
        pk: i32,
        known: Option<FlightRecord>,
    ) -> Result<FlightRecord, FlightError> {
        let key = self.cache.key(pk);
        let store = &self.store;

        let record = self
            .cache
            .get_or_set(&key, || async move {
                match known {
                    Some(record) => Ok(record),
                    None => store
                        .get_flight(pk)
                        .await?
                        .ok_or(FlightError::RecordNotFound(pk)),
                }
            })
            .await?;

        if !self.refresh_on_read {
            return Ok(record);
        }

        match self.store.refresh_flight(&record).await? {
            Some(fresh) => {
                if fresh != record {
                    debug!(pk, "Cached flight was stale, refreshing entry");
                    self.cache.set(&key, &fresh).await;
                }
                Ok(fresh)
            }
            None => {
                self.cache.delete(&key).await;
                Err(FlightError::RecordNotFound(pk))
            }
        }
    }
}

/// Null, `false`, zero, `{}`, `[]` and `""` carry no flight data.
fn is_empty_document(doc: &serde_json::Value) -> bool {
    match doc {
        serde_json::Value::Null => true,
        serde_json::Value::Bool(b) => !b,
        serde_json::Value::Number(n) => n.as_f64() == Some(0.0),
        serde_json::Value::Object(map) => map.is_empty(),
        serde_json::Value::Array(items) => items.is_empty(),
        serde_json::Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[async_trait]
impl FlightService for SeaOrmFlightService {
    async fn lookup(&self, key: &NaturalKey) -> Result<FlightRecord, FlightError> {
        let result = async {
            let record = self.resolve(key).await?;
            self.retrieve_with(record.pk, Some(record)).await
        }
        .await;

        result.map_err(FlightError::into_lookup_error)
    }

    async fn retrieve(&self, pk: i32) -> Result<FlightRecord, FlightError> {
        self.retrieve_with(pk, None).await
    }

    async fn create(
        &self,
        key: NaturalKey,
        extra_data: serde_json::Value,
    ) -> Result<FlightRecord, FlightError> {
        match self.store.create_flight(&key, extra_data).await? {
            CreateOutcome::Created(record) => {
                self.cache.set(&self.cache.key(record.pk), &record).await;
                Ok(record)
            }
            CreateOutcome::Duplicate => Err(FlightError::AlreadyExists(key.to_string())),
        }
    }

    async fn update(
        &self,
        pk: i32,
        extra_data: serde_json::Value,
    ) -> Result<FlightRecord, FlightError> {
        let updated = self
            .store
            .update_flight_data(pk, extra_data)
            .await?
            .ok_or(FlightError::RecordNotFound(pk))?;

        let key = self.cache.key(pk);
        if self.cache.contains(&key).await {
            self.cache.set(&key, &updated).await;
        }

        Ok(updated)
    }

    async fn delete(&self, pk: i32) -> Result<(), FlightError> {
        let deleted = self.store.delete_flight(pk).await?;
        self.cache.delete(&self.cache.key(pk)).await;

        if deleted {
            info!(pk, "Deleted flight");
            Ok(())
        } else {
            Err(FlightError::RecordNotFound(pk))
        }
    }

    async fn list(&self, limit: u64) -> Result<Vec<FlightRecord>, FlightError> {
        Ok(self.store.list_flights(limit).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::clients::FetchResponse;
    use crate::db::tests::temp_store;
    use crate::services::fetcher::FlightFetcher;
    use chrono::NaiveDate;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    enum Reply {
        Document(serde_json::Value),
        Status(u16),
        Fail(&'static str),
    }

    struct StubFetcher {
        reply: Reply,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn new(reply: Reply) -> Arc<Self> {
            Self::delayed(reply, Duration::ZERO)
        }

        fn delayed(reply: Reply, delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply,
                delay,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FlightFetcher for StubFetcher {
        async fn fetch(&self, _key: &NaturalKey) -> anyhow::Result<FetchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match &self.reply {
                Reply::Document(doc) => Ok(FetchResponse {
                    status: 200,
                    document: Some(doc.clone()),
                }),
                Reply::Status(status) => Ok(FetchResponse {
                    status: *status,
                    document: None,
                }),
                Reply::Fail(msg) => Err(anyhow::anyhow!(*msg)),
            }
        }
    }

    fn key() -> NaturalKey {
        NaturalKey::new("AA", "100", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    fn document() -> serde_json::Value {
        serde_json::json!({
            "resultHeader": {"departureAirportFS": "JFK", "arrivalAirportFS": "LHR"},
            "status": {"status": "Scheduled"}
        })
    }

    fn cache() -> CacheLayer {
        CacheLayer::new(
            Arc::new(MemoryCache::new(100)),
            "flight",
            Duration::from_secs(60),
        )
    }

    async fn service(fetcher: Arc<StubFetcher>, cache: CacheLayer) -> (SeaOrmFlightService, Store) {
        let store = temp_store().await;
        let service = SeaOrmFlightService::new(
            store.clone(),
            cache,
            FetchStrategy::immediate(fetcher),
            true,
        );
        (service, store)
    }

    #[tokio::test]
    async fn test_lookup_miss_fetches_and_stores_once() {
        let fetcher = StubFetcher::new(Reply::Document(document()));
        let (service, store) = service(fetcher.clone(), cache()).await;

        let record = service.lookup(&key()).await.unwrap();

        assert_eq!(record.airline_code, "AA");
        assert_eq!(record.flight_number, "100");
        assert_eq!(record.extra_data, document());
        assert_eq!(fetcher.calls(), 1);
        assert_eq!(store.count_flights().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_repeat_lookup_is_served_without_fetching() {
        let fetcher = StubFetcher::new(Reply::Document(document()));
        let (service, _store) = service(fetcher.clone(), cache()).await;

        let first = service.lookup(&key()).await.unwrap();
        let second = service.lookup(&key()).await.unwrap();

        assert_eq!(first.pk, second.pk);
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_existing_record_is_returned_unchanged() {
        let fetcher = StubFetcher::new(Reply::Fail("must not be called"));
        let (service, store) = service(fetcher.clone(), cache()).await;

        let CreateOutcome::Created(existing) = store
            .create_flight(&key(), serde_json::json!({"stored": true}))
            .await
            .unwrap()
        else {
            panic!("expected insert");
        };

        let record = service.lookup(&key()).await.unwrap();
        assert_eq!(record, existing);
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_several_stored_rows_are_a_conflict() {
        use sea_orm::ConnectionTrait;

        let fetcher = StubFetcher::new(Reply::Document(document()));
        let (service, store) = service(fetcher.clone(), cache()).await;

        store
            .conn
            .execute_unprepared("DROP INDEX idx_flights_natural_key")
            .await
            .unwrap();
        for n in 0..2 {
            let outcome = store
                .create_flight(&key(), serde_json::json!({"copy": n}))
                .await
                .unwrap();
            assert!(matches!(outcome, CreateOutcome::Created(_)));
        }

        let err = service.lookup(&key()).await.unwrap_err();
        assert!(matches!(err, FlightError::Conflict));
        assert_eq!(
            err.to_string(),
            "Multiple flights found with the provided parameters. Please refine your search."
        );
        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_falsy_document_is_no_data() {
        let fetcher = StubFetcher::new(Reply::Document(serde_json::json!(false)));
        let (service, store) = service(fetcher, cache()).await;

        let err = service.lookup(&key()).await.unwrap_err();
        assert!(matches!(err, FlightError::NoData));
        assert_eq!(store.count_flights().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upstream_status_mapping() {
        for (status, expected) in [(500, "External API error."), (404, "No flight found")] {
            let fetcher = StubFetcher::new(Reply::Status(status));
            let (service, store) = service(fetcher, cache()).await;

            let err = service.lookup(&key()).await.unwrap_err();
            assert!(err.to_string().contains(expected), "{status}: {err}");
            assert_eq!(store.count_flights().await.unwrap(), 0);
        }
    }

    #[tokio::test]
    async fn test_empty_document_is_no_data() {
        let fetcher = StubFetcher::new(Reply::Document(serde_json::json!({})));
        let (service, store) = service(fetcher, cache()).await;

        let err = service.lookup(&key()).await.unwrap_err();
        assert!(matches!(err, FlightError::NoData));
        assert!(err.to_string().contains("No flight data found"));
        assert_eq!(store.count_flights().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_transport_fault_is_wrapped_with_cause() {
        let fetcher = StubFetcher::new(Reply::Fail("Service Unavailable"));
        let (service, store) = service(fetcher, cache()).await;

        let err = service.lookup(&key()).await.unwrap_err();
        assert!(matches!(err, FlightError::Internal(_)));
        assert!(err.to_string().contains("Service Unavailable"));
        assert_eq!(store.count_flights().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deferred_timeout_surfaces_as_timeout() {
        let fetcher = StubFetcher::delayed(Reply::Document(document()), Duration::from_millis(300));
        let store = temp_store().await;
        let service = SeaOrmFlightService::new(
            store.clone(),
            cache(),
            FetchStrategy::deferred(fetcher, Duration::from_millis(50)),
            true,
        );

        let err = service.lookup(&key()).await.unwrap_err();
        assert!(matches!(err, FlightError::Timeout(_)));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(store.count_flights().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_first_lookups_share_one_record() {
        let fetcher = StubFetcher::delayed(Reply::Document(document()), Duration::from_millis(50));
        let (service, store) = service(fetcher.clone(), cache()).await;

        let k = key();
        let (a, b) = tokio::join!(service.lookup(&k), service.lookup(&k));

        assert_eq!(a.unwrap().pk, b.unwrap().pk);
        assert_eq!(store.count_flights().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_refreshes_cached_copy() {
        let fetcher = StubFetcher::new(Reply::Document(document()));
        let cache = cache();
        let store = temp_store().await;
        let service = SeaOrmFlightService::new(
            store.clone(),
            cache.clone(),
            FetchStrategy::immediate(fetcher),
            false,
        );

        let record = service.lookup(&key()).await.unwrap();
        assert!(cache.contains(&cache.key(record.pk)).await);

        let payload = serde_json::json!({"status": {"status": "Landed"}});
        service.update(record.pk, payload.clone()).await.unwrap();

        let fetched = service.retrieve(record.pk).await.unwrap();
        assert_eq!(fetched.extra_data, payload);
    }

    #[tokio::test]
    async fn test_update_does_not_populate_cache() {
        let fetcher = StubFetcher::new(Reply::Fail("unused"));
        let cache = cache();
        let (service, _store) = service(fetcher, cache.clone()).await;

        let created = service
            .create(key(), serde_json::json!({"v": 1}))
            .await
            .unwrap();
        cache.delete(&cache.key(created.pk)).await;

        service
            .update(created.pk, serde_json::json!({"v": 2}))
            .await
            .unwrap();
        assert!(!cache.contains(&cache.key(created.pk)).await);
    }

    #[tokio::test]
    async fn test_delete_evicts_and_retrieve_reports_not_found() {
        let fetcher = StubFetcher::new(Reply::Document(document()));
        let cache = cache();
        let (service, _store) = service(fetcher, cache.clone()).await;

        let record = service.lookup(&key()).await.unwrap();
        service.delete(record.pk).await.unwrap();

        assert!(!cache.contains(&cache.key(record.pk)).await);
        assert!(matches!(
            service.retrieve(record.pk).await.unwrap_err(),
            FlightError::RecordNotFound(_)
        ));
        assert!(matches!(
            service.delete(record.pk).await.unwrap_err(),
            FlightError::RecordNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_create_writes_through_and_rejects_duplicates() {
        let fetcher = StubFetcher::new(Reply::Fail("unused"));
        let cache = cache();
        let (service, _store) = service(fetcher, cache.clone()).await;

        let record = service.create(key(), serde_json::json!({})).await.unwrap();
        assert!(cache.contains(&cache.key(record.pk)).await);

        let err = service.create(key(), serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, FlightError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn test_works_without_cache() {
        let fetcher = StubFetcher::new(Reply::Document(document()));
        let (service, _store) = service(fetcher.clone(), CacheLayer::disabled("flight")).await;

        let first = service.lookup(&key()).await.unwrap();
        let second = service.retrieve(first.pk).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_empty_documents() {
        assert!(is_empty_document(&serde_json::Value::Null));
        assert!(is_empty_document(&serde_json::json!({})));
        assert!(is_empty_document(&serde_json::json!([])));
        assert!(is_empty_document(&serde_json::json!(false)));
        assert!(is_empty_document(&serde_json::json!(0)));
        assert!(is_empty_document(&serde_json::json!(0.0)));
        assert!(!is_empty_document(&serde_json::json!(true)));
        assert!(!is_empty_document(&serde_json::json!(7)));
        assert!(!is_empty_document(&serde_json::json!({"flightId": 1})));
    }
}
