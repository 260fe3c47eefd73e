use crate::models::{FlightRecord, NaturalKey};
use anyhow::Result;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::flight::CreateOutcome;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn flight_repo(&self) -> repositories::flight::FlightRepository {
        repositories::flight::FlightRepository::new(self.conn.clone())
    }

    pub async fn find_flights_by_natural_key(&self, key: &NaturalKey) -> Result<Vec<FlightRecord>> {
        self.flight_repo().find_by_natural_key(key).await
    }

    pub async fn create_flight(
        &self,
        key: &NaturalKey,
        extra_data: serde_json::Value,
    ) -> Result<CreateOutcome> {
        self.flight_repo().create(key, extra_data).await
    }

    pub async fn get_flight(&self, pk: i32) -> Result<Option<FlightRecord>> {
        self.flight_repo().get(pk).await
    }

    pub async fn refresh_flight(&self, record: &FlightRecord) -> Result<Option<FlightRecord>> {
        self.flight_repo().refresh(record).await
    }

    pub async fn update_flight_data(
        &self,
        pk: i32,
        extra_data: serde_json::Value,
    ) -> Result<Option<FlightRecord>> {
        self.flight_repo().update_extra_data(pk, extra_data).await
    }

    pub async fn delete_flight(&self, pk: i32) -> Result<bool> {
        self.flight_repo().delete(pk).await
    }

    pub async fn list_flights(&self, limit: u64) -> Result<Vec<FlightRecord>> {
        self.flight_repo().list(limit).await
    }

    pub async fn count_flights(&self) -> Result<u64> {
        self.flight_repo().count().await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;

    pub(crate) async fn temp_store() -> Store {
        let db_path =
            std::env::temp_dir().join(format!("flightstat-test-{}.db", uuid::Uuid::new_v4()));
        Store::with_pool_options(&format!("sqlite:{}", db_path.display()), 1, 1)
            .await
            .expect("failed to open test database")
    }

    fn key() -> NaturalKey {
        NaturalKey::new("AA", "100", NaiveDate::from_ymd_opt(2025, 6, 15).unwrap())
    }

    #[tokio::test]
    async fn test_create_and_find_by_natural_key() {
        let store = temp_store().await;

        let created = match store
            .create_flight(&key(), serde_json::json!({"status": "Scheduled"}))
            .await
            .unwrap()
        {
            CreateOutcome::Created(record) => record,
            CreateOutcome::Duplicate => panic!("first insert reported duplicate"),
        };

        let found = store.find_flights_by_natural_key(&key()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].pk, created.pk);
        assert_eq!(found[0].extra_data["status"], "Scheduled");
        assert_eq!(created.created_at, created.updated_at);
    }

    #[tokio::test]
    async fn test_unique_natural_key_reports_duplicate() {
        let store = temp_store().await;

        store
            .create_flight(&key(), serde_json::json!({}))
            .await
            .unwrap();
        let second = store
            .create_flight(&key(), serde_json::json!({"other": true}))
            .await
            .unwrap();

        assert!(matches!(second, CreateOutcome::Duplicate));
        assert_eq!(store.count_flights().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_replaces_payload_and_keeps_created_at() {
        let store = temp_store().await;

        let CreateOutcome::Created(record) = store
            .create_flight(&key(), serde_json::json!({"v": 1}))
            .await
            .unwrap()
        else {
            panic!("expected insert");
        };

        let updated = store
            .update_flight_data(record.pk, serde_json::json!({"v": 2}))
            .await
            .unwrap()
            .expect("row exists");

        assert_eq!(updated.pk, record.pk);
        assert_eq!(updated.extra_data, serde_json::json!({"v": 2}));
        assert_eq!(updated.created_at, record.created_at);
        assert!(updated.updated_at >= record.updated_at);

        assert!(
            store
                .update_flight_data(record.pk + 100, serde_json::json!({}))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_and_refresh() {
        let store = temp_store().await;

        let CreateOutcome::Created(record) = store
            .create_flight(&key(), serde_json::json!({}))
            .await
            .unwrap()
        else {
            panic!("expected insert");
        };

        assert!(store.refresh_flight(&record).await.unwrap().is_some());
        assert!(store.delete_flight(record.pk).await.unwrap());
        assert!(!store.delete_flight(record.pk).await.unwrap());
        assert!(store.refresh_flight(&record).await.unwrap().is_none());
        assert!(store.get_flight(record.pk).await.unwrap().is_none());
    }
}
