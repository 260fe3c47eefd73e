use crate::entities::{flights, prelude::*};
use crate::models::{FlightRecord, NaturalKey};
use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr,
};
use tracing::{debug, info};

/// Outcome of inserting a new flight row.
#[derive(Debug, Clone)]
pub enum CreateOutcome {
    Created(FlightRecord),
    /// The unique natural-key index rejected the insert.
    Duplicate,
}

/// Repository for flight record persistence
pub struct FlightRepository {
    conn: DatabaseConnection,
}

impl FlightRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(m: flights::Model) -> FlightRecord {
        FlightRecord {
            pk: m.id,
            airline_code: m.airline_code,
            flight_number: m.flight_number,
            departure_date: m.departure_date,
            extra_data: m.extra_data,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }

    pub async fn find_by_natural_key(&self, key: &NaturalKey) -> Result<Vec<FlightRecord>> {
        let rows = Flights::find()
            .filter(flights::Column::AirlineCode.eq(key.airline_code.as_str()))
            .filter(flights::Column::FlightNumber.eq(key.flight_number.as_str()))
            .filter(flights::Column::DepartureDate.eq(key.departure_date))
            .order_by_asc(flights::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn create(
        &self,
        key: &NaturalKey,
        extra_data: serde_json::Value,
    ) -> Result<CreateOutcome> {
        let now = chrono::Utc::now().to_rfc3339();

        let active_model = flights::ActiveModel {
            airline_code: Set(key.airline_code.clone()),
            flight_number: Set(key.flight_number.clone()),
            departure_date: Set(key.departure_date),
            extra_data: Set(extra_data),
            created_at: Set(now.clone()),
            updated_at: Set(now),
            ..Default::default()
        };

        match active_model.insert(&self.conn).await {
            Ok(model) => {
                info!(pk = model.id, "Stored flight {}", key);
                Ok(CreateOutcome::Created(Self::map_model(model)))
            }
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(detail)) => {
                    debug!(%detail, "Flight {} already stored", key);
                    Ok(CreateOutcome::Duplicate)
                }
                _ => Err(e.into()),
            },
        }
    }

    pub async fn get(&self, pk: i32) -> Result<Option<FlightRecord>> {
        let row = Flights::find_by_id(pk).one(&self.conn).await?;
        Ok(row.map(Self::map_model))
    }

    /// Re-reads the latest persisted state for a copy that may be stale.
    pub async fn refresh(&self, record: &FlightRecord) -> Result<Option<FlightRecord>> {
        self.get(record.pk).await
    }

    /// Replaces the payload and bumps `updated_at`. Returns `None` when the
    /// row does not exist.
    pub async fn update_extra_data(
        &self,
        pk: i32,
        extra_data: serde_json::Value,
    ) -> Result<Option<FlightRecord>> {
        let Some(model) = Flights::find_by_id(pk).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active_model = model.into_active_model();
        active_model.extra_data = Set(extra_data);
        active_model.updated_at = Set(chrono::Utc::now().to_rfc3339());

        let updated = active_model.update(&self.conn).await?;
        info!(pk = pk, "Updated flight payload");
        Ok(Some(Self::map_model(updated)))
    }

    pub async fn delete(&self, pk: i32) -> Result<bool> {
        let result = Flights::delete_by_id(pk).exec(&self.conn).await?;
        Ok(result.rows_affected > 0)
    }

    pub async fn list(&self, limit: u64) -> Result<Vec<FlightRecord>> {
        let rows = Flights::find()
            .order_by_desc(flights::Column::UpdatedAt)
            .order_by_desc(flights::Column::Id)
            .limit(limit)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(Flights::find().count(&self.conn).await?)
    }
}
