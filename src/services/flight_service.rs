//! Domain service for flight status records.
//!
//! Resolves natural-key lookups against the database and the external
//! provider, and keeps the record cache in step with every mutation.

use crate::models::{FlightRecord, NaturalKey};
use thiserror::Error;

/// Errors surfaced by flight operations.
#[derive(Debug, Error)]
pub enum FlightError {
    /// More than one stored row matches a natural key.
    #[error("Multiple flights found with the provided parameters. Please refine your search.")]
    Conflict,

    /// The provider answered with a non-success status.
    #[error("No flight found with the provided parameters.")]
    NotFound,

    /// The provider reported a server fault.
    #[error("External API error.")]
    Upstream,

    /// The provider answered successfully with nothing usable.
    #[error("No flight data found.")]
    NoData,

    #[error("Timed out after {0}s waiting for flight details.")]
    Timeout(u64),

    #[error("An error occurred while fetching flight details: {0}")]
    Internal(String),

    #[error("Flight {0} not found")]
    RecordNotFound(i32),

    #[error("A flight already exists for {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for FlightError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for FlightError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

impl FlightError {
    /// Lookup failures are all reported as client-visible errors; anything
    /// unexpected is wrapped with its cause.
    #[must_use]
    pub fn into_lookup_error(self) -> Self {
        match self {
            Self::Database(cause) => Self::Internal(cause),
            other => other,
        }
    }
}

#[async_trait::async_trait]
pub trait FlightService: Send + Sync {
    /// Resolves a natural key to exactly one record, fetching and storing it
    /// on first sight. The result is served through the record cache.
    async fn lookup(&self, key: &NaturalKey) -> Result<FlightRecord, FlightError>;

    /// Gets a record by primary key through the record cache.
    async fn retrieve(&self, pk: i32) -> Result<FlightRecord, FlightError>;

    /// Stores a new record and writes it through to the cache.
    async fn create(
        &self,
        key: NaturalKey,
        extra_data: serde_json::Value,
    ) -> Result<FlightRecord, FlightError>;

    /// Replaces a record's payload. A cached copy is refreshed; an uncached
    /// record stays uncached.
    async fn update(
        &self,
        pk: i32,
        extra_data: serde_json::Value,
    ) -> Result<FlightRecord, FlightError>;

    /// Deletes a record and evicts its cache entry.
    async fn delete(&self, pk: i32) -> Result<(), FlightError>;

    /// Most recently updated records first. Never cached.
    async fn list(&self, limit: u64) -> Result<Vec<FlightRecord>, FlightError>;
}
