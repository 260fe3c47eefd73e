use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::FlightRecord;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FlightDto {
    pub pk: i32,
    pub airline_code: String,
    pub flight_number: String,
    pub departure_date: NaiveDate,
    pub extra_data: serde_json::Value,
}

impl From<FlightRecord> for FlightDto {
    fn from(record: FlightRecord) -> Self {
        Self {
            pk: record.pk,
            airline_code: record.airline_code,
            flight_number: record.flight_number,
            departure_date: record.departure_date,
            extra_data: record.extra_data,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: String,
    pub uptime: u64,
    pub database: bool,
    pub cache: CacheStatusDto,
    pub fetch_mode: String,
    pub stored_flights: u64,
}

#[derive(Debug, Serialize)]
pub struct CacheStatusDto {
    pub enabled: bool,
    pub provider: String,
    pub healthy: bool,
    pub ttl_seconds: u64,
}
