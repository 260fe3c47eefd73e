use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEPARTURE_DATE_FORMAT: &str = "%Y-%m-%d";

/// The (airline, flight number, departure date) triple that identifies a
/// single flight instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NaturalKey {
    pub airline_code: String,

    pub flight_number: String,

    pub departure_date: NaiveDate,
}

impl NaturalKey {
    pub fn new(
        airline_code: impl Into<String>,
        flight_number: impl Into<String>,
        departure_date: NaiveDate,
    ) -> Self {
        Self {
            airline_code: airline_code.into(),
            flight_number: flight_number.into(),
            departure_date,
        }
    }

    #[must_use]
    pub fn year(&self) -> String {
        format!("{:04}", self.departure_date.year())
    }

    #[must_use]
    pub fn month(&self) -> String {
        format!("{:02}", self.departure_date.month())
    }

    #[must_use]
    pub fn day(&self) -> String {
        format!("{:02}", self.departure_date.day())
    }

    #[must_use]
    pub fn date_string(&self) -> String {
        self.departure_date.format(DEPARTURE_DATE_FORMAT).to_string()
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} on {}",
            self.airline_code,
            self.flight_number,
            self.date_string()
        )
    }
}

/// A persisted flight status record.
///
/// The database is the source of truth; cached copies are serialized forms of
/// this struct keyed by `pk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightRecord {
    pub pk: i32,

    pub airline_code: String,

    pub flight_number: String,

    pub departure_date: NaiveDate,

    pub extra_data: serde_json::Value,

    pub created_at: String,

    pub updated_at: String,
}

impl FlightRecord {
    #[must_use]
    pub fn natural_key(&self) -> NaturalKey {
        NaturalKey::new(
            self.airline_code.clone(),
            self.flight_number.clone(),
            self.departure_date,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_parts_are_zero_padded() {
        let key = NaturalKey::new("AA", "100", NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
        assert_eq!(key.year(), "2025");
        assert_eq!(key.month(), "06");
        assert_eq!(key.day(), "05");
        assert_eq!(key.date_string(), "2025-06-05");
    }

    #[test]
    fn test_natural_key_display() {
        let key = NaturalKey::new("BA", "117", NaiveDate::from_ymd_opt(2025, 12, 24).unwrap());
        assert_eq!(key.to_string(), "BA 117 on 2025-12-24");
    }
}
