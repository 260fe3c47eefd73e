use chrono::NaiveDate;

use super::ApiError;
use crate::models::NaturalKey;
use crate::models::flight::DEPARTURE_DATE_FORMAT;

pub const MISSING_LOOKUP_PARAMS: &str = "Missing required query parameters: airline, flight_number, and departure_date are all required.";

pub const INVALID_DEPARTURE_DATE: &str =
    "Invalid date format for departure_date. Use 'YYYY-MM-DD'.";

pub const MISSING_FLIGHT_FIELDS: &str =
    "Missing required fields: airline_code, flight_number, and departure_date are all required.";

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

fn natural_key(
    airline: Option<&str>,
    flight_number: Option<&str>,
    departure_date: Option<&str>,
    missing: &'static str,
) -> Result<NaturalKey, ApiError> {
    let (Some(airline), Some(flight_number), Some(departure_date)) = (
        present(airline),
        present(flight_number),
        present(departure_date),
    ) else {
        return Err(ApiError::validation(missing));
    };

    let date = NaiveDate::parse_from_str(departure_date, DEPARTURE_DATE_FORMAT)
        .map_err(|_| ApiError::validation(INVALID_DEPARTURE_DATE))?;

    Ok(NaturalKey::new(airline, flight_number, date))
}

/// All three query parameters are required and must be non-empty; the date
/// must be `YYYY-MM-DD`.
pub fn validate_lookup_params(
    airline: Option<&str>,
    flight_number: Option<&str>,
    departure_date: Option<&str>,
) -> Result<NaturalKey, ApiError> {
    natural_key(airline, flight_number, departure_date, MISSING_LOOKUP_PARAMS)
}

/// Same rules for a JSON create body.
pub fn validate_flight_fields(
    airline_code: &str,
    flight_number: &str,
    departure_date: &str,
) -> Result<NaturalKey, ApiError> {
    natural_key(
        Some(airline_code),
        Some(flight_number),
        Some(departure_date),
        MISSING_FLIGHT_FIELDS,
    )
}

pub fn validate_flight_pk(pk: i32) -> Result<i32, ApiError> {
    if pk <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid flight ID: {}. ID must be a positive integer",
            pk
        )));
    }
    Ok(pk)
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 1000;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {}. Limit must be between {} and {}",
            limit, MIN_LIMIT, MAX_LIMIT
        )));
    }
    Ok(limit)
}
