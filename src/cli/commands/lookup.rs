//! Lookup command handler

use chrono::NaiveDate;

use crate::config::Config;
use crate::models::NaturalKey;
use crate::models::flight::DEPARTURE_DATE_FORMAT;
use crate::state::SharedState;

pub async fn cmd_lookup_flight(
    config: Config,
    airline: &str,
    flight_number: &str,
    departure_date: &str,
) -> anyhow::Result<()> {
    let Ok(date) = NaiveDate::parse_from_str(departure_date, DEPARTURE_DATE_FORMAT) else {
        println!("Invalid date format for departure_date. Use 'YYYY-MM-DD'.");
        return Ok(());
    };

    let state = SharedState::new(config).await?;
    let key = NaturalKey::new(airline, flight_number, date);

    match state.flight_service.lookup(&key).await {
        Ok(record) => super::print_flight(&record)?,
        Err(e) => println!("Lookup failed for {key}: {e}"),
    }

    Ok(())
}
