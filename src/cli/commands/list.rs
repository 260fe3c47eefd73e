//! List flights command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_list_flights(config: &Config, limit: u64) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let flights = store.list_flights(limit).await?;

    if flights.is_empty() {
        println!("No flights stored.");
        println!();
        println!("Look one up with: flightstat lookup AA 100 2025-06-15");
        return Ok(());
    }

    let total = store.count_flights().await?;
    println!("Stored Flights ({} of {} total)", flights.len(), total);
    println!("{:-<70}", "");

    for flight in flights {
        println!(
            "{:>6}  {} {:<8} {}  (updated {})",
            flight.pk,
            flight.airline_code,
            flight.flight_number,
            flight.departure_date,
            flight.updated_at
        );
    }

    Ok(())
}
