use crate::config::Config;
use crate::services::FlightError;
use crate::state::SharedState;

pub async fn cmd_delete_flight(config: Config, pk_str: &str, yes: bool) -> anyhow::Result<()> {
    let Ok(pk) = pk_str.parse::<i32>() else {
        println!("Invalid flight ID: {pk_str}");
        println!("Use 'flightstat list' to see flight IDs.");
        return Ok(());
    };

    let state = SharedState::new(config).await?;

    let Some(flight) = state.store.get_flight(pk).await? else {
        println!("Flight with ID {pk} not found.");
        return Ok(());
    };

    if !yes {
        println!("Delete flight {} (ID: {})?", flight.natural_key(), flight.pk);
        println!("Enter 'y' to confirm, anything else to cancel:");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Cancelled.");
            return Ok(());
        }
    }

    // Through the service so the cache entry is evicted too.
    match state.flight_service.delete(pk).await {
        Ok(()) => println!("✓ Deleted: {}", flight.natural_key()),
        Err(FlightError::RecordNotFound(_)) => println!("Flight was already deleted."),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
