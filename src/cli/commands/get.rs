use crate::config::Config;
use crate::services::FlightError;
use crate::state::SharedState;

pub async fn cmd_get_flight(config: Config, pk_str: &str) -> anyhow::Result<()> {
    let Ok(pk) = pk_str.parse::<i32>() else {
        println!("Invalid flight ID: {pk_str}");
        println!("Use 'flightstat list' to see flight IDs.");
        return Ok(());
    };

    let state = SharedState::new(config).await?;

    match state.flight_service.retrieve(pk).await {
        Ok(record) => super::print_flight(&record)?,
        Err(FlightError::RecordNotFound(_)) => println!("Flight with ID {pk} not found."),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
