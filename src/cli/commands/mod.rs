mod delete;
mod get;
mod list;
mod lookup;

pub use delete::cmd_delete_flight;
pub use get::cmd_get_flight;
pub use list::cmd_list_flights;
pub use lookup::cmd_lookup_flight;

use crate::models::FlightRecord;

fn print_flight(record: &FlightRecord) -> anyhow::Result<()> {
    println!("Flight {}", record.natural_key());
    println!("{:-<60}", "");
    println!("ID:       {}", record.pk);
    println!("Airline:  {}", record.airline_code);
    println!("Number:   {}", record.flight_number);
    println!("Date:     {}", record.departure_date);
    println!("Created:  {}", record.created_at);
    println!("Updated:  {}", record.updated_at);
    println!();
    println!("{}", serde_json::to_string_pretty(&record.extra_data)?);
    Ok(())
}
