pub mod flight_api;

pub use flight_api::{FetchResponse, FlightApiClient};
