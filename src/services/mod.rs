pub mod fetcher;
pub use fetcher::{FetchError, FetchStrategy, FlightFetcher};

pub mod flight_service;
pub use flight_service::{FlightError, FlightService};

pub mod flight_service_impl;
pub use flight_service_impl::SeaOrmFlightService;
