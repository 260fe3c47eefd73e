pub mod flight;

pub use flight::{FlightRecord, NaturalKey};
