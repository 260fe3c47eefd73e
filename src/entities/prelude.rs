pub use super::flights::Entity as Flights;
