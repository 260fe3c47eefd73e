pub mod prelude;

pub mod flights;
