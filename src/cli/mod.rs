//! CLI module - Command-line interface for flightstat
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// flightstat - flight status lookup service
/// Serves flight records from a database and cache, fetching unknown flights
/// from an external provider
#[derive(Parser)]
#[command(name = "flightstat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "daemon", alias = "web")]
    Serve,

    /// Look up a flight by airline, flight number and departure date
    #[command(alias = "l")]
    Lookup {
        /// Airline code, e.g. AA
        airline: String,
        /// Flight number, e.g. 100
        flight_number: String,
        /// Departure date as YYYY-MM-DD
        departure_date: String,
    },

    /// Show a stored flight by ID
    #[command(alias = "show")]
    Get {
        /// Flight ID
        pk: String,
    },

    /// List stored flights, most recently updated first
    #[command(alias = "ls")]
    List {
        /// Number of entries to show
        #[arg(default_value = "20")]
        limit: u64,
    },

    /// Delete a stored flight
    #[command(alias = "rm")]
    Delete {
        /// Flight ID
        pk: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Create default config file
    #[command(alias = "--init")]
    Init,
}

pub use commands::*;
