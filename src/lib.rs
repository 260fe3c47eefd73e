pub mod api;
pub mod cache;
pub mod cli;
pub mod clients;
pub mod config;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;
use tokio::signal;

use anyhow::Context;
use clap::Parser;
use cli::{Cli, Commands};
pub use config::Config;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Some(Commands::Init)) {
        if Config::create_default_if_missing()? {
            println!("✓ Config file created. Edit config.toml and run again.");
        } else {
            println!("Config file already exists.");
        }
        return Ok(());
    }

    let config = Config::load()?;
    config.validate()?;

    let prometheus_handle = if config.observability.metrics_enabled {
        use metrics_exporter_prometheus::PrometheusBuilder;
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .context("Failed to install Prometheus recorder")?;
        Some(handle)
    } else {
        None
    };

    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    if prometheus_handle.is_some() {
        info!("Prometheus metrics recorder initialized");
    }

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_daemon(config, prometheus_handle).await,
        Commands::Lookup {
            airline,
            flight_number,
            departure_date,
        } => cli::cmd_lookup_flight(config, &airline, &flight_number, &departure_date).await,
        Commands::Get { pk } => cli::cmd_get_flight(config, &pk).await,
        Commands::List { limit } => cli::cmd_list_flights(&config, limit).await,
        Commands::Delete { pk, yes } => cli::cmd_delete_flight(config, &pk, yes).await,
        Commands::Init => Ok(()),
    }
}

async fn run_daemon(
    config: Config,
    prometheus_handle: Option<metrics_exporter_prometheus::PrometheusHandle>,
) -> anyhow::Result<()> {
    info!(
        "flightstat v{} starting (fetch mode: {}, cache: {})",
        env!("CARGO_PKG_VERSION"),
        config.flight_api.fetch_mode.as_str(),
        if config.cache.enabled {
            config.cache.backend.as_str()
        } else {
            "disabled"
        }
    );

    if !config.server.enabled {
        info!("Web API disabled in config; nothing to serve");
        return Ok(());
    }

    let port = config.server.port;
    let api_state = api::create_app_state_from_config(config, prometheus_handle).await?;
    let app = api::router(Arc::clone(&api_state));

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("🌐 Web Server running at http://0.0.0.0:{}", port);

    let server = axum::serve(listener, app).with_graceful_shutdown(async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(e) => error!("Error listening for shutdown: {}", e),
        }
    });

    if let Err(e) = server.await {
        error!("Web server error: {}", e);
    }

    info!("Server stopped");
    Ok(())
}
