//! Beacon API server entry point.

use std::sync::Arc;

use beacon_api::config::AppConfig;
use beacon_api::error::AppError;
use beacon_api::state::{AppState, Repositories};
use beacon_api::{app, telemetry};
use beacon_core::clock::SystemClock;
use sqlx::postgres::PgPoolOptions;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let config = AppConfig::from_env()?;
    let tracer_provider = telemetry::init(config.otlp_endpoint.as_deref())?;

    info!(assist_provider = %config.assist_provider, "Starting Beacon API server");

    // Create database connection pool.
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;

    if config.run_migrations {
        beacon_store::MIGRATOR.run(&pool).await?;
        info!("database migrations applied");
    }

    let app_state = AppState::new(
        pool.clone(),
        Arc::new(SystemClock),
        Repositories::postgres(&pool),
        config.assist_provider.build(),
    );

    let addr = config.socket_addr()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app(app_state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    pool.close().await;
    telemetry::shutdown(tracer_provider);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
