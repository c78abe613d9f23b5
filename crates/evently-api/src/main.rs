//! Evently API server entry point.

use std::sync::Arc;

use evently_api::config::AppConfig;
use evently_api::error::AppError;
use evently_api::state::AppState;
use evently_api::{app, telemetry};
use evently_catalog::application::facade::QueryFacade;
use evently_core::clock::{Clock, SystemClock};
use evently_core::connection::ConnectionManager;
use evently_media::BunnyStorage;
use evently_store::PgConnector;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let telemetry = telemetry::init()?;

    info!("Starting Evently API server");

    let config = AppConfig::from_env()?;

    let connector = Arc::new(PgConnector::new(
        config.database_max_connections,
        config.database_run_migrations,
    ));
    let connections = Arc::new(ConnectionManager::new(
        Some(config.database_url.clone()),
        connector,
    ));

    // Migrations must land before the first request; otherwise connect lazily.
    if config.database_run_migrations {
        connections.acquire().await.map_err(AppError::Database)?;
    }

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let facade = Arc::new(QueryFacade::new(connections, clock.clone()));
    let media = Arc::new(BunnyStorage::from_env());
    let app = app(
        AppState::new(facade, media, clock),
        config.max_upload_bytes,
    );

    let addr = config.socket_addr()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    telemetry.shutdown();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
