//! Tender Service - card onboarding and charging over a pluggable driver
//!
//! This is the main entry point for the tender service.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tender_service::{create_router, DriverRegistry, RouteInstaller, ServiceConfig};
use tender_store::{PgStore, Store};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tender=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Tender Service");

    let config = ServiceConfig::from_env();

    tracing::info!(
        listen_addr = %config.listen_addr,
        payment_driver = %config.payment_driver,
        stripe_configured = %config.stripe_access_token.is_some(),
        operation_timeout_seconds = config.operation_timeout_seconds,
        "Service configuration loaded"
    );

    // Initialize PostgreSQL store
    let pg = PgStore::connect(&config.database_url, config.database_max_connections).await?;
    pg.migrate().await?;
    let store: Arc<dyn Store> = Arc::new(pg);

    // Open the payment driver; it installs its card routes
    let mut registry = DriverRegistry::with_default_drivers();
    let mut routes = RouteInstaller::new();
    registry.open(
        &config.payment_driver,
        store,
        &mut routes,
        &config.driver_config(),
    )?;

    let app = create_router(routes, &config);
    tracing::info!(drivers = ?registry.names(), "Router configured");

    // Start HTTP server
    tracing::info!(listen_addr = %config.listen_addr, "Starting HTTP server");
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    registry.close_all().await?;
    tracing::info!("Tender Service stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
