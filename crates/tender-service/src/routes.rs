//! Router configuration.
//!
//! Drivers install their routes on a [`RouteInstaller`] while being opened;
//! the host then turns the installer into the service router with
//! [`create_router`], which adds the health check and global middleware.

use std::sync::Arc;
use std::time::Duration;

use axum::routing::get;
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use tender_core::{PaymentError, Result};

use crate::config::ServiceConfig;
use crate::handlers::health;

/// Maximum concurrent requests for driver routes.
const API_MAX_CONCURRENT_REQUESTS: usize = 50;

/// Collects the routes drivers install while being opened.
///
/// The card routes are a single surface: only one driver may own them.
#[derive(Debug, Default)]
pub struct RouteInstaller {
    router: Router,
    installed: Vec<String>,
}

impl RouteInstaller {
    /// Create an empty installer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `routes` on behalf of `driver`.
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::Configuration` if another driver already
    /// installed its routes.
    pub fn install(&mut self, driver: &str, routes: Router) -> Result<()> {
        if let Some(owner) = self.installed.first() {
            return Err(PaymentError::Configuration(format!(
                "card routes already installed by driver '{owner}', cannot install for '{driver}'"
            )));
        }

        tracing::debug!(driver = %driver, "Installing driver routes");
        self.router = std::mem::take(&mut self.router).merge(routes);
        self.installed.push(driver.to_string());
        Ok(())
    }

    /// Names of drivers that installed routes.
    #[must_use]
    pub fn installed(&self) -> &[String] {
        &self.installed
    }
}

/// Create the service router with all installed routes and middleware.
///
/// # Routes
///
/// ## Public
/// - `GET /health` - Health check
///
/// ## Installed by the open driver
/// - `POST /api/cards` - Save a card
/// - `DELETE /api/cards` - Delete a card
pub fn create_router(routes: RouteInstaller, config: &ServiceConfig) -> Router {
    let cors = build_cors_layer(&config.cors_origins);
    let drivers: Arc<[String]> = routes.installed.into();

    let api_routes = routes
        .router
        .layer(ConcurrencyLimitLayer::new(API_MAX_CONCURRENT_REQUESTS));

    Router::new()
        // Health (public, no rate limit)
        .route("/health", get(health::health))
        .with_state(drivers)
        .merge(api_routes)
        // Global middleware
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(config.max_body_bytes))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.request_timeout_seconds,
        )))
}

/// Build the CORS layer from configured origins.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
