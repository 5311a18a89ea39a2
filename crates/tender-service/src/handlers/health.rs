//! Health check handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
    /// Drivers whose routes are mounted.
    pub drivers: Vec<String>,
}

/// Health check endpoint.
pub async fn health(State(drivers): State<Arc<[String]>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        drivers: drivers.to_vec(),
    })
}
