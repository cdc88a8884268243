// src/routes/health.rs
//! Liveness endpoint for the analytics service.
//!
//! `GET /health` answers without touching the realtime database or the CSV
//! export, so orchestrators can check the process cheaply. It also reports
//! how many fixed sensor sites the service interpolates over.

use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::SENSOR_SITES;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    sensors: usize,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sensors: SENSOR_SITES.len(),
    })
}

/// Subrouter with `GET /health`, generic over the gateway's state type.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}
