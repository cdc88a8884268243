//! Route gateway: merges every endpoint's subrouter and attaches shared state.
//!
//! Handlers are thin: they decode requests, call into `ingest` and
//! `analytics`, and shape JSON responses. No computation lives here.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json, Router};
use serde_json::json;

use crate::Config;

mod health;
mod heatmap;
mod predict;
mod sensors;
mod stats;

/// State shared by all handlers: an HTTP client for upstream fetches and the
/// configuration snapshot.
pub type AppState = (reqwest::Client, Config);

// ---

pub fn router(client: reqwest::Client, config: Config) -> Router {
    // ---
    Router::new()
        .merge(sensors::router())
        .merge(stats::router())
        .merge(predict::router())
        .merge(heatmap::router())
        .merge(health::router())
        .with_state((client, config))
}

/// JSON `{"error": message}` body with the given status.
fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    // ---
    (status, Json(json!({ "error": message.into() }))).into_response()
}
