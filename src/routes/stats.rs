use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{error_response, AppState};
use crate::analytics::compute_statistics;
use crate::{Metric, MetricStatistic, Reading};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/sensors/stats", post(handler))
}

#[derive(Debug, Deserialize)]
struct StatsRequest {
    data: Vec<Reading>,
    /// Metrics to summarise; every tracked metric when omitted.
    metrics: Option<Vec<Metric>>,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    success: bool,
    statistics: Vec<MetricStatistic>,
}

async fn handler(Json(request): Json<StatsRequest>) -> impl IntoResponse {
    // ---
    let metrics = request.metrics.unwrap_or_else(|| Metric::ALL.to_vec());
    if metrics.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "At least one metric is required");
    }

    info!(
        "POST /api/sensors/stats - {} readings, {} metrics",
        request.data.len(),
        metrics.len()
    );

    let statistics = compute_statistics(&request.data, &metrics);
    (
        StatusCode::OK,
        Json(StatsResponse {
            success: true,
            statistics,
        }),
    )
        .into_response()
}
