use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, routing::get, Json,
    Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{error_response, AppState};
use crate::ingest::{
    count_raw_readings, fetch_device_tree, filter_complete_timestamps, normalize_device_tree,
    sample_readings,
};
use crate::Reading;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/sensors", get(handler))
}

/// Query parameters for `GET /api/sensors`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SensorsQuery {
    /// Keep only time-slices reported by all three devices.
    #[serde(default)]
    filter_complete: bool,
    /// Evenly sample the result down to at most this many readings.
    max_rows: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SensorsResponse {
    success: bool,
    data: Vec<Reading>,
    raw_readings: usize,
    total_records: usize,
    filtered_records: usize,
    is_filtered: bool,
    timestamp: DateTime<Utc>,
}

async fn handler(
    Query(params): Query<SensorsQuery>,
    State((client, config)): State<AppState>,
) -> impl IntoResponse {
    // ---
    info!("GET /api/sensors - filterComplete={}", params.filter_complete);

    // Step 1: Fetch the raw device tree
    debug!("GET /api/sensors - Step 1");

    let tree = match fetch_device_tree(&client, &config.firebase_url).await {
        Ok(tree) => tree,
        Err(e) => {
            error!("Failed to fetch device tree: {:#}", e);
            return error_response(StatusCode::BAD_GATEWAY, "Failed to fetch data from Firebase");
        }
    };
    if tree.is_null() || tree.as_object().is_some_and(|devices| devices.is_empty()) {
        return error_response(StatusCode::NOT_FOUND, "No data found");
    }

    // Step 2: Flatten into readings
    debug!("GET /api/sensors - Step 2");

    let raw_readings = count_raw_readings(&tree);
    let processed = normalize_device_tree(&tree);
    let total_records = processed.len();

    // Step 3: Optionally keep complete slices only
    let mut data = if params.filter_complete {
        filter_complete_timestamps(&processed)
    } else {
        processed
    };
    let filtered_records = data.len();

    // Step 4: Optionally thin the result
    if let Some(max_rows) = params.max_rows {
        data = sample_readings(&data, max_rows);
    }

    info!(
        "Normalized {} of {} raw readings, returning {}",
        total_records,
        raw_readings,
        data.len()
    );

    let response = SensorsResponse {
        success: true,
        filtered_records,
        data,
        raw_readings,
        total_records,
        is_filtered: params.filter_complete,
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(response)).into_response()
}
