//! Heatmap endpoints backed by the transformed CSV export.
//!
//! - `GET /api/heatmap-data` returns every CSV reading plus the distinct
//!   time-buckets the UI's slider steps through.
//! - `GET /api/heatmap` interpolates one time-slice of the CSV.
//! - `POST /api/heatmap/grid` interpolates caller-supplied observations.

use std::path::PathBuf;

use axum::{
    extract::Query, extract::State, http::StatusCode, response::IntoResponse, response::Response,
    routing::get, routing::post, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use super::{error_response, AppState};
use crate::analytics::{
    color_for_value, generate_heatmap_grid, temperature_range, Rgb, DEFAULT_POWER,
};
use crate::ingest::{load_csv, time_slice, unique_times};
use crate::{Config, GridPoint, Reading, SensorObservation};

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new()
        .route("/api/heatmap-data", get(data_handler))
        .route("/api/heatmap", get(slice_handler))
        .route("/api/heatmap/grid", post(grid_handler))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HeatmapDataResponse {
    success: bool,
    data: Vec<Reading>,
    total_records: usize,
    times: Vec<String>,
    source: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SliceQuery {
    time: String,
    date: Option<String>,
    resolution: Option<u32>,
    power: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct GridRequest {
    observations: [SensorObservation; 3],
    resolution: Option<u32>,
    power: Option<f64>,
}

/// Interpolated point with its display colour.
#[derive(Debug, Serialize)]
struct ColoredPoint {
    #[serde(flatten)]
    point: GridPoint,
    color: Rgb,
}

#[derive(Debug, Serialize)]
struct HeatmapResponse {
    time: Option<String>,
    min: f64,
    max: f64,
    resolution: usize,
    sensors: [SensorObservation; 3],
    points: Vec<ColoredPoint>,
}

// ---

async fn data_handler(State((_, config)): State<AppState>) -> Response {
    // ---
    info!("GET /api/heatmap-data");

    let data = match read_csv(&config).await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let response = HeatmapDataResponse {
        success: true,
        total_records: data.len(),
        times: unique_times(&data),
        data,
        source: config.csv_path.display().to_string(),
        timestamp: Utc::now(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

async fn slice_handler(
    Query(params): Query<SliceQuery>,
    State((_, config)): State<AppState>,
) -> Response {
    // ---
    info!("GET /api/heatmap - time={} date={:?}", params.time, params.date);

    let readings = match read_csv(&config).await {
        Ok(data) => data,
        Err(response) => return response,
    };

    let Some(observations) = time_slice(&readings, params.date.as_deref(), &params.time) else {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("No complete sensor slice at {}", params.time),
        );
    };

    render(
        &config,
        observations,
        params.resolution,
        params.power,
        Some(params.time),
    )
}

async fn grid_handler(
    State((_, config)): State<AppState>,
    Json(request): Json<GridRequest>,
) -> Response {
    // ---
    info!("POST /api/heatmap/grid");
    render(
        &config,
        request.observations,
        request.resolution,
        request.power,
        None,
    )
}

/// Load the CSV export off the async runtime, mapping failure to a 500.
async fn read_csv(config: &Config) -> Result<Vec<Reading>, Response> {
    // ---
    let path: PathBuf = config.csv_path.clone();
    let loaded = tokio::task::spawn_blocking(move || load_csv(&path)).await;

    match loaded {
        Ok(Ok(data)) => Ok(data),
        Ok(Err(e)) => {
            error!("Failed to read CSV: {:#}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read CSV file",
            ))
        }
        Err(e) => {
            error!("CSV loader task failed: {}", e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to read CSV file",
            ))
        }
    }
}

/// Interpolate one slice and colour every point against the slice's range.
fn render(
    config: &Config,
    observations: [SensorObservation; 3],
    resolution: Option<u32>,
    power: Option<f64>,
    time: Option<String>,
) -> Response {
    // ---
    let power = power.unwrap_or(DEFAULT_POWER);
    if !power.is_finite() || power <= 0.0 {
        return error_response(StatusCode::BAD_REQUEST, "power must be a positive number");
    }
    let resolution = config.resolve_resolution(resolution);
    let (min, max) = temperature_range(&observations).unwrap_or_default();

    let points: Vec<ColoredPoint> = generate_heatmap_grid(&observations, resolution, power)
        .map(|point| ColoredPoint {
            color: color_for_value(point.value, min, max),
            point,
        })
        .collect();

    debug!(
        "Rendered {} interior points at resolution {} (min={}, max={})",
        points.len(),
        resolution,
        min,
        max
    );

    let response = HeatmapResponse {
        time,
        min,
        max,
        resolution,
        sensors: observations,
        points,
    };
    (StatusCode::OK, Json(response)).into_response()
}
