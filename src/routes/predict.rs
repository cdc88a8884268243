use axum::{http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{error_response, AppState};
use crate::analytics::predict_temperature;
use crate::Reading;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/api/predict", post(handler))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PredictRequest {
    data: Vec<Reading>,
    /// Target time-bucket, `HH-MM-SS`.
    target_time: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictResponse {
    success: bool,
    prediction: f64,
    target_time: String,
}

async fn handler(Json(request): Json<PredictRequest>) -> impl IntoResponse {
    // ---
    info!(
        "POST /api/predict - {} readings, target {}",
        request.data.len(),
        request.target_time
    );

    match predict_temperature(&request.data, &request.target_time) {
        Some(prediction) => (
            StatusCode::OK,
            Json(PredictResponse {
                success: true,
                prediction,
                target_time: request.target_time,
            }),
        )
            .into_response(),
        None => {
            warn!("No prediction for target {}", request.target_time);
            error_response(StatusCode::BAD_REQUEST, "Unable to predict temperature")
        }
    }
}
