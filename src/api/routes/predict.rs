//! Prediction Route
//!
//! Forwards the four scoring inputs to the hosted model and reports the
//! outcome. One outbound query per request; a service failure surfaces
//! as an error response, never a retry.
//!
//! - POST /api/v1/predict

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::PredictResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::predict::{PredictionInput, PredictionOutcome};

/// POST /api/v1/predict
///
/// Missing body fields fall back to the documented defaults, each
/// independently.
pub async fn post_predict(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PredictionInput>,
) -> ApiResult<Json<PredictResponse>> {
    let outcome = state.predictor.predict(input).await?;

    let response = match outcome {
        PredictionOutcome::Predicted(adt) => PredictResponse {
            status: "ok".to_string(),
            predicted_adt: Some(adt),
            message: outcome.message(),
        },
        PredictionOutcome::Unavailable => PredictResponse {
            status: "empty".to_string(),
            predicted_adt: None,
            message: outcome.message(),
        },
    };

    Ok(Json(response))
}
