use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::blocking;
use crate::error::ApiError;
use crate::services::{MovementService, MovementStatus, SampleResult};

/// One movement sample
#[derive(Debug, Deserialize, ToSchema)]
pub struct MovementRequest {
    /// Distance moved since the previous sample, in meters
    pub magnitude: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementResponse {
    pub outcome: SampleResult,
    pub status: MovementStatus,
}

/// Submit a movement sample
///
/// Samples at or below the noise floor are ignored. Crossing the threshold
/// plays the next tone and publishes a `tone_play` event.
#[utoipa::path(
    post,
    path = "/api/movement",
    request_body = MovementRequest,
    responses(
        (status = 200, description = "Sample processed", body = MovementResponse),
        (status = 400, description = "Malformed sample"),
    ),
    tag = "Movement"
)]
pub async fn post_movement(
    State(movement): State<Arc<MovementService>>,
    payload: Result<Json<MovementRequest>, JsonRejection>,
) -> Result<Json<MovementResponse>, ApiError> {
    let Json(request) = payload?;
    let response = blocking(move || {
        let outcome = movement.on_sample(request.magnitude);
        MovementResponse {
            outcome,
            status: movement.status(),
        }
    })
    .await?;
    Ok(Json(response))
}

/// Movement counters
#[utoipa::path(
    get,
    path = "/api/movement",
    responses(
        (status = 200, description = "Current counters", body = MovementStatus),
    ),
    tag = "Movement"
)]
pub async fn get_movement(
    State(movement): State<Arc<MovementService>>,
) -> Result<Json<MovementStatus>, ApiError> {
    Ok(Json(blocking(move || movement.status()).await?))
}

/// Start a session
///
/// Zeroes the distance since the last tone and accepts samples again.
#[utoipa::path(
    post,
    path = "/api/movement/start",
    responses(
        (status = 200, description = "Session started", body = MovementStatus),
    ),
    tag = "Movement"
)]
pub async fn start_movement(
    State(movement): State<Arc<MovementService>>,
) -> Result<Json<MovementStatus>, ApiError> {
    let status = blocking(move || {
        movement.start();
        movement.status()
    })
    .await?;
    Ok(Json(status))
}

/// Stop a session
#[utoipa::path(
    post,
    path = "/api/movement/stop",
    responses(
        (status = 200, description = "Session stopped", body = MovementStatus),
    ),
    tag = "Movement"
)]
pub async fn stop_movement(
    State(movement): State<Arc<MovementService>>,
) -> Result<Json<MovementStatus>, ApiError> {
    let status = blocking(move || {
        movement.stop();
        movement.status()
    })
    .await?;
    Ok(Json(status))
}

/// Zero every counter, lifetime distance included
#[utoipa::path(
    post,
    path = "/api/movement/reset",
    responses(
        (status = 200, description = "Counters reset", body = MovementStatus),
    ),
    tag = "Movement"
)]
pub async fn reset_movement(
    State(movement): State<Arc<MovementService>>,
) -> Result<Json<MovementStatus>, ApiError> {
    let status = blocking(move || {
        movement.reset();
        movement.status()
    })
    .await?;
    Ok(Json(status))
}
