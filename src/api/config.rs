use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use color_tones::{clamp_k, QuantizeMethod};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use super::blocking;
use crate::error::ApiError;
use crate::services::{
    EngineParams, MovementService, RebuildState, ReconfigurationController, RequestOutcome,
    ToneEngine,
};

/// Current settings
#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigResponse {
    /// Requested palette size, possibly not applied yet
    pub k: usize,
    pub method: String,
    pub threshold_slider: f64,
    pub threshold_feet: f64,
    pub rebuild_state: RebuildState,
    /// How a K or method change in this request was scheduled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rebuild: Option<RequestOutcome>,
}

/// Partial settings update; absent fields are left alone
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct ConfigUpdate {
    /// Palette size, clamped to 1..=256
    pub k: Option<i64>,
    /// `direct`, `uniform` or `kmeans`
    pub method: Option<String>,
    /// Threshold slider position in `[0, 1]`
    pub threshold_slider: Option<f64>,
}

/// Get current settings
#[utoipa::path(
    get,
    path = "/api/config",
    responses(
        (status = 200, description = "Current settings", body = ConfigResponse),
    ),
    tag = "Config"
)]
pub async fn get_config(
    State(engine): State<Arc<ToneEngine>>,
    State(movement): State<Arc<MovementService>>,
    State(reconfigure): State<ReconfigurationController<EngineParams>>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let response = respond(engine, movement, &reconfigure, None).await?;
    Ok(Json(response))
}

/// Update settings
///
/// The threshold applies immediately. K and method changes are handed to the
/// rebuild controller, which debounces bursts and coalesces changes that
/// arrive while a rebuild is running.
#[utoipa::path(
    put,
    path = "/api/config",
    request_body = ConfigUpdate,
    responses(
        (status = 200, description = "Settings accepted", body = ConfigResponse),
        (status = 400, description = "Invalid field value"),
    ),
    tag = "Config"
)]
pub async fn put_config(
    State(engine): State<Arc<ToneEngine>>,
    State(movement): State<Arc<MovementService>>,
    State(reconfigure): State<ReconfigurationController<EngineParams>>,
    payload: Result<Json<ConfigUpdate>, JsonRejection>,
) -> Result<Json<ConfigResponse>, ApiError> {
    let Json(update) = payload?;

    if update.k.is_none() && update.method.is_none() && update.threshold_slider.is_none() {
        return Err(ApiError::BadRequest(
            "expected at least one of k, method, threshold_slider".to_string(),
        ));
    }

    let method = update
        .method
        .as_deref()
        .map(str::parse::<QuantizeMethod>)
        .transpose()
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    if let Some(slider) = update.threshold_slider {
        if !slider.is_finite() {
            return Err(ApiError::BadRequest(
                "threshold_slider must be a number".to_string(),
            ));
        }
        let movement = movement.clone();
        blocking(move || movement.set_slider(slider)).await?;
    }

    let mut outcome = None;
    if update.k.is_some() || method.is_some() {
        let base = current_params(&engine, &reconfigure).await?;
        let params = EngineParams {
            k: update.k.map(clamp_k).unwrap_or(base.k),
            method: method.unwrap_or(base.method),
        };
        let result = reconfigure.request(params);
        tracing::info!(k = params.k, method = %params.method, ?result, "Reconfiguration requested");
        outcome = Some(result);
    }

    let response = respond(engine, movement, &reconfigure, outcome).await?;
    Ok(Json(response))
}

/// Latest requested parameters, falling back to what the engine runs with.
async fn current_params(
    engine: &Arc<ToneEngine>,
    reconfigure: &ReconfigurationController<EngineParams>,
) -> Result<EngineParams, ApiError> {
    match reconfigure.latest() {
        Some(params) => Ok(params),
        None => {
            let engine = engine.clone();
            blocking(move || engine.params()).await
        }
    }
}

async fn respond(
    engine: Arc<ToneEngine>,
    movement: Arc<MovementService>,
    reconfigure: &ReconfigurationController<EngineParams>,
    rebuild: Option<RequestOutcome>,
) -> Result<ConfigResponse, ApiError> {
    let params = current_params(&engine, reconfigure).await?;
    let status = blocking(move || movement.status()).await?;

    Ok(ConfigResponse {
        k: params.k,
        method: params.method.to_string(),
        threshold_slider: status.slider,
        threshold_feet: status.threshold_feet,
        rebuild_state: reconfigure.state(),
        rebuild,
    })
}
