//! HTTP server setup and configuration.
//!
//! This module provides the router and application state used by both
//! the production server and integration tests.

use axum::{
    extract::{DefaultBodyLimit, FromRef},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api::{self, ApiDoc};
use crate::models::AppConfig;
use crate::services::{
    EngineParams, EventBus, MovementService, ReconfigurationController, ToneEngine, ToneEvent,
};

/// Largest accepted image upload.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub engine: Arc<ToneEngine>,
    pub movement: Arc<MovementService>,
    pub events: EventBus,
    pub reconfigure: ReconfigurationController<EngineParams>,
}

impl FromRef<AppState> for Arc<ToneEngine> {
    fn from_ref(state: &AppState) -> Self {
        state.engine.clone()
    }
}

impl FromRef<AppState> for Arc<MovementService> {
    fn from_ref(state: &AppState) -> Self {
        state.movement.clone()
    }
}

impl FromRef<AppState> for EventBus {
    fn from_ref(state: &AppState) -> Self {
        state.events.clone()
    }
}

impl FromRef<AppState> for ReconfigurationController<EngineParams> {
    fn from_ref(state: &AppState) -> Self {
        state.reconfigure.clone()
    }
}

/// Create application state from configuration.
pub fn create_app_state(config: AppConfig) -> AppState {
    let events = EventBus::default();
    let engine = Arc::new(ToneEngine::new(
        config.quantization.k,
        config.quantization.method,
    ));
    let movement = Arc::new(MovementService::new(
        engine.clone(),
        events.clone(),
        config.movement.threshold_slider,
    ));

    let reconfigure = {
        let engine = engine.clone();
        let events = events.clone();
        ReconfigurationController::new(config.reconfigure.debounce(), move |params: EngineParams| {
            match engine.configure(params.k as i64, params.method) {
                Ok(Some(report)) => events.publish_rebuild(&report),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(%e, k = params.k, method = %params.method, "Rebuild failed");
                    events.publish(ToneEvent::RebuildFailed {
                        error: e.to_string(),
                    });
                }
            }
        })
    };

    AppState {
        config: Arc::new(config),
        engine,
        movement,
        events,
        reconfigure,
    }
}

/// Build the API router with all endpoints and middleware.
///
/// This is the core router used by both production and tests.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/image", post(api::upload_image))
        .route("/api/preview", get(api::get_preview))
        .route("/api/palette", get(api::get_palette))
        .route("/api/config", get(api::get_config).put(api::put_config))
        .route("/api/tone/next", post(api::next_tone))
        .route("/api/tone/reset", post(api::reset_tone))
        .route(
            "/api/movement",
            get(api::get_movement).post(api::post_movement),
        )
        .route("/api/movement/start", post(api::start_movement))
        .route("/api/movement/stop", post(api::stop_movement))
        .route("/api/movement/reset", post(api::reset_movement))
        .route("/api/events", get(api::handle_events))
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        )
        // Health check
        .route("/health", get(|| async { "OK" }))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
}
