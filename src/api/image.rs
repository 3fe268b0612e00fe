use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use color_tones::{CountAdjusted, RebuildReport};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::blocking;
use crate::error::ApiError;
use crate::services::{EventBus, ToneEngine};

/// Result of loading an image
#[derive(Debug, Serialize, ToSchema)]
pub struct ImageResponse {
    /// Colors in the new palette
    pub palette_size: usize,
    /// Unique colors in the sample grid
    pub unique_colors: usize,
    /// Sampled pixels in the walk sequence
    pub sequence_len: usize,
    /// Present when the palette has fewer colors than requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub adjustment: Option<AdjustmentInfo>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AdjustmentInfo {
    pub requested_k: usize,
    pub actual_k: usize,
    pub message: String,
}

impl From<&CountAdjusted> for AdjustmentInfo {
    fn from(adj: &CountAdjusted) -> Self {
        Self {
            requested_k: adj.requested_k,
            actual_k: adj.actual_k,
            message: adj.message.clone(),
        }
    }
}

impl From<&RebuildReport> for ImageResponse {
    fn from(report: &RebuildReport) -> Self {
        Self {
            palette_size: report.palette_size,
            unique_colors: report.unique_colors,
            sequence_len: report.sequence_len,
            adjustment: report.adjustment.as_ref().map(AdjustmentInfo::from),
        }
    }
}

/// Load a PNG image
///
/// Samples the image, rebuilds the palette and starts a fresh walk sequence.
/// On failure the previously loaded image stays active.
#[utoipa::path(
    post,
    path = "/api/image",
    request_body(content = Vec<u8>, description = "PNG file", content_type = "image/png"),
    responses(
        (status = 200, description = "Image loaded", body = ImageResponse),
        (status = 400, description = "Empty body"),
        (status = 409, description = "Another load is in progress"),
        (status = 422, description = "Image could not be decoded or sampled"),
    ),
    tag = "Image"
)]
pub async fn upload_image(
    State(engine): State<Arc<ToneEngine>>,
    State(events): State<EventBus>,
    body: Bytes,
) -> Result<Json<ImageResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("empty image body".to_string()));
    }

    let size_bytes = body.len();
    let report = blocking(move || engine.load_png(&body)).await??;
    tracing::info!(size_bytes, palette = report.palette_size, "Image uploaded");

    events.publish_rebuild(&report);
    Ok(Json(ImageResponse::from(&report)))
}

/// Palette preview
///
/// One pixel per sampled grid cell, recolored with its palette color and
/// laid out row-major in a square. Cells past the last sample are
/// transparent.
#[utoipa::path(
    get,
    path = "/api/preview",
    responses(
        (status = 200, description = "PNG image", content_type = "image/png"),
        (status = 404, description = "No image loaded"),
    ),
    tag = "Image"
)]
pub async fn get_preview(State(engine): State<Arc<ToneEngine>>) -> Result<Response, ApiError> {
    let png_bytes = blocking(move || engine.preview_png())
        .await??
        .ok_or(ApiError::NotFound("no image loaded"))?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "image/png"),
            (header::CONTENT_LENGTH, &png_bytes.len().to_string()),
        ],
        Bytes::from(png_bytes),
    )
        .into_response())
}
