use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use super::blocking;
use crate::error::ApiError;
use crate::services::ToneEngine;

#[derive(Debug, Serialize, ToSchema)]
pub struct ToneResponse {
    /// Palette index of the tone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<usize>,
    /// Sequence position that will be played next
    pub cursor: usize,
}

/// Advance the walk sequence by one pixel
#[utoipa::path(
    post,
    path = "/api/tone/next",
    responses(
        (status = 200, description = "Next tone", body = ToneResponse),
        (status = 409, description = "No image loaded"),
    ),
    tag = "Tone"
)]
pub async fn next_tone(
    State(engine): State<Arc<ToneEngine>>,
) -> Result<Json<ToneResponse>, ApiError> {
    let (tone, cursor) = blocking(move || {
        let tone = engine.next_tone()?;
        Ok::<_, ApiError>((tone, engine.snapshot().cursor))
    })
    .await??;

    Ok(Json(ToneResponse {
        tone: Some(tone),
        cursor,
    }))
}

/// Rewind the walk sequence to its first pixel
#[utoipa::path(
    post,
    path = "/api/tone/reset",
    responses(
        (status = 200, description = "Sequence rewound", body = ToneResponse),
    ),
    tag = "Tone"
)]
pub async fn reset_tone(
    State(engine): State<Arc<ToneEngine>>,
) -> Result<Json<ToneResponse>, ApiError> {
    blocking(move || engine.reset_sequence()).await?;
    tracing::debug!("Tone sequence reset");
    Ok(Json(ToneResponse {
        tone: None,
        cursor: 0,
    }))
}
