use axum::{extract::State, response::Json};
use std::sync::Arc;

use super::blocking;
use crate::error::ApiError;
use crate::services::{PaletteSnapshot, ToneEngine};

/// Active palette
///
/// Before the first image load the palette is empty.
#[utoipa::path(
    get,
    path = "/api/palette",
    responses(
        (status = 200, description = "Palette snapshot", body = PaletteSnapshot),
    ),
    tag = "Image"
)]
pub async fn get_palette(
    State(engine): State<Arc<ToneEngine>>,
) -> Result<Json<PaletteSnapshot>, ApiError> {
    let snapshot = blocking(move || engine.snapshot()).await?;
    Ok(Json(snapshot))
}
