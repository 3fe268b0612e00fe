pub mod config;
pub mod events;
pub mod image;
pub mod movement;
pub mod palette;
pub mod tone;

use utoipa::OpenApi;

use crate::error::ApiError;

pub use config::{get_config, put_config, ConfigResponse, ConfigUpdate};
pub use events::handle_events;
pub use image::{get_preview, upload_image, AdjustmentInfo, ImageResponse};
pub use movement::{
    get_movement, post_movement, reset_movement, start_movement, stop_movement, MovementRequest,
    MovementResponse,
};
pub use palette::get_palette;
pub use tone::{next_tone, reset_tone, ToneResponse};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tonewalk API",
        description = "Turn an image's colors into tones while walking",
        version = "0.1.0",
        license(name = "MIT")
    ),
    paths(
        image::upload_image,
        image::get_preview,
        palette::get_palette,
        config::get_config,
        config::put_config,
        tone::next_tone,
        tone::reset_tone,
        movement::post_movement,
        movement::get_movement,
        movement::start_movement,
        movement::stop_movement,
        movement::reset_movement,
        events::handle_events,
    ),
    components(schemas(
        ImageResponse,
        AdjustmentInfo,
        crate::services::PaletteSnapshot,
        ConfigResponse,
        ConfigUpdate,
        crate::services::RebuildState,
        crate::services::RequestOutcome,
        ToneResponse,
        MovementRequest,
        MovementResponse,
        crate::services::MovementStatus,
        crate::services::SampleResult,
        crate::services::ToneEvent,
    )),
    tags(
        (name = "Image", description = "Image upload and preview"),
        (name = "Config", description = "Quantization and threshold settings"),
        (name = "Tone", description = "Tone sequence"),
        (name = "Movement", description = "Movement samples and session control"),
        (name = "Events", description = "Server-sent event stream")
    )
)]
pub struct ApiDoc;

/// Run blocking engine work off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::Internal(format!("Blocking task failed: {e}")))
}
