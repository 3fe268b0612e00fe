use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use color_tones::QuantizeError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(&'static str),

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<QuantizeError> for ApiError {
    fn from(e: QuantizeError) -> Self {
        ApiError::Engine(EngineError::Quantize(e))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("An image load is already in progress")]
    LoadInProgress,

    #[error("PNG decode error: {0}")]
    Decode(String),

    #[error(transparent)]
    Quantize(#[from] QuantizeError),

    #[error("PNG encode error: {0}")]
    Encode(String),
}

impl EngineError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            EngineError::LoadInProgress => StatusCode::CONFLICT,
            EngineError::Decode(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Quantize(QuantizeError::InvalidImage { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            EngineError::Quantize(QuantizeError::EmptyPalette) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Quantize(QuantizeError::EmptySequence) => StatusCode::CONFLICT,
            EngineError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Engine(e) => e.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "status": status.as_u16(),
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}
