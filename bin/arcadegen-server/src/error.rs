//! Unified server error type.
//!
//! Every handler returns `Result<T, ServerError>`, which implements
//! [`axum::response::IntoResponse`] so errors are automatically converted
//! to a `{"success": false, "error": "..."}` body with a matching status.
//!
//! Record-file errors are logged with full detail but only a generic
//! message is returned, so file paths never reach clients.

use arcadegen_core::{GenerationError, StoreError};
use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// All errors that can occur in the arcadegen-server request lifecycle.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Prompt → code generation failed.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Reading or writing the game record file failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The caller referenced a game that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller sent an invalid or malformed request.
    #[error("bad request: {0}")]
    BadRequest(String),
}

/// Body rejections (bad JSON, wrong types, missing content type) become
/// ordinary 400s so clients always get the JSON error shape.
impl From<JsonRejection> for ServerError {
    fn from(rejection: JsonRejection) -> Self {
        ServerError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ServerError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ServerError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),

            ServerError::Generation(e) => {
                error!(error = %e, "game generation failed");
                let status = match e {
                    GenerationError::QuotaExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
                    GenerationError::MissingCredential => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.user_message())
            }
            ServerError::Store(e) => {
                error!(error = %e, "game store error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "failed to access the game records".to_owned(),
                )
            }
        };
        (
            status,
            Json(json!({ "success": false, "error": client_message })),
        )
            .into_response()
    }
}
