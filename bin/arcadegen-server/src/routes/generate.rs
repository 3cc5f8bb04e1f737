//! `POST /api/generate` – prompt in, stored game out.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;
use utoipa::OpenApi;
use validator::Validate;

use crate::error::ServerError;
use crate::schemas::games::{ErrorResponse, GameEnvelope, GameResponse, GenerateRequest};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(generate_game),
    components(schemas(GenerateRequest, GameEnvelope, GameResponse, ErrorResponse))
)]
pub struct GenerateApi;

/// Register generation routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/generate", post(generate_game))
}

/// Generate a game from a prompt and store it.
///
/// Calls the remote model exactly once; nothing is stored when generation
/// fails.
#[utoipa::path(
    post,
    path = "/api/generate",
    tag = "games",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Game generated and stored", body = GameEnvelope),
        (status = 400, description = "Missing or invalid prompt", body = ErrorResponse),
        (status = 429, description = "Remote API quota exhausted", body = ErrorResponse),
        (status = 500, description = "Generation or storage failed", body = ErrorResponse),
    )
)]
pub async fn generate_game(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GameEnvelope>, ServerError> {
    let Json(req) = payload?;
    if req.prompt.trim().is_empty() {
        return Err(ServerError::BadRequest("prompt is required".into()));
    }
    req.validate()
        .map_err(|e| ServerError::BadRequest(e.to_string()))?;

    info!(prompt = %req.prompt, "game generation requested");

    let code = state.generator.generate(&req.prompt).await?;
    let record = state.store.create(&req.prompt, code).await?;

    info!(id = %record.id, code_len = record.code.len(), "game generated");

    Ok(Json(GameEnvelope {
        success: true,
        game: record.into(),
    }))
}
