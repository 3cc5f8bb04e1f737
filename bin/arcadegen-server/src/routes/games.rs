//! Stored-game routes: list, fetch (counts as a play), delete, and the
//! browser-ready script.

use std::sync::Arc;

use arcadegen_core::prepare_script;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tracing::{debug, info};
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::games::{
    DeleteResponse, ErrorResponse, GameEnvelope, GameListEnvelope, GameResponse,
};
use crate::state::AppState;

const JAVASCRIPT: &str = "application/javascript; charset=utf-8";

#[derive(OpenApi)]
#[openapi(
    paths(list_games, get_game, delete_game, get_game_script),
    components(schemas(
        GameResponse,
        GameEnvelope,
        GameListEnvelope,
        DeleteResponse,
        ErrorResponse
    ))
)]
pub struct GamesApi;

/// Register game routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/games", get(list_games))
        .route("/games/{id}", get(get_game).delete(delete_game))
        .route("/games/{id}/script", get(get_game_script))
}

fn not_found(id: &str) -> ServerError {
    debug!(id = %id, "unknown game id");
    ServerError::NotFound("game not found".into())
}

#[utoipa::path(
    get,
    path = "/api/games",
    tag = "games",
    responses(
        (status = 200, description = "All games, newest first", body = GameListEnvelope),
    )
)]
pub async fn list_games(State(state): State<Arc<AppState>>) -> Json<GameListEnvelope> {
    let games = state
        .store
        .list_newest_first()
        .await
        .into_iter()
        .map(GameResponse::from)
        .collect();
    Json(GameListEnvelope {
        success: true,
        games,
    })
}

/// Fetch one game. Every successful fetch increments its play count.
#[utoipa::path(
    get,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game id")),
    responses(
        (status = 200, description = "Game found; play count incremented", body = GameEnvelope),
        (status = 404, description = "No game with this id", body = ErrorResponse),
        (status = 500, description = "Record file could not be written", body = ErrorResponse),
    )
)]
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameEnvelope>, ServerError> {
    let record = state
        .store
        .record_play(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(GameEnvelope {
        success: true,
        game: record.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/api/games/{id}",
    tag = "games",
    params(("id" = String, Path, description = "Game id")),
    responses(
        (status = 200, description = "Game deleted", body = DeleteResponse),
        (status = 404, description = "No game with this id", body = ErrorResponse),
        (status = 500, description = "Record file could not be written", body = ErrorResponse),
    )
)]
pub async fn delete_game(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ServerError> {
    if !state.store.delete(&id).await? {
        return Err(not_found(&id));
    }
    info!(id = %id, "game deleted");
    Ok(Json(DeleteResponse {
        success: true,
        message: "game deleted".into(),
    }))
}

/// The game's code, prepared for injection as a `<script>` element.
///
/// Full HTML documents are reduced to their inline script, fullscreen calls
/// are rewritten away, and the result is wrapped in a function that receives
/// the canvas and its 2D context. Does not count as a play.
#[utoipa::path(
    get,
    path = "/api/games/{id}/script",
    tag = "games",
    params(("id" = String, Path, description = "Game id")),
    responses(
        (status = 200, description = "Prepared script", body = String, content_type = "application/javascript"),
        (status = 404, description = "No game with this id", body = ErrorResponse),
    )
)]
pub async fn get_game_script(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ServerError> {
    let record = state.store.get(&id).await.ok_or_else(|| not_found(&id))?;
    let prepared = prepare_script(&record.code, &state.execution);
    debug!(
        id = %id,
        from_document = prepared.from_document,
        neutralized = prepared.neutralized,
        "game script prepared"
    );
    Ok(([(header::CONTENT_TYPE, JAVASCRIPT)], prepared.source))
}
