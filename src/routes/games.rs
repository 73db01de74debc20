use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use validator::Validate;

use crate::{
    dto::game::{CreateGameRequest, GameCreated, GameDeleted, GameList, IndexRebuildReport},
    error::AppError,
    routes::session::CurrentSession,
    services::{game_service, index_service},
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams/{team_id}/games", get(load_games).post(create_game))
        .route("/teams/{team_id}/games/{game_id}", delete(delete_game))
        .route("/games/index/rebuild", post(rebuild_index))
}

#[utoipa::path(
    get,
    path = "/teams/{team_id}/games",
    tag = "games",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    responses((status = 200, description = "Games of the team ordered by date", body = GameList))
)]
pub async fn load_games(
    State(state): State<SharedState>,
    Path(team_id): Path<String>,
) -> Result<Json<GameList>, AppError> {
    Ok(Json(game_service::load_games(&state, &team_id).await?))
}

/// Schedule a game; the mirror in the flat `games` collection follows.
#[utoipa::path(
    post,
    path = "/teams/{team_id}/games",
    tag = "games",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    request_body = CreateGameRequest,
    responses(
        (status = 201, description = "Game created", body = GameCreated),
        (status = 400, description = "Missing opponent or malformed date"),
        (status = 404, description = "Team not found")
    )
)]
pub async fn create_game(
    State(state): State<SharedState>,
    Path(team_id): Path<String>,
    Json(payload): Json<CreateGameRequest>,
) -> Result<(StatusCode, Json<GameCreated>), AppError> {
    payload.validate()?;
    let created = game_service::create_game(&state, &team_id, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Delete a game and its stat lines. The mirrored copy is kept.
#[utoipa::path(
    delete,
    path = "/teams/{team_id}/games/{game_id}",
    tag = "games",
    security(("session_token" = [])),
    params(
        ("team_id" = String, Path, description = "Team identifier"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    responses(
        (status = 200, description = "Game deleted", body = GameDeleted),
        (status = 404, description = "Game not found")
    )
)]
pub async fn delete_game(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path((team_id, game_id)): Path<(String, String)>,
) -> Result<Json<GameDeleted>, AppError> {
    Ok(Json(
        game_service::delete_game(&state, &current.session, &team_id, &game_id).await?,
    ))
}

/// Regenerate the flat `games` collection from the nested games.
#[utoipa::path(
    post,
    path = "/games/index/rebuild",
    tag = "games",
    security(("session_token" = [])),
    responses((status = 200, description = "Rebuild summary", body = IndexRebuildReport))
)]
pub async fn rebuild_index(
    State(state): State<SharedState>,
) -> Result<Json<IndexRebuildReport>, AppError> {
    Ok(Json(index_service::rebuild_game_index(&state).await?))
}
