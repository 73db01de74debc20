use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::stats::{GameSelection, PlayerStatLine, StatLineInput, StatsSaved},
    error::AppError,
    routes::session::CurrentSession,
    services::stat_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route(
            "/teams/{team_id}/games/{game_id}/select",
            post(select_game),
        )
        .route(
            "/teams/{team_id}/games/{game_id}/stats/{player_id}",
            get(get_stats).put(save_stats),
        )
}

/// Toggle the session's selected game and return its roster stat lines.
#[utoipa::path(
    post,
    path = "/teams/{team_id}/games/{game_id}/select",
    tag = "stats",
    security(("session_token" = [])),
    params(
        ("team_id" = String, Path, description = "Team identifier"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    responses(
        (status = 200, description = "Selection state after the toggle", body = GameSelection),
        (status = 409, description = "A newer selection superseded this one")
    )
)]
pub async fn select_game(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path((team_id, game_id)): Path<(String, String)>,
) -> Result<Json<GameSelection>, AppError> {
    Ok(Json(
        stat_service::select_game(&state, &current.session, &team_id, &game_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/teams/{team_id}/games/{game_id}/stats/{player_id}",
    tag = "stats",
    security(("session_token" = [])),
    params(
        ("team_id" = String, Path, description = "Team identifier"),
        ("game_id" = String, Path, description = "Game identifier"),
        ("player_id" = String, Path, description = "Player identifier")
    ),
    responses((status = 200, description = "Stat line, zero when none was recorded", body = PlayerStatLine))
)]
pub async fn get_stats(
    State(state): State<SharedState>,
    Path((team_id, game_id, player_id)): Path<(String, String, String)>,
) -> Result<Json<PlayerStatLine>, AppError> {
    Ok(Json(
        stat_service::get_stats(&state, &team_id, &game_id, &player_id).await?,
    ))
}

/// Record a player's stat line and rewrite the game score.
#[utoipa::path(
    put,
    path = "/teams/{team_id}/games/{game_id}/stats/{player_id}",
    tag = "stats",
    security(("session_token" = [])),
    params(
        ("team_id" = String, Path, description = "Team identifier"),
        ("game_id" = String, Path, description = "Game identifier"),
        ("player_id" = String, Path, description = "Player identifier")
    ),
    request_body = StatLineInput,
    responses(
        (status = 200, description = "Stat line saved", body = StatsSaved),
        (status = 404, description = "Game not found")
    )
)]
pub async fn save_stats(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path((team_id, game_id, player_id)): Path<(String, String, String)>,
    Json(payload): Json<StatLineInput>,
) -> Result<Json<StatsSaved>, AppError> {
    payload.validate()?;
    Ok(Json(
        stat_service::save_stats(
            &state,
            &current.session,
            &team_id,
            &game_id,
            &player_id,
            payload,
        )
        .await?,
    ))
}
