use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use validator::Validate;

use crate::{
    dto::roster::{PlayerInput, RosterListing},
    error::AppError,
    routes::session::CurrentSession,
    services::roster_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams/{team_id}/roster", get(first_page).post(add_player))
        .route("/teams/{team_id}/roster/next", get(next_page))
        .route(
            "/teams/{team_id}/roster/{player_id}",
            put(update_player).delete(delete_player),
        )
}

/// Load the first roster page of a team, replacing the previous roster listing.
#[utoipa::path(
    get,
    path = "/teams/{team_id}/roster",
    tag = "roster",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    responses((status = 200, description = "First page of players", body = RosterListing))
)]
pub async fn first_page(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path(team_id): Path<String>,
) -> Result<Json<RosterListing>, AppError> {
    Ok(Json(
        roster_service::load_first_page(&state, &current.session, &team_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/teams/{team_id}/roster/next",
    tag = "roster",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Players loaded so far", body = RosterListing),
        (status = 409, description = "Another team's roster is loaded")
    )
)]
pub async fn next_page(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path(team_id): Path<String>,
) -> Result<Json<RosterListing>, AppError> {
    Ok(Json(
        roster_service::load_next_page(&state, &current.session, &team_id).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/teams/{team_id}/roster",
    tag = "roster",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    request_body = PlayerInput,
    responses((status = 201, description = "Player added; first page reloaded", body = RosterListing))
)]
pub async fn add_player(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path(team_id): Path<String>,
    Json(payload): Json<PlayerInput>,
) -> Result<(StatusCode, Json<RosterListing>), AppError> {
    payload.validate()?;
    let listing = roster_service::add_player(&state, &current.session, &team_id, payload).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

#[utoipa::path(
    put,
    path = "/teams/{team_id}/roster/{player_id}",
    tag = "roster",
    security(("session_token" = [])),
    params(
        ("team_id" = String, Path, description = "Team identifier"),
        ("player_id" = String, Path, description = "Player identifier")
    ),
    request_body = PlayerInput,
    responses((status = 200, description = "Player updated; first page reloaded", body = RosterListing))
)]
pub async fn update_player(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path((team_id, player_id)): Path<(String, String)>,
    Json(payload): Json<PlayerInput>,
) -> Result<Json<RosterListing>, AppError> {
    payload.validate()?;
    Ok(Json(
        roster_service::update_player(&state, &current.session, &team_id, &player_id, payload)
            .await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/teams/{team_id}/roster/{player_id}",
    tag = "roster",
    security(("session_token" = [])),
    params(
        ("team_id" = String, Path, description = "Team identifier"),
        ("player_id" = String, Path, description = "Player identifier")
    ),
    responses((status = 200, description = "Player removed; first page reloaded", body = RosterListing))
)]
pub async fn delete_player(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path((team_id, player_id)): Path<(String, String)>,
) -> Result<Json<RosterListing>, AppError> {
    Ok(Json(
        roster_service::delete_player(&state, &current.session, &team_id, &player_id).await?,
    ))
}
