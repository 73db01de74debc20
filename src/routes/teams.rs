use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use validator::Validate;

use crate::{
    dto::team::{TeamInput, TeamListing},
    error::AppError,
    routes::session::CurrentSession,
    services::team_service,
    state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/teams", get(first_page).post(add_team))
        .route("/teams/next", get(next_page))
        .route("/teams/{team_id}", put(update_team).delete(delete_team))
}

/// Load the first page of teams, ordered by name.
#[utoipa::path(
    get,
    path = "/teams",
    tag = "teams",
    security(("session_token" = [])),
    responses((status = 200, description = "First page of teams", body = TeamListing))
)]
pub async fn first_page(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<TeamListing>, AppError> {
    Ok(Json(
        team_service::load_first_page(&state, &current.session).await?,
    ))
}

/// Append the next page to the session listing; a no-op once exhausted.
#[utoipa::path(
    get,
    path = "/teams/next",
    tag = "teams",
    security(("session_token" = [])),
    responses((status = 200, description = "Teams loaded so far", body = TeamListing))
)]
pub async fn next_page(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<TeamListing>, AppError> {
    Ok(Json(
        team_service::load_next_page(&state, &current.session).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/teams",
    tag = "teams",
    security(("session_token" = [])),
    request_body = TeamInput,
    responses(
        (status = 201, description = "Team created; first page reloaded", body = TeamListing),
        (status = 400, description = "A required field is empty")
    )
)]
pub async fn add_team(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Json(payload): Json<TeamInput>,
) -> Result<(StatusCode, Json<TeamListing>), AppError> {
    payload.validate()?;
    let listing = team_service::add_team(&state, &current.session, payload).await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

#[utoipa::path(
    put,
    path = "/teams/{team_id}",
    tag = "teams",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    request_body = TeamInput,
    responses(
        (status = 200, description = "Team updated; first page reloaded", body = TeamListing),
        (status = 404, description = "Team not found")
    )
)]
pub async fn update_team(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path(team_id): Path<String>,
    Json(payload): Json<TeamInput>,
) -> Result<Json<TeamListing>, AppError> {
    payload.validate()?;
    Ok(Json(
        team_service::update_team(&state, &current.session, &team_id, payload).await?,
    ))
}

/// Delete a team document; its roster and games stay in place.
#[utoipa::path(
    delete,
    path = "/teams/{team_id}",
    tag = "teams",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team deleted; first page reloaded", body = TeamListing),
        (status = 404, description = "Team not found")
    )
)]
pub async fn delete_team(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path(team_id): Path<String>,
) -> Result<Json<TeamListing>, AppError> {
    Ok(Json(
        team_service::delete_team(&state, &current.session, &team_id).await?,
    ))
}
