use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::analytics::AnalyticsSummary, error::AppError, routes::session::CurrentSession,
    services::analytics_service, state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/teams/{team_id}/analytics", get(team_analytics))
}

/// Season totals and per-game averages of a team.
#[utoipa::path(
    get,
    path = "/teams/{team_id}/analytics",
    tag = "reports",
    security(("session_token" = [])),
    params(("team_id" = String, Path, description = "Team identifier")),
    responses(
        (status = 200, description = "Team analytics", body = AnalyticsSummary),
        (status = 404, description = "Team not found"),
        (status = 409, description = "A newer analytics request superseded this one")
    )
)]
pub async fn team_analytics(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
    Path(team_id): Path<String>,
) -> Result<Json<AnalyticsSummary>, AppError> {
    Ok(Json(
        analytics_service::team_analytics(&state, &current.session, &team_id).await?,
    ))
}
