use axum::{Extension, Json, Router, extract::State, routing::get};

use crate::{
    dto::dashboard::DashboardResponse, error::AppError, routes::session::CurrentSession,
    services::dashboard_service, state::SharedState,
};

pub fn router() -> Router<SharedState> {
    Router::new().route("/dashboard/games", get(dashboard))
}

/// Every mirrored game with its total points, greeting the signed-in user.
#[utoipa::path(
    get,
    path = "/dashboard/games",
    tag = "reports",
    security(("session_token" = [])),
    responses((status = 200, description = "Dashboard", body = DashboardResponse))
)]
pub async fn dashboard(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<Json<DashboardResponse>, AppError> {
    Ok(Json(
        dashboard_service::dashboard(&state, &current.user).await?,
    ))
}
