use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::get,
};

use crate::{error::AppError, services::report_service, state::SharedState};

pub fn router() -> Router<SharedState> {
    Router::new().route(
        "/teams/{team_id}/games/{game_id}/report.csv",
        get(game_report),
    )
}

/// Download the box score of a game as CSV.
#[utoipa::path(
    get,
    path = "/teams/{team_id}/games/{game_id}/report.csv",
    tag = "reports",
    security(("session_token" = [])),
    params(
        ("team_id" = String, Path, description = "Team identifier"),
        ("game_id" = String, Path, description = "Game identifier")
    ),
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 404, description = "Team or game not found")
    )
)]
pub async fn game_report(
    State(state): State<SharedState>,
    Path((team_id, game_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let report = report_service::game_report(&state, &team_id, &game_id).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", report.filename),
        ),
    ];
    Ok((headers, report.body))
}
