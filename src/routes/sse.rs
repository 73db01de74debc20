use std::convert::Infallible;

use axum::{Extension, Router, response::sse::Sse, routing::get};
use futures::Stream;
use tracing::info;

use crate::{
    routes::session::CurrentSession, services::session_service, state::SharedState,
};

#[utoipa::path(
    get,
    path = "/sse/session",
    tag = "auth",
    security(("session_token" = [])),
    responses((status = 200, description = "Current-user stream of the session", content_type = "text/event-stream", body = String))
)]
/// Stream the session's current user, then every change until sign-out.
pub async fn session_stream(
    Extension(current): Extension<CurrentSession>,
) -> Sse<impl Stream<Item = Result<axum::response::sse::Event, Infallible>>> {
    info!(uid = %current.user.uid, "new session SSE connection");
    session_service::to_sse_stream(current.session.subscribe())
}

/// Configure the SSE endpoints.
pub fn router() -> Router<SharedState> {
    Router::<SharedState>::new().route("/sse/session", get(session_stream))
}
