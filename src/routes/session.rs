//! Session route guard.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};

use crate::{
    error::AppError,
    identity::AuthUser,
    services::session_service,
    state::{Session, SharedState},
};

pub const SESSION_TOKEN_HEADER: &str = "x-session-token";

/// Signed-in session attached to guarded requests by [`require_session`].
#[derive(Clone)]
pub struct CurrentSession {
    pub session: Arc<Session>,
    pub user: AuthUser,
}

/// Value of the session token header, if present.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
}

/// Reject requests without a session whose current user is set; record activity otherwise.
pub async fn require_session(
    State(state): State<SharedState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let (session, user) = session_service::authenticated(&state, session_token(req.headers()))?;
    session.touch();
    req.extensions_mut().insert(CurrentSession { session, user });
    Ok(next.run(req).await)
}
