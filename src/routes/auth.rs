use axum::{
    Extension, Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::auth::{
        LoginRequest, OAuthRequest, PasswordResetRequest, RegisterRequest, SessionResponse,
        UserSummary,
    },
    error::AppError,
    routes::session::{CurrentSession, session_token},
    services::session_service,
    state::SharedState,
};

/// Sign-in entry points, reachable without a session.
pub fn public_router() -> Router<SharedState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/oauth", post(oauth))
        .route("/auth/password-reset", post(password_reset))
}

/// Routes acting on the caller's signed-in session.
pub fn session_router() -> Router<SharedState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Account created and signed in", body = SessionResponse),
        (status = 400, description = "Invalid form or provider rejection")
    )
)]
pub async fn register(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        session_service::register(&state, session_token(&headers), payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionResponse),
        (status = 401, description = "Credentials refused by the identity provider")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        session_service::login(&state, session_token(&headers), payload).await?,
    ))
}

/// Exchange an OAuth credential (Google by default) for a session.
#[utoipa::path(
    post,
    path = "/auth/oauth",
    tag = "auth",
    request_body = OAuthRequest,
    responses((status = 200, description = "Signed in", body = SessionResponse))
)]
pub async fn oauth(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<OAuthRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(
        session_service::sign_in_with_oauth(&state, session_token(&headers), payload).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/auth/password-reset",
    tag = "auth",
    request_body = PasswordResetRequest,
    responses((status = 204, description = "Reset email sent"))
)]
pub async fn password_reset(
    State(state): State<SharedState>,
    Json(payload): Json<PasswordResetRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    session_service::forgot_password(&state, payload).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "auth",
    security(("session_token" = [])),
    responses((status = 204, description = "Signed out; the token is no longer valid"))
)]
pub async fn logout(
    State(state): State<SharedState>,
    Extension(current): Extension<CurrentSession>,
) -> Result<StatusCode, AppError> {
    session_service::logout(&state, current.session.token())?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "auth",
    security(("session_token" = [])),
    responses((status = 200, description = "Current user", body = UserSummary))
)]
pub async fn me(Extension(current): Extension<CurrentSession>) -> Json<UserSummary> {
    Json(current.user.into())
}
