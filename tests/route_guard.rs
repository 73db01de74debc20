use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
    response::Response,
    routing::post,
};
use serde_json::{Value, json};
use tower::util::ServiceExt;

use stat_tracker_back::{
    config::AppConfig,
    dao::doc_store::memory::MemoryDocumentStore,
    error::{AppError, ServiceError},
    identity::memory::MemoryIdentityProvider,
    routes::{self, session::SESSION_TOKEN_HEADER},
    state::{AppState, SharedState, StaleSelection},
};

async fn app_state() -> SharedState {
    let state = AppState::new(
        AppConfig::default(),
        Arc::new(MemoryIdentityProvider::new()),
    );
    state
        .install_store(Arc::new(MemoryDocumentStore::new()))
        .await;
    state
}

fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(SESSION_TOKEN_HEADER, token);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(state: &SharedState, request: Request<Body>) -> Response {
    routes::router(state.clone()).oneshot(request).await.unwrap()
}

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn register(state: &SharedState) -> String {
    let payload = json!({
        "first_name": "Casey",
        "last_name": "Jordan",
        "email": "casey@example.com",
        "password": "secret1",
    });
    let response = send(
        state,
        Request::builder()
            .method("POST")
            .uri("/auth/register")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    json_body(response).await["token"]
        .as_str()
        .unwrap()
        .to_owned()
}

#[tokio::test]
async fn guarded_routes_require_a_token() {
    let state = app_state().await;
    let response = send(&state, request("GET", "/teams", None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "unauthorized: missing session token");
}

#[tokio::test]
async fn unknown_tokens_are_rejected() {
    let state = app_state().await;
    let response = send(&state, request("GET", "/auth/me", Some("not-a-session"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "unauthorized: unknown session");
}

#[tokio::test]
async fn sessions_without_a_user_are_rejected() {
    let state = app_state().await;
    let session = state.sessions().open();
    let response = send(&state, request("GET", "/teams", Some(session.token()))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "unauthorized: signed out");
}

#[tokio::test]
async fn signed_in_tokens_pass_until_logout() {
    let state = app_state().await;
    let token = register(&state).await;

    let response = send(&state, request("GET", "/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["email"], "casey@example.com");

    let response = send(&state, request("GET", "/teams", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&state, request("POST", "/auth/logout", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&state, request("GET", "/teams", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn guarded_requests_refresh_session_activity() {
    let state = app_state().await;
    let token = register(&state).await;
    let session = state.sessions().get(&token).unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(session.idle_for() >= std::time::Duration::from_millis(50));

    let response = send(&state, request("GET", "/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(session.idle_for() < std::time::Duration::from_millis(50));
}

#[tokio::test]
async fn superseded_selection_answers_conflict() {
    let app = Router::new().route(
        "/select",
        post(|| async {
            Err::<(), AppError>(ServiceError::from(StaleSelection { expected: 1, actual: 2 }).into())
        }),
    );
    let response = app
        .oneshot(request("POST", "/select", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        json_body(response).await["message"],
        "conflict: selection changed while loading (expected generation 1, now 2)"
    );
}
