use axum::{Router, middleware::from_fn_with_state};

use crate::state::SharedState;

pub mod analytics;
pub mod auth;
pub mod dashboard;
pub mod docs;
pub mod games;
pub mod health;
pub mod reports;
pub mod roster;
pub mod session;
pub mod sse;
pub mod stats;
pub mod teams;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let guarded_router = auth::session_router()
        .merge(sse::router())
        .merge(teams::router())
        .merge(roster::router())
        .merge(games::router())
        .merge(stats::router())
        .merge(analytics::router())
        .merge(reports::router())
        .merge(dashboard::router())
        .route_layer(from_fn_with_state(state.clone(), session::require_session));

    let api_router = health::router()
        .merge(auth::public_router())
        .merge(guarded_router);

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
