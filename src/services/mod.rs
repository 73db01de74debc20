use std::sync::Arc;

use crate::{dao::doc_store::DocumentStore, error::ServiceError, state::SharedState};

/// Team totals and per-game averages.
pub mod analytics_service;
/// Cross-team game listing.
pub mod dashboard_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Nested game lifecycle.
pub mod game_service;
/// Health check service.
pub mod health_service;
/// Flat `games` collection maintenance.
pub mod index_service;
mod paging;
/// CSV export of a game.
pub mod report_service;
/// Paginated roster management.
pub mod roster_service;
/// Identity provider sign-in flows and the current-user stream.
pub mod session_service;
/// Game selection and stat entry.
pub mod stat_service;
/// Storage connection supervisor with degraded mode.
pub mod storage_supervisor;
/// Paginated team management.
pub mod team_service;

/// Current document store, unless the application runs in degraded mode.
pub(crate) async fn require_store(
    state: &SharedState,
) -> Result<Arc<dyn DocumentStore>, ServiceError> {
    if state.is_degraded() {
        return Err(ServiceError::Degraded);
    }
    state.store().await.ok_or(ServiceError::Degraded)
}
