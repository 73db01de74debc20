use tracing::warn;

use crate::{dto::health::HealthResponse, state::SharedState};

/// Ping the store and report `ok` or `degraded`, logging connectivity issues.
pub async fn health_status(state: &SharedState) -> HealthResponse {
    let reachable = match state.store().await {
        Some(store) => match store.health_check().await {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "storage health check failed");
                false
            }
        },
        None => {
            warn!("storage unavailable (degraded mode)");
            false
        }
    };

    HealthResponse::new(reachable && !state.is_degraded(), state.sessions().len())
}
