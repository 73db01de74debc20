use serde::Serialize;
use utoipa::ToSchema;

/// Body of the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Whether a document store is installed and answered the last ping.
    pub storage_reachable: bool,
    /// Number of open sessions.
    pub sessions: usize,
}

impl HealthResponse {
    pub fn new(storage_reachable: bool, sessions: usize) -> Self {
        Self {
            status: if storage_reachable { "ok" } else { "degraded" }.to_owned(),
            storage_reachable,
            sessions,
        }
    }
}
