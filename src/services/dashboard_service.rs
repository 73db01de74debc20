use tracing::debug;

use crate::{
    dao::{models::MirroredGameEntity, paths::CollectionPath, repository},
    dto::dashboard::{DashboardGame, DashboardResponse},
    error::ServiceError,
    identity::AuthUser,
    services::require_store,
    state::SharedState,
};

/// Every game of the flat collection with the points summed from its embedded stats.
pub async fn dashboard(
    state: &SharedState,
    user: &AuthUser,
) -> Result<DashboardResponse, ServiceError> {
    let store = require_store(state).await?;
    let mut games =
        repository::list::<MirroredGameEntity>(store.as_ref(), CollectionPath::mirrored_games())
            .await?;
    games.sort_by(|a, b| (&a.data.game.date, &a.id).cmp(&(&b.data.game.date, &b.id)));
    debug!(games = games.len(), "dashboard loaded");

    Ok(DashboardResponse {
        display_name: user.display_name.clone(),
        games: games.into_iter().map(DashboardGame::from).collect(),
    })
}
