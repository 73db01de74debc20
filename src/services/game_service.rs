use tracing::{info, warn};

use crate::{
    dao::{
        doc_store::DocumentStore,
        models::{GameEntity, StatLineEntity},
        paths::{CollectionPath, DocPath},
        repository::{self, Record},
    },
    dto::game::{CreateGameRequest, GameCreated, GameDeleted, GameList, GameSummary},
    error::ServiceError,
    services::{index_service, require_store, team_service::require_team},
    state::{Session, SharedState},
};

/// Location recorded for newly scheduled games.
const DEFAULT_LOCATION: &str = "TBD";

/// List the games of a team ordered by date, then id.
pub async fn load_games(state: &SharedState, team_id: &str) -> Result<GameList, ServiceError> {
    let store = require_store(state).await?;
    let mut games =
        repository::list::<GameEntity>(store.as_ref(), CollectionPath::team_games(team_id))
            .await?;
    games.sort_by(|a, b| (&a.data.date, &a.id).cmp(&(&b.data.date, &b.id)));

    Ok(GameList {
        team_id: team_id.to_owned(),
        games: games.into_iter().map(GameSummary::from).collect(),
    })
}

/// Write the nested game, then derive its mirror in the flat collection.
///
/// A mirror failure keeps the nested game and is reported through `mirror_synced`.
pub async fn create_game(
    state: &SharedState,
    team_id: &str,
    request: CreateGameRequest,
) -> Result<GameCreated, ServiceError> {
    let store = require_store(state).await?;
    require_team(store.as_ref(), team_id).await?;

    let game = GameEntity {
        opponent: request.opponent,
        date: request.date,
        location: DEFAULT_LOCATION.to_owned(),
        score: String::new(),
        team_id: team_id.to_owned(),
    };
    let game_id =
        repository::insert(store.as_ref(), &CollectionPath::team_games(team_id), &game).await?;
    info!(team_id, game_id = %game_id, "game created");

    let mirror_synced = index_service::sync_mirror(store.as_ref(), team_id, &game_id).await;

    Ok(GameCreated {
        game: Record { id: game_id, data: game }.into(),
        mirror_synced,
    })
}

/// Delete the stats of a game one by one, then the game itself.
///
/// The mirror in the flat collection is left behind.
pub async fn delete_game(
    state: &SharedState,
    session: &Session,
    team_id: &str,
    game_id: &str,
) -> Result<GameDeleted, ServiceError> {
    let store = require_store(state).await?;
    require_game(store.as_ref(), team_id, game_id).await?;

    let stats = store.list(CollectionPath::stats(team_id, game_id)).await?;
    let mut stats_deleted = 0;
    for stat in stats {
        if store.delete(stat.path).await? {
            stats_deleted += 1;
        }
    }
    store.delete(DocPath::team_game(team_id, game_id)).await?;
    info!(team_id, game_id, stats_deleted, "game deleted");

    {
        let mut workspace = session.workspace().lock().await;
        if workspace
            .game
            .current()
            .is_some_and(|selected| selected.is(team_id, game_id))
        {
            workspace.game.clear();
        }
    }

    Ok(GameDeleted {
        game_id: game_id.to_owned(),
        stats_deleted,
    })
}

/// Fetch one nested game, failing with `NotFound` when it does not exist.
pub(crate) async fn require_game(
    store: &dyn DocumentStore,
    team_id: &str,
    game_id: &str,
) -> Result<Record<GameEntity>, ServiceError> {
    repository::fetch::<GameEntity>(store, DocPath::team_game(team_id, game_id))
        .await?
        .ok_or_else(|| {
            ServiceError::NotFound(format!("game `{game_id}` not found in team `{team_id}`"))
        })
}

/// Stat lines of one game keyed by player id.
pub(crate) async fn game_stats(
    store: &dyn DocumentStore,
    team_id: &str,
    game_id: &str,
) -> Result<Vec<Record<StatLineEntity>>, ServiceError> {
    repository::list::<StatLineEntity>(store, CollectionPath::stats(team_id, game_id))
        .await
        .map_err(|err| {
            warn!(team_id, game_id, error = %err, "failed to read game stats");
            err.into()
        })
}
