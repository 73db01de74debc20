//! Maintenance of the flat `games` collection.
//!
//! Each mirror is derived from its nested game: same id, same fields, plus the
//! stat lines of the game embedded under `stats`.

use std::collections::{BTreeMap, HashSet};

use futures::{StreamExt, stream};
use tracing::{info, warn};

use crate::{
    dao::{
        doc_store::DocumentStore,
        models::{GameEntity, MirroredGameEntity, StatLineEntity, TeamEntity},
        paths::{CollectionPath, DocPath},
        repository,
        storage::StorageResult,
    },
    dto::game::{IndexFailure, IndexRebuildReport},
    error::ServiceError,
    services::require_store,
    state::SharedState,
};

/// Regenerate the mirror of one nested game.
///
/// Returns `false` when the nested game does not exist, in which case nothing is written.
pub async fn mirror_from_source(
    store: &dyn DocumentStore,
    team_id: &str,
    game_id: &str,
) -> StorageResult<bool> {
    let Some(game) =
        repository::fetch::<GameEntity>(store, DocPath::team_game(team_id, game_id)).await?
    else {
        return Ok(false);
    };

    let stats = repository::list::<StatLineEntity>(store, CollectionPath::stats(team_id, game_id))
        .await?
        .into_iter()
        .map(|record| (record.id, record.data))
        .collect::<BTreeMap<_, _>>();

    let mirror = MirroredGameEntity {
        game: game.data,
        stats,
    };
    repository::put(store, DocPath::mirrored_game(game_id), &mirror).await?;
    Ok(true)
}

/// [`mirror_from_source`] for callers that keep going when the mirror is stale.
///
/// Returns whether the mirror is in sync with its source.
pub async fn sync_mirror(store: &dyn DocumentStore, team_id: &str, game_id: &str) -> bool {
    match mirror_from_source(store, team_id, game_id).await {
        Ok(synced) => synced,
        Err(err) => {
            warn!(team_id, game_id, error = %err, "failed to update game mirror");
            false
        }
    }
}

/// Regenerate every mirror from the nested games and drop mirrors without a source.
pub async fn rebuild_game_index(state: &SharedState) -> Result<IndexRebuildReport, ServiceError> {
    let store = require_store(state).await?;
    let store = store.as_ref();
    let fan_out = state.config().fan_out_limit;
    let mut failures = Vec::new();

    let teams = repository::list::<TeamEntity>(store, CollectionPath::teams()).await?;

    let listed = stream::iter(teams.into_iter().map(|team| team.id))
        .map(|team_id| async move {
            let games = store.list(CollectionPath::team_games(&team_id)).await;
            (team_id, games)
        })
        .buffer_unordered(fan_out)
        .collect::<Vec<_>>()
        .await;

    let mut sources = Vec::new();
    let mut unreadable_teams = HashSet::new();
    for (team_id, games) in listed {
        match games {
            Ok(games) => sources.extend(
                games
                    .into_iter()
                    .map(|game| (team_id.clone(), game.id().to_owned())),
            ),
            Err(err) => {
                failures.push(IndexFailure {
                    path: CollectionPath::team_games(&team_id).to_string(),
                    message: err.to_string(),
                });
                unreadable_teams.insert(team_id);
            }
        }
    }

    let results = stream::iter(sources.clone())
        .map(|(team_id, game_id)| async move {
            let result = mirror_from_source(store, &team_id, &game_id).await;
            (team_id, game_id, result)
        })
        .buffer_unordered(fan_out)
        .collect::<Vec<_>>()
        .await;

    let mut mirrored = 0;
    for (team_id, game_id, result) in results {
        match result {
            Ok(true) => mirrored += 1,
            Ok(false) => {}
            Err(err) => failures.push(IndexFailure {
                path: DocPath::team_game(&team_id, &game_id).to_string(),
                message: err.to_string(),
            }),
        }
    }

    let live = sources
        .iter()
        .map(|(_, game_id)| game_id.as_str())
        .collect::<HashSet<_>>();

    let mut orphans_removed = 0;
    for document in store.list(CollectionPath::mirrored_games()).await? {
        if live.contains(document.id()) {
            continue;
        }
        let owner = match document.decode::<MirroredGameEntity>() {
            Ok(mirror) => mirror.game.team_id,
            Err(err) => {
                failures.push(IndexFailure {
                    path: document.path.to_string(),
                    message: err.to_string(),
                });
                continue;
            }
        };
        if unreadable_teams.contains(&owner) {
            continue;
        }
        match store.delete(document.path.clone()).await {
            Ok(_) => orphans_removed += 1,
            Err(err) => failures.push(IndexFailure {
                path: document.path.to_string(),
                message: err.to_string(),
            }),
        }
    }

    info!(
        mirrored,
        orphans_removed,
        failures = failures.len(),
        "game index rebuilt"
    );
    Ok(IndexRebuildReport {
        mirrored,
        orphans_removed,
        failures,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig, dao::doc_store::memory::MemoryDocumentStore,
        identity::memory::MemoryIdentityProvider, state::AppState,
    };

    fn assert_send<T: Send>(_: &T) {}

    #[tokio::test]
    async fn rebuild_runs_as_a_send_future() {
        let state = AppState::new(
            AppConfig::default(),
            Arc::new(MemoryIdentityProvider::new()),
        );
        state
            .install_store(Arc::new(MemoryDocumentStore::new()))
            .await;

        let rebuild = rebuild_game_index(&state);
        assert_send(&rebuild);
        drop(rebuild);
        let report = tokio::spawn({
            let state = state.clone();
            async move { rebuild_game_index(&state).await }
        })
        .await
        .unwrap()
        .unwrap();
        assert_eq!(report.mirrored, 0);
        assert_eq!(report.orphans_removed, 0);
    }
}
