use futures::{StreamExt, TryStreamExt, stream};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    dao::{
        models::StatLineEntity,
        paths::DocPath,
        repository,
    },
    dto::stats::{GameSelection, PlayerStatLine, StatLineInput, StatsSaved},
    error::ServiceError,
    services::{
        game_service::{game_stats, require_game},
        index_service, require_store,
        roster_service::full_roster,
    },
    state::{Session, SharedState, workspace::SelectedGame},
};

#[derive(Serialize)]
struct ScoreUpdate<'a> {
    score: &'a str,
}

fn lines(stats: &IndexMap<String, StatLineEntity>) -> Vec<PlayerStatLine> {
    stats
        .iter()
        .map(|(player_id, line)| PlayerStatLine::new(player_id.as_str(), *line))
        .collect()
}

/// Toggle the selected game of the session.
///
/// Selecting loads one stat line per roster player, zero for players without
/// a stat document. Selecting the already selected game clears the selection.
pub async fn select_game(
    state: &SharedState,
    session: &Session,
    team_id: &str,
    game_id: &str,
) -> Result<GameSelection, ServiceError> {
    let generation = {
        let mut workspace = session.workspace().lock().await;
        if workspace
            .game
            .current()
            .is_some_and(|selected| selected.is(team_id, game_id))
        {
            workspace.game.clear();
            debug!(team_id, game_id, "game deselected");
            return Ok(GameSelection {
                team_id: team_id.to_owned(),
                game_id: game_id.to_owned(),
                selected: false,
                stats: Vec::new(),
            });
        }
        workspace.game.begin()
    };

    let store = require_store(state).await?;
    let store = store.as_ref();
    require_game(store, team_id, game_id).await?;
    let roster = full_roster(store, team_id).await?;

    let stats = stream::iter(roster)
        .map(|player| async move {
            let line = repository::fetch::<StatLineEntity>(
                store,
                DocPath::stat(team_id, game_id, &player.id),
            )
            .await?
            .map(|record| record.data)
            .unwrap_or_default();
            Ok::<_, ServiceError>((player.id, line))
        })
        .buffered(state.config().fan_out_limit)
        .try_collect::<IndexMap<_, _>>()
        .await?;

    let response = GameSelection {
        team_id: team_id.to_owned(),
        game_id: game_id.to_owned(),
        selected: true,
        stats: lines(&stats),
    };

    let mut workspace = session.workspace().lock().await;
    workspace.game.apply(
        generation,
        SelectedGame {
            team_id: team_id.to_owned(),
            game_id: game_id.to_owned(),
            stats,
        },
    )?;
    Ok(response)
}

/// Store one player's stat line and recompute the game score.
///
/// The score is `"{team points}-{opponent placeholder}"` and is written to the
/// nested game and to its mirror.
pub async fn save_stats(
    state: &SharedState,
    session: &Session,
    team_id: &str,
    game_id: &str,
    player_id: &str,
    input: StatLineInput,
) -> Result<StatsSaved, ServiceError> {
    let store = require_store(state).await?;
    let store = store.as_ref();
    require_game(store, team_id, game_id).await?;

    let line = StatLineEntity::from(input);
    repository::put(store, DocPath::stat(team_id, game_id, player_id), &line).await?;

    let selected_points = {
        let mut workspace = session.workspace().lock().await;
        match workspace.game.current_mut() {
            Some(selected) if selected.is(team_id, game_id) => {
                selected.stats.insert(player_id.to_owned(), line);
                Some(selected.team_points())
            }
            _ => None,
        }
    };
    let team_points = match selected_points {
        Some(points) => points,
        None => game_stats(store, team_id, game_id)
            .await?
            .iter()
            .map(|record| u64::from(record.data.points))
            .sum(),
    };

    let score = format!(
        "{team_points}-{}",
        state.config().placeholder_opponent_score
    );
    let updated = repository::merge(
        store,
        DocPath::team_game(team_id, game_id),
        &ScoreUpdate { score: &score },
    )
    .await?;
    if !updated {
        return Err(ServiceError::NotFound(format!(
            "game `{game_id}` not found in team `{team_id}`"
        )));
    }
    let mirror_synced = index_service::sync_mirror(store, team_id, game_id).await;
    info!(team_id, game_id, player_id, %score, mirror_synced, "stats saved");

    Ok(StatsSaved {
        stats: PlayerStatLine::new(player_id, line),
        score,
        mirror_synced,
    })
}

/// Read one player's stat line; zero when nothing was recorded.
pub async fn get_stats(
    state: &SharedState,
    team_id: &str,
    game_id: &str,
    player_id: &str,
) -> Result<PlayerStatLine, ServiceError> {
    let store = require_store(state).await?;
    let line = repository::fetch::<StatLineEntity>(
        store.as_ref(),
        DocPath::stat(team_id, game_id, player_id),
    )
    .await?
    .map(|record| record.data)
    .unwrap_or_default();
    Ok(PlayerStatLine::new(player_id, line))
}
