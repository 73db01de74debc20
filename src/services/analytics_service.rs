use futures::{StreamExt, stream};
use tracing::{info, warn};

use crate::{
    dao::{
        models::{GameEntity, StatLineEntity},
        paths::CollectionPath,
        repository,
    },
    dto::analytics::AnalyticsSummary,
    error::ServiceError,
    services::{require_store, team_service::require_team},
    state::{
        Session, SharedState,
        workspace::{GameFailure, StatTotals, TeamAnalytics},
    },
};

/// `round(total / games)`, half away from zero; zero when there are no games.
pub fn per_game_average(total: u64, games: usize) -> u64 {
    if games == 0 {
        return 0;
    }
    (total as f64 / games as f64).round() as u64
}

fn averages(totals: StatTotals, games: usize) -> StatTotals {
    StatTotals {
        points: per_game_average(totals.points, games),
        assists: per_game_average(totals.assists, games),
        rebounds: per_game_average(totals.rebounds, games),
    }
}

/// Sum the stats of every game of a team and make it the session's analytics selection.
///
/// A game whose stats cannot be read is reported in `failures` and counts as zero.
pub async fn team_analytics(
    state: &SharedState,
    session: &Session,
    team_id: &str,
) -> Result<AnalyticsSummary, ServiceError> {
    let generation = session.workspace().lock().await.analytics.begin();

    let store = require_store(state).await?;
    let store = store.as_ref();
    let team = require_team(store, team_id).await?;
    let games =
        repository::list::<GameEntity>(store, CollectionPath::team_games(team_id)).await?;
    let total_games = games.len();

    let fetched = stream::iter(games)
        .map(|game| async move {
            let stats = repository::list::<StatLineEntity>(
                store,
                CollectionPath::stats(team_id, &game.id),
            )
            .await;
            (game.id, stats)
        })
        .buffer_unordered(state.config().fan_out_limit)
        .collect::<Vec<_>>()
        .await;

    let mut totals = StatTotals::default();
    let mut failures = Vec::new();
    for (game_id, stats) in fetched {
        match stats {
            Ok(lines) => {
                for line in lines {
                    totals.points += u64::from(line.data.points);
                    totals.assists += u64::from(line.data.assists);
                    totals.rebounds += u64::from(line.data.rebounds);
                }
            }
            Err(err) => {
                warn!(team_id, game_id = %game_id, error = %err, "skipping unreadable game stats");
                failures.push(GameFailure {
                    game_id,
                    message: err.to_string(),
                });
            }
        }
    }
    failures.sort_by(|a, b| a.game_id.cmp(&b.game_id));

    let analytics = TeamAnalytics {
        team_id: team_id.to_owned(),
        team_name: team.data.name,
        total_games,
        totals,
        averages: averages(totals, total_games),
        failures,
    };
    info!(
        team_id,
        total_games,
        failures = analytics.failures.len(),
        "team analytics computed"
    );

    session
        .workspace()
        .lock()
        .await
        .analytics
        .apply(generation, analytics.clone())?;
    Ok(analytics.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_rounds_half_away_from_zero() {
        assert_eq!(per_game_average(0, 0), 0);
        assert_eq!(per_game_average(12, 0), 0);
        assert_eq!(per_game_average(5, 2), 3);
        assert_eq!(per_game_average(7, 3), 2);
        assert_eq!(per_game_average(8, 3), 3);
        assert_eq!(per_game_average(12, 1), 12);
    }
}
