use serde::Serialize;
use utoipa::ToSchema;

use crate::state::workspace::{GameFailure, TeamAnalytics};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameFailureDto {
    pub game_id: String,
    pub message: String,
}

/// Team totals and rounded per-game averages.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AnalyticsSummary {
    pub team_id: String,
    pub team_name: String,
    pub total_games: usize,
    pub total_points: u64,
    pub total_assists: u64,
    pub total_rebounds: u64,
    pub avg_points: u64,
    pub avg_assists: u64,
    pub avg_rebounds: u64,
    /// Games whose stats could not be read; they count as zero.
    pub failures: Vec<GameFailureDto>,
}

impl From<GameFailure> for GameFailureDto {
    fn from(failure: GameFailure) -> Self {
        Self {
            game_id: failure.game_id,
            message: failure.message,
        }
    }
}

impl From<TeamAnalytics> for AnalyticsSummary {
    fn from(analytics: TeamAnalytics) -> Self {
        Self {
            team_id: analytics.team_id,
            team_name: analytics.team_name,
            total_games: analytics.total_games,
            total_points: analytics.totals.points,
            total_assists: analytics.totals.assists,
            total_rebounds: analytics.totals.rebounds,
            avg_points: analytics.averages.points,
            avg_assists: analytics.averages.assists,
            avg_rebounds: analytics.averages.rebounds,
            failures: analytics.failures.into_iter().map(Into::into).collect(),
        }
    }
}
