use serde::Serialize;
use serde_with::skip_serializing_none;
use utoipa::ToSchema;

use crate::dao::{models::MirroredGameEntity, repository::Record};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DashboardGame {
    pub id: String,
    pub team_id: String,
    pub opponent: String,
    pub date: String,
    pub location: String,
    pub score: String,
    /// Sum of the points of every embedded stat line.
    pub total_points: u64,
}

impl From<Record<MirroredGameEntity>> for DashboardGame {
    fn from(record: Record<MirroredGameEntity>) -> Self {
        let total_points = record.data.total_points();
        let game = record.data.game;
        Self {
            id: record.id,
            team_id: game.team_id,
            opponent: game.opponent,
            date: game.date,
            location: game.location,
            score: game.score,
            total_points,
        }
    }
}

#[skip_serializing_none]
#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardResponse {
    pub display_name: Option<String>,
    pub games: Vec<DashboardGame>,
}
