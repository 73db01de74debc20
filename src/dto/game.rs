use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::{models::GameEntity, repository::Record};
use crate::dto::validation::{validate_iso_date, validate_not_blank};

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct CreateGameRequest {
    #[validate(custom(function = "validate_not_blank"))]
    pub opponent: String,
    /// Calendar date, `YYYY-MM-DD`.
    #[validate(custom(function = "validate_iso_date"))]
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: String,
    pub team_id: String,
    pub opponent: String,
    pub date: String,
    pub location: String,
    /// `"{team}-{opponent}"`, empty until stats are entered.
    pub score: String,
}

impl From<Record<GameEntity>> for GameSummary {
    fn from(record: Record<GameEntity>) -> Self {
        Self {
            id: record.id,
            team_id: record.data.team_id,
            opponent: record.data.opponent,
            date: record.data.date,
            location: record.data.location,
            score: record.data.score,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameList {
    pub team_id: String,
    /// Ordered by date.
    pub games: Vec<GameSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameCreated {
    pub game: GameSummary,
    /// `false` when the flat `games` copy could not be written.
    pub mirror_synced: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GameDeleted {
    pub game_id: String,
    pub stats_deleted: usize,
}

/// A document the index rebuild could not process.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IndexFailure {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IndexRebuildReport {
    /// Mirrors regenerated from their nested game.
    pub mirrored: usize,
    /// Mirrors removed because their nested game no longer exists.
    pub orphans_removed: usize,
    pub failures: Vec<IndexFailure>,
}
