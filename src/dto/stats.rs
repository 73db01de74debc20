use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::StatLineEntity;

/// Box-score line submitted for one player. Missing values count as zero.
#[derive(Debug, Clone, Copy, Default, Deserialize, ToSchema, Validate)]
pub struct StatLineInput {
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub rebounds: u32,
}

impl From<StatLineInput> for StatLineEntity {
    fn from(input: StatLineInput) -> Self {
        Self {
            points: input.points,
            assists: input.assists,
            rebounds: input.rebounds,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerStatLine {
    pub player_id: String,
    pub points: u32,
    pub assists: u32,
    pub rebounds: u32,
}

impl PlayerStatLine {
    pub fn new(player_id: impl Into<String>, line: StatLineEntity) -> Self {
        Self {
            player_id: player_id.into(),
            points: line.points,
            assists: line.assists,
            rebounds: line.rebounds,
        }
    }
}

/// Result of toggling the selected game.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSelection {
    pub team_id: String,
    pub game_id: String,
    /// `false` when the request deselected the game.
    pub selected: bool,
    /// One line per roster player, in roster order; empty when deselected.
    pub stats: Vec<PlayerStatLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsSaved {
    pub stats: PlayerStatLine,
    /// Score written to the game and its mirror.
    pub score: String,
    pub mirror_synced: bool,
}
