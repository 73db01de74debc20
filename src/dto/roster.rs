use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::{models::PlayerEntity, repository::Record};
use crate::dto::validation::validate_not_blank;

#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct PlayerInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub position: String,
    /// Jersey number.
    pub number: u32,
}

impl From<PlayerInput> for PlayerEntity {
    fn from(input: PlayerInput) -> Self {
        Self {
            name: input.name,
            position: input.position,
            number: input.number,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PlayerSummary {
    pub id: String,
    pub name: String,
    pub position: String,
    pub number: u32,
}

impl From<Record<PlayerEntity>> for PlayerSummary {
    fn from(record: Record<PlayerEntity>) -> Self {
        Self {
            id: record.id,
            name: record.data.name,
            position: record.data.position,
            number: record.data.number,
        }
    }
}

/// Players of one team loaded so far in this session, ordered by name.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RosterListing {
    pub team_id: String,
    pub players: Vec<PlayerSummary>,
    pub exhausted: bool,
    /// Id of the player created by the request, if any.
    pub created_id: Option<String>,
}
