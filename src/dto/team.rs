use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::{models::TeamEntity, repository::Record};
use crate::dto::validation::validate_not_blank;

/// Fields of a team; every field is required.
#[derive(Debug, Clone, Deserialize, ToSchema, Validate)]
pub struct TeamInput {
    #[validate(custom(function = "validate_not_blank"))]
    pub name: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub sport: String,
    #[validate(custom(function = "validate_not_blank"))]
    pub city: String,
}

impl From<TeamInput> for TeamEntity {
    fn from(input: TeamInput) -> Self {
        Self {
            name: input.name,
            sport: input.sport,
            city: input.city,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct TeamSummary {
    pub id: String,
    pub name: String,
    pub sport: String,
    pub city: String,
}

impl From<Record<TeamEntity>> for TeamSummary {
    fn from(record: Record<TeamEntity>) -> Self {
        Self {
            id: record.id,
            name: record.data.name,
            sport: record.data.sport,
            city: record.data.city,
        }
    }
}

/// Teams loaded so far in this session, ordered by name.
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TeamListing {
    pub teams: Vec<TeamSummary>,
    /// `true` once a page came back shorter than the page size.
    pub exhausted: bool,
    /// Id of the team created by the request, if any.
    pub created_id: Option<String>,
}
