use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Team document stored at `teams/{teamId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeamEntity {
    /// Display name, also the pagination order key.
    pub name: String,
    /// Sport played by the team (e.g. "Basketball").
    pub sport: String,
    /// Home city.
    pub city: String,
}

/// Roster entry stored at `teams/{teamId}/roster/{playerId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerEntity {
    pub name: String,
    pub position: String,
    /// Jersey number.
    #[serde(default)]
    pub number: u32,
}

/// Game document stored under the owning team and mirrored at `games/{gameId}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GameEntity {
    pub opponent: String,
    /// Calendar date formatted as `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub location: String,
    /// `"{team}-{opponent}"` once stats have been entered, empty before.
    #[serde(default)]
    pub score: String,
    /// Back-reference to the owning team.
    pub team_id: String,
}

/// One player's box-score line for one game, stored at
/// `teams/{teamId}/games/{gameId}/stats/{playerId}`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatLineEntity {
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub rebounds: u32,
}

/// Flat copy of a game kept in the root `games` collection for cross-team listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirroredGameEntity {
    #[serde(flatten)]
    pub game: GameEntity,
    /// Stat lines keyed by player id.
    #[serde(default)]
    pub stats: BTreeMap<String, StatLineEntity>,
}

impl MirroredGameEntity {
    /// Sum of the points of every embedded stat line.
    pub fn total_points(&self) -> u64 {
        self.stats.values().map(|line| u64::from(line.points)).sum()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn game_uses_camel_case_team_reference() {
        let game = GameEntity {
            opponent: "Lions".into(),
            date: "2024-03-01".into(),
            location: "TBD".into(),
            score: String::new(),
            team_id: "t1".into(),
        };
        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["teamId"], "t1");
        assert!(value.get("team_id").is_none());
    }

    #[test]
    fn stat_line_defaults_missing_fields_to_zero() {
        let line: StatLineEntity = serde_json::from_value(json!({ "points": 4 })).unwrap();
        assert_eq!(
            line,
            StatLineEntity {
                points: 4,
                assists: 0,
                rebounds: 0
            }
        );
    }

    #[test]
    fn mirror_without_stats_totals_zero() {
        let mirror: MirroredGameEntity = serde_json::from_value(json!({
            "opponent": "Lions",
            "date": "2024-03-01",
            "teamId": "t1"
        }))
        .unwrap();
        assert_eq!(mirror.total_points(), 0);
        assert_eq!(mirror.game.score, "");
    }
}
