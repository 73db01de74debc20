//! Per-session UI state: listings and selections.

use indexmap::IndexMap;
use serde::Serialize;

use super::{listing::PagedListing, selection::Selection};
use crate::dao::{
    models::{PlayerEntity, StatLineEntity, TeamEntity},
    repository::Record,
};

/// Game picked for stat entry, with the stat line of every roster player.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedGame {
    pub team_id: String,
    pub game_id: String,
    /// Stat lines keyed by player id, in roster order.
    pub stats: IndexMap<String, StatLineEntity>,
}

impl SelectedGame {
    pub fn is(&self, team_id: &str, game_id: &str) -> bool {
        self.team_id == team_id && self.game_id == game_id
    }

    /// Team score: sum of the points of every known stat line.
    pub fn team_points(&self) -> u64 {
        self.stats.values().map(|line| u64::from(line.points)).sum()
    }
}

/// Points, assists and rebounds summed or averaged over a set of games.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatTotals {
    pub points: u64,
    pub assists: u64,
    pub rebounds: u64,
}

/// A game whose stats could not be read during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameFailure {
    pub game_id: String,
    pub message: String,
}

/// Aggregated stats of one team across all its games.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamAnalytics {
    pub team_id: String,
    pub team_name: String,
    pub total_games: usize,
    pub totals: StatTotals,
    pub averages: StatTotals,
    pub failures: Vec<GameFailure>,
}

#[derive(Debug, Default)]
pub struct Workspace {
    pub teams: PagedListing<Record<TeamEntity>>,
    /// Roster of the team named by the listing scope.
    pub roster: PagedListing<Record<PlayerEntity>>,
    pub game: Selection<SelectedGame>,
    pub analytics: Selection<TeamAnalytics>,
}
