//! Document path contract shared by every storage backend.
//!
//! Paths alternate collection and document segments, e.g.
//! `teams/{teamId}/games/{gameId}/stats/{playerId}`. The rendered strings are
//! the storage keys, so they must not change shape.

use std::fmt;

use rand::Rng;
use thiserror::Error;

const TEAMS: &str = "teams";
const ROSTER: &str = "roster";
const GAMES: &str = "games";
const STATS: &str = "stats";

const AUTO_ID_LENGTH: usize = 20;
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Rejected document path or identifier.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("document id must not be empty")]
    EmptyId,
    #[error("document id `{0}` must not contain `/`")]
    Separator(String),
    #[error("`{0}` is not a document path")]
    Malformed(String),
}

/// Path of a collection (an odd number of segments).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

/// Path of a single document inside a collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocPath {
    collection: CollectionPath,
    id: String,
}

impl CollectionPath {
    /// Root `teams` collection.
    pub fn teams() -> Self {
        Self(TEAMS.to_owned())
    }

    /// `teams/{teamId}/roster`.
    pub fn roster(team_id: &str) -> Self {
        Self(format!("{TEAMS}/{team_id}/{ROSTER}"))
    }

    /// `teams/{teamId}/games`.
    pub fn team_games(team_id: &str) -> Self {
        Self(format!("{TEAMS}/{team_id}/{GAMES}"))
    }

    /// `teams/{teamId}/games/{gameId}/stats`.
    pub fn stats(team_id: &str, game_id: &str) -> Self {
        Self(format!("{TEAMS}/{team_id}/{GAMES}/{game_id}/{STATS}"))
    }

    /// Root `games` collection holding the cross-team mirror.
    pub fn mirrored_games() -> Self {
        Self(GAMES.to_owned())
    }

    /// Build the path of a document living in this collection.
    pub fn doc(&self, id: impl Into<String>) -> DocPath {
        DocPath {
            collection: self.clone(),
            id: id.into(),
        }
    }

    /// Build the path of a new document with a freshly generated id.
    pub fn new_doc(&self) -> DocPath {
        self.doc(auto_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl DocPath {
    /// `teams/{teamId}`.
    pub fn team(team_id: &str) -> Self {
        CollectionPath::teams().doc(team_id)
    }

    /// `teams/{teamId}/roster/{playerId}`.
    pub fn player(team_id: &str, player_id: &str) -> Self {
        CollectionPath::roster(team_id).doc(player_id)
    }

    /// `teams/{teamId}/games/{gameId}`.
    pub fn team_game(team_id: &str, game_id: &str) -> Self {
        CollectionPath::team_games(team_id).doc(game_id)
    }

    /// `teams/{teamId}/games/{gameId}/stats/{playerId}`.
    pub fn stat(team_id: &str, game_id: &str, player_id: &str) -> Self {
        CollectionPath::stats(team_id, game_id).doc(player_id)
    }

    /// `games/{gameId}`.
    pub fn mirrored_game(game_id: &str) -> Self {
        CollectionPath::mirrored_games().doc(game_id)
    }

    /// Rebuild a path from its rendered form, as stored by the backends.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        let segments = raw.split('/').collect::<Vec<_>>();
        if segments.len() < 2 || segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty())
        {
            return Err(PathError::Malformed(raw.to_owned()));
        }

        let (collection, id) = raw
            .rsplit_once('/')
            .ok_or_else(|| PathError::Malformed(raw.to_owned()))?;
        Ok(Self {
            collection: CollectionPath(collection.to_owned()),
            id: id.to_owned(),
        })
    }

    pub fn collection(&self) -> &CollectionPath {
        &self.collection
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Reject identifiers that would break out of their path segment.
pub fn check_id(id: &str) -> Result<(), PathError> {
    if id.is_empty() {
        return Err(PathError::EmptyId);
    }
    if id.contains('/') {
        return Err(PathError::Separator(id.to_owned()));
    }
    Ok(())
}

/// Generate a 20 character alphanumeric document id.
pub fn auto_id() -> String {
    let mut rng = rand::rng();
    (0..AUTO_ID_LENGTH)
        .map(|_| AUTO_ID_ALPHABET[rng.random_range(0..AUTO_ID_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_render_the_storage_contract() {
        assert_eq!(DocPath::team("t1").to_string(), "teams/t1");
        assert_eq!(DocPath::player("t1", "p1").to_string(), "teams/t1/roster/p1");
        assert_eq!(DocPath::team_game("t1", "g1").to_string(), "teams/t1/games/g1");
        assert_eq!(
            DocPath::stat("t1", "g1", "p1").to_string(),
            "teams/t1/games/g1/stats/p1"
        );
        assert_eq!(DocPath::mirrored_game("g1").to_string(), "games/g1");
    }

    #[test]
    fn parse_splits_collection_and_id() {
        let path = DocPath::parse("teams/t1/games/g1/stats/p1").unwrap();
        assert_eq!(path.collection().as_str(), "teams/t1/games/g1/stats");
        assert_eq!(path.id(), "p1");
        assert_eq!(path, DocPath::stat("t1", "g1", "p1"));
    }

    #[test]
    fn parse_rejects_collection_paths() {
        assert!(DocPath::parse("teams").is_err());
        assert!(DocPath::parse("teams/t1/roster").is_err());
        assert!(DocPath::parse("teams//roster/p1").is_err());
    }

    #[test]
    fn check_id_rejects_separators() {
        assert!(check_id("abc").is_ok());
        assert_eq!(check_id(""), Err(PathError::EmptyId));
        assert!(matches!(check_id("a/b"), Err(PathError::Separator(_))));
    }

    #[test]
    fn auto_ids_are_alphanumeric() {
        let id = auto_id();
        assert_eq!(id.len(), AUTO_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(id, auto_id());
    }
}
