//! CSV export of one game's box score.

use std::collections::HashMap;

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::{Serialize, Serializer};
use tracing::info;

use crate::{
    dao::models::StatLineEntity,
    error::ServiceError,
    services::{
        game_service::{game_stats, require_game},
        require_store,
        roster_service::full_roster,
        team_service::require_team,
    },
    state::SharedState,
};

const HEADER: [&str; 10] = [
    "Team",
    "Game Date",
    "Opponent",
    "Player Name",
    "Number",
    "Position",
    "Points",
    "Assists",
    "Rebounds",
    "Score",
];

/// Generated report, ready to be sent as a download.
#[derive(Debug, Clone)]
pub struct CsvReport {
    pub filename: String,
    pub body: String,
}

/// Text column, always between double quotes with embedded quotes doubled,
/// whatever its content looks like.
struct Text<'a>(&'a str);

impl Serialize for Text<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("\"{}\"", self.0.replace('"', "\"\"")))
    }
}

/// One CSV row; text fields are quoted, numbers are not.
#[derive(Serialize)]
struct ReportRow<'a> {
    team: Text<'a>,
    date: Text<'a>,
    opponent: Text<'a>,
    player: Text<'a>,
    number: u32,
    position: Text<'a>,
    points: u32,
    assists: u32,
    rebounds: u32,
    score: Text<'a>,
}

/// Build the CSV of a game: one row per roster player, ordered by name.
pub async fn game_report(
    state: &SharedState,
    team_id: &str,
    game_id: &str,
) -> Result<CsvReport, ServiceError> {
    let store = require_store(state).await?;
    let store = store.as_ref();
    let team = require_team(store, team_id).await?;
    let game = require_game(store, team_id, game_id).await?;
    let roster = full_roster(store, team_id).await?;
    let stats = game_stats(store, team_id, game_id)
        .await?
        .into_iter()
        .map(|record| (record.id, record.data))
        .collect::<HashMap<_, _>>();

    let lines = roster
        .iter()
        .map(|player| {
            let line = stats.get(&player.id).copied().unwrap_or_default();
            (player, line)
        })
        .collect::<Vec<_>>();
    let total_points: u64 = lines
        .iter()
        .map(|(_, line)| u64::from(line.points))
        .sum();
    let score = format!("{total_points}-??");

    let body = render(
        &team.data.name,
        &game.data.date,
        &game.data.opponent,
        &score,
        lines.iter().map(|(player, line)| {
            (
                player.data.name.as_str(),
                player.data.number,
                player.data.position.as_str(),
                *line,
            )
        }),
    )?;
    info!(team_id, game_id, rows = lines.len(), "game report exported");

    Ok(CsvReport {
        filename: format!("game_{game_id}_players.csv"),
        body,
    })
}

fn render<'a>(
    team: &str,
    date: &str,
    opponent: &str,
    score: &str,
    players: impl Iterator<Item = (&'a str, u32, &'a str, StatLineEntity)>,
) -> Result<String, ServiceError> {
    // Text columns carry their own quotes.
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer.write_record(HEADER).map_err(csv_error)?;

    for (player, number, position, line) in players {
        writer
            .serialize(ReportRow {
                team: Text(team),
                date: Text(date),
                opponent: Text(opponent),
                player: Text(player),
                number,
                position: Text(position),
                points: line.points,
                assists: line.assists,
                rebounds: line.rebounds,
                score: Text(score),
            })
            .map_err(csv_error)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ServiceError::InvalidState(format!("failed to finish report: {err}")))?;
    String::from_utf8(bytes)
        .map_err(|err| ServiceError::InvalidState(format!("report is not valid UTF-8: {err}")))
}

fn csv_error(err: csv::Error) -> ServiceError {
    ServiceError::InvalidState(format!("failed to write report: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(points: u32, assists: u32, rebounds: u32) -> StatLineEntity {
        StatLineEntity {
            points,
            assists,
            rebounds,
        }
    }

    #[test]
    fn render_quotes_text_only() {
        let csv = render(
            "Hawks",
            "2024-03-01",
            "Lions",
            "12-??",
            [("Alice", 5, "Guard", line(12, 3, 2))].into_iter(),
        )
        .unwrap();
        let mut rows = csv.lines();
        assert_eq!(
            rows.next(),
            Some("Team,Game Date,Opponent,Player Name,Number,Position,Points,Assists,Rebounds,Score")
        );
        assert_eq!(
            rows.next(),
            Some(r#""Hawks","2024-03-01","Lions","Alice",5,"Guard",12,3,2,"12-??""#)
        );
        assert_eq!(rows.next(), None);
    }

    #[test]
    fn render_doubles_embedded_quotes() {
        let csv = render(
            "The \"Hawks\"",
            "2024-03-01",
            "Lions",
            "0-??",
            [("Al \"Ace\" Smith", 1, "Guard", line(0, 0, 0))].into_iter(),
        )
        .unwrap();
        assert!(csv.contains(r#""The ""Hawks""","2024-03-01","Lions","Al ""Ace"" Smith",1,"#));
    }

    #[test]
    fn render_quotes_numeric_looking_text() {
        let csv = render(
            "76",
            "2024-03-01",
            "1906",
            "0-??",
            [("23", 7, "3", line(0, 0, 0))].into_iter(),
        )
        .unwrap();
        assert_eq!(
            csv.lines().nth(1),
            Some(r#""76","2024-03-01","1906","23",7,"3",0,0,0,"0-??""#)
        );
    }

    #[test]
    fn render_keeps_commas_inside_quoted_text() {
        let csv = render(
            "Hawks, Atlanta",
            "2024-03-01",
            "Lions",
            "0-??",
            [("Alice", 5, "Guard", line(0, 0, 0))].into_iter(),
        )
        .unwrap();
        assert!(csv.contains(r#""Hawks, Atlanta","2024-03-01","#));
    }
}
