//! Delimited dataset files
//!
//! One row per game: identity fields, the six engineered features and the
//! home-win label (actual or predicted).

use crate::data::teams::TeamRegistry;
use crate::features::engine::EnrichedGame;
use crate::features::rolling::LabelledGame;
use crate::{HoopsError, Result, SeasonId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Flat dataset row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRow {
    pub game_id: String,
    pub season_id: SeasonId,
    pub date: NaiveDate,
    pub home_team: String,
    pub away_team: String,
    pub home_points: u16,
    pub away_points: u16,
    pub home_won_previous: u8,
    pub away_won_previous: u8,
    pub home_win_streak: u32,
    pub away_win_streak: u32,
    pub home_higher_rank: u8,
    pub home_won_last_h2h: u8,
    pub home_win: u8,
}

impl GameRow {
    pub fn from_game(game: &EnrichedGame, registry: &TeamRegistry) -> Self {
        let r = &game.record;
        let f = &game.features;
        GameRow {
            game_id: r.game_id.clone(),
            season_id: r.season,
            date: r.date,
            home_team: registry.name(r.home_team).to_string(),
            away_team: registry.name(r.away_team).to_string(),
            home_points: r.home_points,
            away_points: r.away_points,
            home_won_previous: f.home_won_previous as u8,
            away_won_previous: f.away_won_previous as u8,
            home_win_streak: f.home_win_streak,
            away_win_streak: f.away_win_streak,
            home_higher_rank: f.home_higher_rank as u8,
            home_won_last_h2h: f.home_won_last_h2h as u8,
            home_win: r.home_win as u8,
        }
    }

    /// Resolve team names back to ids for aggregation
    pub fn labelled(&self, registry: &TeamRegistry) -> Result<LabelledGame> {
        let context = format!("dataset row for game {}", self.game_id);
        Ok(LabelledGame {
            date: self.date,
            home_team: registry.resolve(&self.home_team, &context)?,
            away_team: registry.resolve(&self.away_team, &context)?,
            home_win: self.home_win == 1,
        })
    }
}

/// Write enriched games with their actual labels
pub fn write_games<P: AsRef<Path>>(
    path: P,
    games: &[EnrichedGame],
    registry: &TeamRegistry,
) -> Result<()> {
    let rows = games.iter().map(|g| GameRow::from_game(g, registry));
    write_rows(path, rows)
}

/// Write enriched games with the label replaced by a prediction
pub fn write_predictions<P: AsRef<Path>>(
    path: P,
    games: &[EnrichedGame],
    predicted: &[bool],
    registry: &TeamRegistry,
) -> Result<()> {
    if games.len() != predicted.len() {
        return Err(HoopsError::Classifier(format!(
            "{} predictions for {} games",
            predicted.len(),
            games.len()
        )));
    }
    let rows = games.iter().zip(predicted).map(|(g, &p)| GameRow {
        home_win: p as u8,
        ..GameRow::from_game(g, registry)
    });
    write_rows(path, rows)
}

fn write_rows<P, I>(path: P, rows: I) -> Result<()>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = GameRow>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;
    let mut count = 0;
    for row in rows {
        writer.serialize(row)?;
        count += 1;
    }
    writer.flush()?;
    log::info!("Wrote {} games to {}", count, path.display());
    Ok(())
}

/// Read a dataset file written by [`write_games`] or [`write_predictions`]
pub fn read_games<P: AsRef<Path>>(path: P) -> Result<Vec<GameRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<GameRow>, csv::Error>>()?;
    Ok(rows)
}
