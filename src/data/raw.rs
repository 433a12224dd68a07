//! Raw per-team game rows as delivered by the statistics provider
//!
//! The provider returns one row per team per game, so every game appears
//! twice. Acquisition is handled elsewhere; this module only models the rows
//! and reads them from a CSV export.

use crate::{Result, SeasonId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Token in the matchup string marking the row's team as the visitor
pub const AWAY_MARKER: char = '@';

/// One team's line for one game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawGameRow {
    #[serde(rename = "SEASON_ID")]
    pub season_id: SeasonId,
    #[serde(rename = "TEAM_NAME")]
    pub team_name: String,
    #[serde(rename = "PTS")]
    pub points: u16,
    /// e.g. `BOS vs. LAL` at home, `LAL @ BOS` on the road
    #[serde(rename = "MATCHUP")]
    pub matchup: String,
    #[serde(rename = "GAME_DATE")]
    pub date: NaiveDate,
    #[serde(rename = "GAME_ID")]
    pub game_id: String,
}

impl RawGameRow {
    /// Whether this row's team was travelling
    pub fn is_away(&self) -> bool {
        is_away_matchup(&self.matchup)
    }
}

/// Check a matchup indicator for the away marker
pub fn is_away_matchup(matchup: &str) -> bool {
    matchup.contains(AWAY_MARKER)
}

/// Read raw rows from a provider CSV export (extra columns are ignored)
pub fn read_raw_rows<P: AsRef<Path>>(path: P) -> Result<Vec<RawGameRow>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader
        .deserialize()
        .collect::<std::result::Result<Vec<RawGameRow>, csv::Error>>()?;
    log::debug!("Read {} raw rows from {}", rows.len(), path.display());
    Ok(rows)
}
