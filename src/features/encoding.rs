//! Feature matrix assembly
//!
//! Concatenates the engineered features with a one-hot encoding of home and
//! away team identity. The encoding is fitted once on the training partition
//! and reused unchanged for the prediction partition so both matrices share
//! column semantics.

use crate::data::teams::TeamRegistry;
use crate::features::engine::{EnrichedGame, GameFeatures};
use crate::{HoopsError, Result, TeamId};
use std::collections::BTreeMap;

/// Category -> column mapping for team identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamEncoder {
    columns: BTreeMap<TeamId, usize>,
}

impl TeamEncoder {
    /// Fit on the teams appearing (home or away) in a training partition
    pub fn fit(games: &[EnrichedGame]) -> Self {
        let mut teams: Vec<TeamId> = games
            .iter()
            .flat_map(|g| [g.record.home_team, g.record.away_team])
            .collect();
        teams.sort();
        teams.dedup();

        let columns = teams.into_iter().enumerate().map(|(i, t)| (t, i)).collect();
        let encoder = TeamEncoder { columns };
        log::info!(
            "Fitted team encoding: {} teams, matrix width {}",
            encoder.team_count(),
            encoder.width()
        );
        encoder
    }

    /// Number of encoded teams
    pub fn team_count(&self) -> usize {
        self.columns.len()
    }

    /// Total matrix width: engineered features plus home and away one-hot blocks
    pub fn width(&self) -> usize {
        GameFeatures::DIM + 2 * self.team_count()
    }

    /// Column of a team inside a one-hot block
    pub fn column(&self, team: TeamId) -> Option<usize> {
        self.columns.get(&team).copied()
    }

    /// Column headers for the assembled matrix
    pub fn column_names(&self, registry: &TeamRegistry) -> Vec<String> {
        let mut names: Vec<String> = GameFeatures::NAMES.iter().map(|s| s.to_string()).collect();
        for side in ["home", "away"] {
            names.extend(
                self.columns
                    .keys()
                    .map(|t| format!("{}={}", side, registry.name(*t))),
            );
        }
        names
    }

    /// Assemble one numeric row per game, plus the label vector
    pub fn assemble(&self, games: &[EnrichedGame], registry: &TeamRegistry) -> Result<FeatureMatrix> {
        let cols = self.width();
        let n_teams = self.team_count();
        let mut data = Vec::with_capacity(games.len() * cols);
        let mut labels = Vec::with_capacity(games.len());

        for game in games {
            let mismatch = |team: TeamId| HoopsError::EncodingMismatch {
                team: registry.name(team).to_string(),
                game_id: game.record.game_id.clone(),
            };
            let home_col = self
                .column(game.record.home_team)
                .ok_or_else(|| mismatch(game.record.home_team))?;
            let away_col = self
                .column(game.record.away_team)
                .ok_or_else(|| mismatch(game.record.away_team))?;

            let start = data.len();
            data.extend(game.features.to_vec());
            data.resize(start + cols, 0.0);
            data[start + GameFeatures::DIM + home_col] = 1.0;
            data[start + GameFeatures::DIM + n_teams + away_col] = 1.0;

            labels.push(game.record.home_win);
        }

        Ok(FeatureMatrix {
            rows: games.len(),
            cols,
            data,
            labels,
        })
    }
}

/// Dense row-major feature matrix with its label vector
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
    /// Home-win labels, one per row
    pub labels: Vec<bool>,
}

impl FeatureMatrix {
    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// New matrix holding the given rows, in the given order
    pub fn select_rows(&self, indices: &[usize]) -> FeatureMatrix {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        let mut labels = Vec::with_capacity(indices.len());
        for &i in indices {
            data.extend_from_slice(self.row(i));
            labels.push(self.labels[i]);
        }
        FeatureMatrix {
            rows: indices.len(),
            cols: self.cols,
            data,
            labels,
        }
    }

    pub fn labels_as_f32(&self) -> Vec<f32> {
        self.labels.iter().map(|&l| if l { 1.0 } else { 0.0 }).collect()
    }
}
