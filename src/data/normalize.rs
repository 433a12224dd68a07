//! Game record normalization
//!
//! Collapses the two per-team provider rows of each game into one record
//! oriented to the true venue, resolves team names through the registry and
//! returns the games in chronological order.

use crate::data::raw::RawGameRow;
use crate::data::teams::TeamRegistry;
use crate::{GameRecord, GroupingFault, HoopsError, Result, SeasonId, SeasonKind};
use std::collections::BTreeMap;

/// Inclusive range of seasons to keep from a raw export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonWindow {
    pub first: SeasonId,
    pub last: SeasonId,
    /// Drop pre-season, all-star and playoff rows
    pub regular_only: bool,
}

impl SeasonWindow {
    /// Window covering a single season
    pub fn single(season: SeasonId) -> Self {
        SeasonWindow {
            first: season,
            last: season,
            regular_only: season.kind == SeasonKind::Regular,
        }
    }

    pub fn contains(&self, season: SeasonId) -> bool {
        if self.regular_only && season.kind != SeasonKind::Regular {
            return false;
        }
        season.year >= self.first.year && season.year <= self.last.year
    }
}

/// Turns raw per-team rows into oriented, ordered game records
pub struct Normalizer<'a> {
    registry: &'a TeamRegistry,
    window: Option<SeasonWindow>,
}

impl<'a> Normalizer<'a> {
    pub fn new(registry: &'a TeamRegistry) -> Self {
        Normalizer {
            registry,
            window: None,
        }
    }

    /// Only keep rows inside the given season window
    pub fn with_window(mut self, window: SeasonWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// Group, orient, canonicalize and sort
    pub fn normalize(&self, rows: Vec<RawGameRow>) -> Result<Vec<GameRecord>> {
        let total_rows = rows.len();

        let mut groups: BTreeMap<String, Vec<RawGameRow>> = BTreeMap::new();
        for row in rows {
            if let Some(window) = &self.window {
                if !window.contains(row.season_id) {
                    continue;
                }
            }
            groups.entry(row.game_id.clone()).or_default().push(row);
        }

        let kept_rows: usize = groups.values().map(Vec::len).sum();

        let mut records = groups
            .into_iter()
            .map(|(game_id, group)| self.merge(game_id, group))
            .collect::<Result<Vec<_>>>()?;

        records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        log::info!(
            "Normalized {} raw rows into {} games ({} rows outside season window)",
            total_rows,
            records.len(),
            total_rows - kept_rows
        );

        Ok(records)
    }

    /// Merge one game's rows into a single record
    fn merge(&self, game_id: String, mut group: Vec<RawGameRow>) -> Result<GameRecord> {
        // Groups are never empty: each one is created by pushing a row
        let date = group[0].date;
        let malformed = |fault| HoopsError::MalformedGameGrouping {
            game_id: game_id.clone(),
            date,
            fault,
        };

        if group.len() != 2 {
            return Err(malformed(GroupingFault::RowCount(group.len())));
        }

        let second = group.pop().ok_or_else(|| malformed(GroupingFault::RowCount(1)))?;
        let first = group.pop().ok_or_else(|| malformed(GroupingFault::RowCount(0)))?;

        if first.season_id != second.season_id {
            return Err(malformed(GroupingFault::SeasonMismatch(
                first.season_id.to_string(),
                second.season_id.to_string(),
            )));
        }
        if first.is_away() == second.is_away() {
            return Err(malformed(GroupingFault::ConflictingVenue));
        }

        // The first row is retained; swap if its team was the visitor
        let (home, away) = if first.is_away() {
            (second, first)
        } else {
            (first, second)
        };

        let context = format!("game {} on {}", game_id, date);
        let home_team = self.registry.resolve(&home.team_name, &context)?;
        let away_team = self.registry.resolve(&away.team_name, &context)?;
        if home_team == away_team {
            return Err(malformed(GroupingFault::SameTeam(
                self.registry.name(home_team).to_string(),
            )));
        }

        Ok(GameRecord {
            game_id,
            season: home.season_id,
            date,
            home_team,
            away_team,
            home_points: home.points,
            away_points: away.points,
            home_win: home.points > away.points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(game_id: &str, day: u32, team: &str, points: u16, matchup: &str) -> RawGameRow {
        RawGameRow {
            season_id: SeasonId::regular(2017),
            team_name: team.to_string(),
            points,
            matchup: matchup.to_string(),
            date: NaiveDate::from_ymd_opt(2017, 11, day).unwrap(),
            game_id: game_id.to_string(),
        }
    }

    #[test]
    fn test_orients_home_and_away() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            // Retained row is the visitor: must be swapped
            row("0021700010", 1, "Boston Celtics", 99, "BOS @ CLE"),
            row("0021700010", 1, "Cleveland Cavaliers", 102, "CLE vs. BOS"),
            // Retained row is already the home team
            row("0021700011", 2, "Miami Heat", 88, "MIA vs. ORL"),
            row("0021700011", 2, "Orlando Magic", 90, "ORL @ MIA"),
        ];

        let games = Normalizer::new(&registry).normalize(rows).unwrap();
        assert_eq!(games.len(), 2);

        assert_eq!(registry.name(games[0].home_team), "Cleveland Cavaliers");
        assert_eq!(registry.name(games[0].away_team), "Boston Celtics");
        assert_eq!(games[0].home_points, 102);
        assert_eq!(games[0].away_points, 99);

        assert_eq!(registry.name(games[1].home_team), "Miami Heat");
        assert_eq!(games[1].home_points, 88);
        assert!(!games[1].home_win);
    }

    #[test]
    fn test_orientation_matches_independent_away_check() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            row("1", 3, "Utah Jazz", 100, "UTA @ DEN"),
            row("1", 3, "Denver Nuggets", 101, "DEN vs. UTA"),
            row("2", 4, "Denver Nuggets", 110, "DEN @ UTA"),
            row("2", 4, "Utah Jazz", 95, "UTA vs. DEN"),
        ];
        let expected_home: Vec<_> = ["1", "2"]
            .iter()
            .map(|id| {
                rows.iter()
                    .find(|r| r.game_id == *id && !crate::data::raw::is_away_matchup(&r.matchup))
                    .map(|r| registry.get(&r.team_name).unwrap())
                    .unwrap()
            })
            .collect();

        let games = Normalizer::new(&registry).normalize(rows).unwrap();
        let actual_home: Vec<_> = games.iter().map(|g| g.home_team).collect();
        assert_eq!(actual_home, expected_home);
    }

    #[test]
    fn test_sorted_by_date_then_game_id() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            row("0003", 5, "Utah Jazz", 100, "UTA vs. DEN"),
            row("0003", 5, "Denver Nuggets", 90, "DEN @ UTA"),
            row("0002", 5, "Miami Heat", 100, "MIA vs. ORL"),
            row("0002", 5, "Orlando Magic", 90, "ORL @ MIA"),
            row("0009", 4, "Chicago Bulls", 100, "CHI vs. NYK"),
            row("0009", 4, "New York Knicks", 90, "NYK @ CHI"),
        ];

        let games = Normalizer::new(&registry).normalize(rows).unwrap();
        let ids: Vec<_> = games.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["0009", "0002", "0003"]);
    }

    #[test]
    fn test_aliases_are_applied() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            row("1", 1, "New Jersey Nets", 100, "NJN vs. SEA"),
            row("1", 1, "Seattle SuperSonics", 90, "SEA @ NJN"),
        ];

        let games = Normalizer::new(&registry).normalize(rows).unwrap();
        assert_eq!(registry.name(games[0].home_team), "Brooklyn Nets");
        assert_eq!(registry.name(games[0].away_team), "Oklahoma City Thunder");
    }

    #[test]
    fn test_single_row_group_is_malformed() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            row("1", 1, "Utah Jazz", 100, "UTA vs. DEN"),
            row("1", 1, "Denver Nuggets", 90, "DEN @ UTA"),
            row("2", 2, "Utah Jazz", 100, "UTA vs. DEN"),
        ];

        let err = Normalizer::new(&registry).normalize(rows).unwrap_err();
        match err {
            HoopsError::MalformedGameGrouping { game_id, fault, .. } => {
                assert_eq!(game_id, "2");
                assert_eq!(fault, GroupingFault::RowCount(1));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_three_row_group_is_malformed() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            row("1", 1, "Utah Jazz", 100, "UTA vs. DEN"),
            row("1", 1, "Denver Nuggets", 90, "DEN @ UTA"),
            row("1", 1, "Denver Nuggets", 90, "DEN @ UTA"),
        ];

        let err = Normalizer::new(&registry).normalize(rows).unwrap_err();
        assert!(matches!(
            err,
            HoopsError::MalformedGameGrouping {
                fault: GroupingFault::RowCount(3),
                ..
            }
        ));
    }

    #[test]
    fn test_both_rows_away_is_malformed() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            row("1", 1, "Utah Jazz", 100, "UTA @ DEN"),
            row("1", 1, "Denver Nuggets", 90, "DEN @ UTA"),
        ];

        let err = Normalizer::new(&registry).normalize(rows).unwrap_err();
        assert!(matches!(
            err,
            HoopsError::MalformedGameGrouping {
                fault: GroupingFault::ConflictingVenue,
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_team_fails() {
        let registry = TeamRegistry::nba();
        let rows = vec![
            row("1", 1, "Utah Jazz", 100, "UTA vs. XYZ"),
            row("1", 1, "Mystery Team", 90, "XYZ @ UTA"),
        ];

        let err = Normalizer::new(&registry).normalize(rows).unwrap_err();
        match err {
            HoopsError::UnknownTeamName { name, context } => {
                assert_eq!(name, "Mystery Team");
                assert!(context.contains("game 1"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_season_window_trims_rows() {
        let registry = TeamRegistry::nba();
        let mut old = vec![
            row("1", 1, "Utah Jazz", 100, "UTA vs. DEN"),
            row("1", 1, "Denver Nuggets", 90, "DEN @ UTA"),
        ];
        for r in old.iter_mut() {
            r.season_id = SeasonId::regular(2005);
        }
        let mut playoffs = vec![
            row("2", 2, "Utah Jazz", 100, "UTA vs. DEN"),
            row("2", 2, "Denver Nuggets", 90, "DEN @ UTA"),
        ];
        for r in playoffs.iter_mut() {
            r.season_id = "42017".parse().unwrap();
        }
        let current = vec![
            row("3", 3, "Utah Jazz", 100, "UTA vs. DEN"),
            row("3", 3, "Denver Nuggets", 90, "DEN @ UTA"),
        ];

        let rows: Vec<_> = old.into_iter().chain(playoffs).chain(current).collect();
        let window = SeasonWindow {
            first: SeasonId::regular(2008),
            last: SeasonId::regular(2017),
            regular_only: true,
        };

        let games = Normalizer::new(&registry)
            .with_window(window)
            .normalize(rows)
            .unwrap();
        assert_eq!(games.len(), 1);
        assert_eq!(games[0].game_id, "3");
    }
}
