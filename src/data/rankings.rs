//! Season standings tables and prior-season rank resolution

use crate::data::teams::TeamRegistry;
use crate::{HoopsError, RankGap, Result, SeasonId, TeamId};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// Final standings per season year, keyed by canonical team
#[derive(Debug, Clone, Default)]
pub struct SeasonRankTable {
    years: BTreeMap<i32, HashMap<TeamId, u32>>,
}

impl SeasonRankTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a parsed `{year: {team name: rank}}` structure
    ///
    /// Names go through the same alias table as game rows. Two historical
    /// names mapping to one franchise in the same year keep the better rank.
    pub fn from_raw(
        raw: &BTreeMap<i32, BTreeMap<String, u32>>,
        registry: &TeamRegistry,
    ) -> Result<Self> {
        let mut table = SeasonRankTable::new();
        for (year, ranks) in raw {
            let context = format!("standings for {}", year);
            for (name, rank) in ranks {
                let team = registry.resolve(name, &context)?;
                table.insert(*year, team, *rank);
            }
        }
        Ok(table)
    }

    /// Record a team's rank for a season year
    pub fn insert(&mut self, year: i32, team: TeamId, rank: u32) {
        let entry = self.years.entry(year).or_default().entry(team).or_insert(rank);
        *entry = (*entry).min(rank);
    }

    /// Rank of a team in a season year
    pub fn rank(&self, year: i32, team: TeamId) -> std::result::Result<u32, RankGap> {
        let table = self.years.get(&year).ok_or(RankGap::MissingYear)?;
        table.get(&team).copied().ok_or(RankGap::MissingTeam)
    }

    /// Years with a standings table
    pub fn years(&self) -> impl Iterator<Item = i32> + '_ {
        self.years.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Resolves a team's standing in the season before a game's season
pub struct RankResolver<'a> {
    table: &'a SeasonRankTable,
    registry: &'a TeamRegistry,
}

impl<'a> RankResolver<'a> {
    pub fn new(table: &'a SeasonRankTable, registry: &'a TeamRegistry) -> Self {
        RankResolver { table, registry }
    }

    /// Rank of `team` in the year before `season` (1 = best)
    pub fn resolve(&self, season: SeasonId, team: TeamId) -> Result<u32> {
        let lookback_year = season.lookback_year();
        self.table
            .rank(lookback_year, team)
            .map_err(|gap| HoopsError::RankUnavailable {
                team: self.registry.name(team).to_string(),
                season,
                lookback_year,
                gap,
                game: None,
            })
    }
}

/// Load every `<year>.csv` standings file in a directory
pub fn load_rank_dir<P: AsRef<Path>>(dir: P, registry: &TeamRegistry) -> Result<SeasonRankTable> {
    let dir = dir.as_ref();
    let mut raw = BTreeMap::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        let Some(year) = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.get(..4))
            .and_then(|s| s.parse::<i32>().ok())
        else {
            log::warn!("Skipping standings file without a year: {}", path.display());
            continue;
        };
        raw.insert(year, read_rank_csv(&path)?);
    }

    let table = SeasonRankTable::from_raw(&raw, registry)?;
    log::info!(
        "Loaded standings for {} seasons from {}",
        raw.len(),
        dir.display()
    );
    Ok(table)
}

/// Read one standings export into `{team name: rank}`
///
/// Exports may start with super-header lines; the header is the first row
/// holding both an `Rk` and a `Team` column.
pub fn read_rank_csv<P: AsRef<Path>>(path: P) -> Result<BTreeMap<String, u32>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut columns: Option<(usize, usize)> = None;
    let mut ranks = BTreeMap::new();

    for record in reader.records() {
        let record = record?;
        let Some((rk_col, team_col)) = columns else {
            let rk = record.iter().position(|c| c.trim() == "Rk");
            let team = record.iter().position(|c| c.trim() == "Team");
            if let (Some(rk), Some(team)) = (rk, team) {
                columns = Some((rk, team));
            }
            continue;
        };

        let (Some(rank), Some(team)) = (record.get(rk_col), record.get(team_col)) else {
            continue;
        };
        let rank = rank.trim();
        if rank.is_empty() {
            continue;
        }
        let rank = rank.parse::<u32>().map_err(|_| {
            HoopsError::Parse(format!(
                "Invalid rank '{}' for {} in {}",
                rank,
                team,
                path.display()
            ))
        })?;
        ranks.insert(team.trim().to_string(), rank);
    }

    if columns.is_none() {
        return Err(HoopsError::Parse(format!(
            "No Rk/Team header found in {}",
            path.display()
        )));
    }

    Ok(ranks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn raw_table(entries: &[(i32, &str, u32)]) -> BTreeMap<i32, BTreeMap<String, u32>> {
        let mut raw: BTreeMap<i32, BTreeMap<String, u32>> = BTreeMap::new();
        for (year, team, rank) in entries {
            raw.entry(*year).or_default().insert(team.to_string(), *rank);
        }
        raw
    }

    #[test]
    fn test_resolves_previous_season() {
        let registry = TeamRegistry::nba();
        let raw = raw_table(&[
            (2016, "Golden State Warriors", 1),
            (2017, "Golden State Warriors", 2),
        ]);
        let table = SeasonRankTable::from_raw(&raw, &registry).unwrap();
        let resolver = RankResolver::new(&table, &registry);

        let warriors = registry.get("Golden State Warriors").unwrap();
        assert_eq!(resolver.resolve(SeasonId::regular(2017), warriors).unwrap(), 1);
        assert_eq!(resolver.resolve(SeasonId::regular(2018), warriors).unwrap(), 2);
    }

    #[test]
    fn test_aliases_in_standings() {
        let registry = TeamRegistry::nba();
        let raw = raw_table(&[(2007, "Seattle SuperSonics", 27), (2007, "Charlotte Bobcats", 22)]);
        let table = SeasonRankTable::from_raw(&raw, &registry).unwrap();

        let thunder = registry.get("Oklahoma City Thunder").unwrap();
        let hornets = registry.get("Charlotte Hornets").unwrap();
        assert_eq!(table.rank(2007, thunder), Ok(27));
        assert_eq!(table.rank(2007, hornets), Ok(22));
    }

    #[test]
    fn test_unknown_team_in_standings() {
        let registry = TeamRegistry::nba();
        let raw = raw_table(&[(2010, "Kansas City Kings", 5)]);
        let err = SeasonRankTable::from_raw(&raw, &registry).unwrap_err();
        match err {
            HoopsError::UnknownTeamName { name, context } => {
                assert_eq!(name, "Kansas City Kings");
                assert!(context.contains("2010"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_missing_year_and_missing_team() {
        let registry = TeamRegistry::nba();
        let raw = raw_table(&[(2016, "Boston Celtics", 3)]);
        let table = SeasonRankTable::from_raw(&raw, &registry).unwrap();
        let resolver = RankResolver::new(&table, &registry);

        let celtics = registry.get("Boston Celtics").unwrap();
        let lakers = registry.get("Los Angeles Lakers").unwrap();

        match resolver.resolve(SeasonId::regular(2008), celtics).unwrap_err() {
            HoopsError::RankUnavailable {
                team,
                lookback_year,
                gap,
                ..
            } => {
                assert_eq!(team, "Boston Celtics");
                assert_eq!(lookback_year, 2007);
                assert_eq!(gap, RankGap::MissingYear);
            }
            other => panic!("unexpected error: {}", other),
        }

        match resolver.resolve(SeasonId::regular(2017), lakers).unwrap_err() {
            HoopsError::RankUnavailable { gap, .. } => assert_eq!(gap, RankGap::MissingTeam),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_load_rank_dir_with_super_header() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("2016.csv")).unwrap();
        writeln!(file, ",,Place,,Conference").unwrap();
        writeln!(file, "Rk,Team,Overall,Home,Road").unwrap();
        writeln!(file, "1,Golden State Warriors,67-15,36-5,31-10").unwrap();
        writeln!(file, "2,San Antonio Spurs,61-21,31-10,30-11").unwrap();
        writeln!(file, "3,LA Clippers,51-31,29-12,22-19").unwrap();
        drop(file);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let registry = TeamRegistry::nba();
        let table = load_rank_dir(dir.path(), &registry).unwrap();
        assert_eq!(table.years().collect::<Vec<_>>(), vec![2016]);

        let clippers = registry.get("Los Angeles Clippers").unwrap();
        assert_eq!(table.rank(2016, clippers), Ok(3));
    }

    #[test]
    fn test_rank_csv_without_header_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2015.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();
        assert!(read_rank_csv(&path).is_err());
    }
}
