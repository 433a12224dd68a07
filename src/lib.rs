//! NBA game outcome prediction
//!
//! Derives historically-contextual features (previous results, win streaks,
//! prior-season standing, head-to-head history) from a chronological sequence
//! of games and feeds them to a binary home-win classifier.

pub mod data;
pub mod features;
pub mod predict;
pub mod training;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Interned identifier for a canonical franchise (index into the team registry)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub u16);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// Season type encoded in the first digit of a provider season id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SeasonKind {
    PreSeason,
    Regular,
    AllStar,
    Playoffs,
}

impl SeasonKind {
    pub fn digit(&self) -> char {
        match self {
            SeasonKind::PreSeason => '1',
            SeasonKind::Regular => '2',
            SeasonKind::AllStar => '3',
            SeasonKind::Playoffs => '4',
        }
    }

    pub fn from_digit(c: char) -> Option<Self> {
        match c {
            '1' => Some(SeasonKind::PreSeason),
            '2' => Some(SeasonKind::Regular),
            '3' => Some(SeasonKind::AllStar),
            '4' => Some(SeasonKind::Playoffs),
            _ => None,
        }
    }
}

/// Provider season id such as `22017` (regular season starting in 2017)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SeasonId {
    pub kind: SeasonKind,
    pub year: i32,
}

impl SeasonId {
    pub fn regular(year: i32) -> Self {
        SeasonId {
            kind: SeasonKind::Regular,
            year,
        }
    }

    /// Year whose standings rank teams for games in this season
    pub fn lookback_year(&self) -> i32 {
        self.year - 1
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.kind.digit(), self.year)
    }
}

impl FromStr for SeasonId {
    type Err = HoopsError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || HoopsError::InvalidSeasonId(s.to_string());

        if s.len() != 5 || !s.is_ascii() {
            return Err(invalid());
        }
        let kind = s
            .chars()
            .next()
            .and_then(SeasonKind::from_digit)
            .ok_or_else(invalid)?;
        let year = s[1..].parse::<i32>().map_err(|_| invalid())?;

        Ok(SeasonId { kind, year })
    }
}

impl Serialize for SeasonId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SeasonId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// One normalized game, oriented so `home` is the team playing at its own venue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRecord {
    pub game_id: String,
    pub season: SeasonId,
    pub date: NaiveDate,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_points: u16,
    pub away_points: u16,
    /// Baseline label, attached by the feature engine
    pub home_win: bool,
}

impl GameRecord {
    /// Ordering key for a chronological pass (date, then game id)
    pub fn sort_key(&self) -> (NaiveDate, &str) {
        (self.date, self.game_id.as_str())
    }

    /// Returns the winning team from the recorded label
    pub fn winner(&self) -> TeamId {
        if self.home_win {
            self.home_team
        } else {
            self.away_team
        }
    }

    /// Returns the losing team from the recorded label
    pub fn loser(&self) -> TeamId {
        if self.home_win {
            self.away_team
        } else {
            self.home_team
        }
    }

    /// Check if the given team took part in this game
    pub fn involves(&self, team: TeamId) -> bool {
        team == self.home_team || team == self.away_team
    }

    /// Short human-readable reference for error messages
    pub fn reference(&self) -> GameRef {
        GameRef {
            game_id: self.game_id.clone(),
            date: self.date,
        }
    }
}

/// Identifies a game in error context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRef {
    pub game_id: String,
    pub date: NaiveDate,
}

impl fmt::Display for GameRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game {} on {}", self.game_id, self.date)
    }
}

/// Why a raw game group could not be merged into one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupingFault {
    /// Group did not hold exactly two rows
    RowCount(usize),
    /// Both rows claim the same venue side
    ConflictingVenue,
    /// Both rows name the same franchise
    SameTeam(String),
    /// Rows disagree on the season id
    SeasonMismatch(String, String),
}

impl fmt::Display for GroupingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupingFault::RowCount(n) => write!(f, "expected 2 rows, found {}", n),
            GroupingFault::ConflictingVenue => write!(f, "both rows claim the same venue side"),
            GroupingFault::SameTeam(name) => write!(f, "both rows belong to {}", name),
            GroupingFault::SeasonMismatch(a, b) => write!(f, "season ids disagree ({} vs {})", a, b),
        }
    }
}

/// Why a season rank could not be resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankGap {
    /// No standings table for the lookback year
    MissingYear,
    /// Standings table exists but does not list the team
    MissingTeam,
}

impl fmt::Display for RankGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RankGap::MissingYear => write!(f, "no standings table"),
            RankGap::MissingTeam => write!(f, "team missing from standings table"),
        }
    }
}

fn game_suffix(game: &Option<GameRef>) -> String {
    match game {
        Some(g) => format!(" ({})", g),
        None => String::new(),
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum HoopsError {
    #[error("Malformed game grouping for game {game_id} on {date}: {fault}")]
    MalformedGameGrouping {
        game_id: String,
        date: NaiveDate,
        fault: GroupingFault,
    },

    #[error("Unknown team name '{name}' in {context}")]
    UnknownTeamName { name: String, context: String },

    #[error("Rank unavailable for {team} in season {season}: {lookback_year} {gap}{}", game_suffix(.game))]
    RankUnavailable {
        team: String,
        season: SeasonId,
        lookback_year: i32,
        gap: RankGap,
        game: Option<GameRef>,
    },

    #[error("Team {team} in game {game_id} is not part of the fitted team encoding")]
    EncodingMismatch { team: String, game_id: String },

    #[error("Game {game} is out of chronological order (follows {previous})")]
    OutOfOrder { game: GameRef, previous: GameRef },

    #[error("Invalid season id: {0}")]
    InvalidSeasonId(String),

    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HoopsError {
    /// Attach game context to a rank lookup failure
    pub fn in_game(self, record: &GameRecord) -> Self {
        match self {
            HoopsError::RankUnavailable {
                team,
                season,
                lookback_year,
                gap,
                game: None,
            } => HoopsError::RankUnavailable {
                team,
                season,
                lookback_year,
                gap,
                game: Some(record.reference()),
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, HoopsError>;

/// Application configuration loaded from config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub seasons: SeasonConfig,
    pub model: ModelConfig,
    #[serde(default)]
    pub teams: TeamsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub games_path: String,
    pub rankings_dir: String,
    pub output_dir: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonConfig {
    pub first_training: SeasonId,
    pub last_training: SeasonId,
    pub prediction: SeasonId,
    pub regular_season_only: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub learning_rate: f64,
    pub epochs: usize,
    pub folds: usize,
    pub seed: u64,
    /// Candidate learning rates for grid search (empty = no search)
    #[serde(default)]
    pub grid_learning_rates: Vec<f64>,
    /// Candidate epoch counts for grid search
    #[serde(default)]
    pub grid_epochs: Vec<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamsConfig {
    /// Extra historical name -> canonical name mappings
    #[serde(default)]
    pub aliases: std::collections::BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            data: DataConfig {
                games_path: "data/games.csv".to_string(),
                rankings_dir: "data/rankings".to_string(),
                output_dir: "data".to_string(),
            },
            seasons: SeasonConfig {
                first_training: SeasonId::regular(2008),
                last_training: SeasonId::regular(2017),
                prediction: SeasonId::regular(2018),
                regular_season_only: true,
            },
            model: ModelConfig {
                learning_rate: 0.1,
                epochs: 200,
                folds: 5,
                seed: 14,
                grid_learning_rates: vec![0.01, 0.1, 0.5],
                grid_epochs: vec![50, 100, 200],
            },
            teams: TeamsConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HoopsError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| HoopsError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| HoopsError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_id_parse() {
        let season: SeasonId = "22017".parse().unwrap();
        assert_eq!(season.kind, SeasonKind::Regular);
        assert_eq!(season.year, 2017);
        assert_eq!(season.lookback_year(), 2016);
        assert_eq!(season.to_string(), "22017");

        let playoffs: SeasonId = "42012".parse().unwrap();
        assert_eq!(playoffs.kind, SeasonKind::Playoffs);
    }

    #[test]
    fn test_season_id_rejects_garbage() {
        assert!("2017".parse::<SeasonId>().is_err());
        assert!("92017".parse::<SeasonId>().is_err());
        assert!("2abcd".parse::<SeasonId>().is_err());
    }

    #[test]
    fn test_rank_error_gets_game_context() {
        let record = GameRecord {
            game_id: "0021700001".to_string(),
            season: SeasonId::regular(2017),
            date: NaiveDate::from_ymd_opt(2017, 10, 17).unwrap(),
            home_team: TeamId(0),
            away_team: TeamId(1),
            home_points: 100,
            away_points: 90,
            home_win: true,
        };
        let err = HoopsError::RankUnavailable {
            team: "Boston Celtics".to_string(),
            season: record.season,
            lookback_year: 2016,
            gap: RankGap::MissingYear,
            game: None,
        }
        .in_game(&record);

        let message = err.to_string();
        assert!(message.contains("Boston Celtics"));
        assert!(message.contains("0021700001"));
        assert!(message.contains("2016"));
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path = path.to_str().unwrap();

        let mut config = Config::default();
        config
            .teams
            .aliases
            .insert("Vancouver Grizzlies".to_string(), "Memphis Grizzlies".to_string());
        config.save(path).unwrap();

        let loaded = Config::load(path).unwrap();
        assert_eq!(loaded.seasons.prediction, SeasonId::regular(2018));
        assert_eq!(loaded.model.folds, 5);
        assert_eq!(loaded.teams.aliases.len(), 1);
    }
}
