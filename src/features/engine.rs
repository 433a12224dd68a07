//! Chronological feature engine
//!
//! Walks an ordered game sequence once. For every game the features are read
//! from the state as it stood before tip-off, then the state is updated with
//! the result.

use crate::data::rankings::RankResolver;
use crate::features::state::PassState;
use crate::{GameRecord, HoopsError, Result};
use serde::{Deserialize, Serialize};

/// The six engineered features of one game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameFeatures {
    pub home_won_previous: bool,
    pub away_won_previous: bool,
    pub home_win_streak: u32,
    pub away_win_streak: u32,
    /// Home team finished strictly higher in the previous season
    pub home_higher_rank: bool,
    /// Home team won the most recent meeting of these two teams
    pub home_won_last_h2h: bool,
}

impl GameFeatures {
    pub const DIM: usize = 6;

    pub const NAMES: [&'static str; Self::DIM] = [
        "home_won_previous",
        "away_won_previous",
        "home_win_streak",
        "away_win_streak",
        "home_higher_rank",
        "home_won_last_h2h",
    ];

    pub fn to_vec(&self) -> Vec<f32> {
        vec![
            flag(self.home_won_previous),
            flag(self.away_won_previous),
            self.home_win_streak as f32,
            self.away_win_streak as f32,
            flag(self.home_higher_rank),
            flag(self.home_won_last_h2h),
        ]
    }
}

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// A game with its label and features attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedGame {
    pub record: GameRecord,
    pub features: GameFeatures,
    /// Scores were level; label forced to away win
    pub tied: bool,
}

/// Output of one pass over a partition
#[derive(Debug, Clone, Default)]
pub struct FeaturePass {
    pub games: Vec<EnrichedGame>,
    /// Ids of games with level scores
    pub anomalies: Vec<String>,
}

impl FeaturePass {
    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    pub fn labels(&self) -> Vec<bool> {
        self.games.iter().map(|g| g.record.home_win).collect()
    }

    /// Share of games won by the home side
    pub fn home_win_rate(&self) -> f32 {
        if self.games.is_empty() {
            0.0
        } else {
            self.games.iter().filter(|g| g.record.home_win).count() as f32
                / self.games.len() as f32
        }
    }
}

/// Baseline label for a game; level scores are flagged and count as away wins
pub fn baseline_home_win(record: &GameRecord) -> (bool, bool) {
    let tied = record.home_points == record.away_points;
    (record.home_points > record.away_points, tied)
}

/// Derives per-game features in a single ordered pass
pub struct FeatureEngine<'a> {
    ranks: RankResolver<'a>,
}

impl<'a> FeatureEngine<'a> {
    pub fn new(ranks: RankResolver<'a>) -> Self {
        FeatureEngine { ranks }
    }

    /// Run a full pass with fresh state
    ///
    /// Halts on the first failure; a skipped game would leave both teams'
    /// running state wrong for every later game.
    pub fn run(&self, records: Vec<GameRecord>) -> Result<FeaturePass> {
        let mut state = PassState::new();
        let mut pass = FeaturePass {
            games: Vec::with_capacity(records.len()),
            anomalies: Vec::new(),
        };

        for record in records {
            if let Some(previous) = pass.games.last() {
                if record.sort_key() <= previous.record.sort_key() {
                    return Err(HoopsError::OutOfOrder {
                        game: record.reference(),
                        previous: previous.record.reference(),
                    });
                }
            }

            let game = self.step(&mut state, record)?;
            if game.tied {
                pass.anomalies.push(game.record.game_id.clone());
            }
            pass.games.push(game);
        }

        log::info!(
            "Feature pass: {} games, {} teams, {} tied-score anomalies, home win rate {:.1}%",
            pass.len(),
            state.team_count(),
            pass.anomalies.len(),
            pass.home_win_rate() * 100.0
        );

        Ok(pass)
    }

    /// Featurize one game against the given state, then update the state
    pub fn step(&self, state: &mut PassState, mut record: GameRecord) -> Result<EnrichedGame> {
        let (home_win, tied) = baseline_home_win(&record);
        if tied {
            log::warn!(
                "Level score {}-{} in game {} on {}; labelling as away win",
                record.home_points,
                record.away_points,
                record.game_id,
                record.date
            );
        }

        let home = record.home_team;
        let away = record.away_team;

        let home_rank = self
            .ranks
            .resolve(record.season, home)
            .map_err(|e| e.in_game(&record))?;
        let away_rank = self
            .ranks
            .resolve(record.season, away)
            .map_err(|e| e.in_game(&record))?;

        let home_state = state.team(home);
        let away_state = state.team(away);

        let features = GameFeatures {
            home_won_previous: home_state.last_result,
            away_won_previous: away_state.last_result,
            home_win_streak: home_state.win_streak,
            away_win_streak: away_state.win_streak,
            home_higher_rank: home_rank < away_rank,
            home_won_last_h2h: state.last_h2h_winner(home, away) == Some(home),
        };

        record.home_win = home_win;
        state.record_result(record.winner(), record.loser());

        Ok(EnrichedGame {
            record,
            features,
            tied,
        })
    }
}
