//! Running state for one chronological pass
//!
//! A [`PassState`] is created empty for each partition and dropped at the
//! end of the pass. It is never shared between the training and prediction
//! partitions.

use crate::TeamId;
use std::collections::HashMap;

/// What a team carries from its most recent game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeamState {
    /// Won its most recent game
    pub last_result: bool,
    /// Consecutive wins ending at the most recent game
    pub win_streak: u32,
}

impl TeamState {
    fn record(&mut self, won: bool) {
        self.last_result = won;
        if won {
            self.win_streak += 1;
        } else {
            self.win_streak = 0;
        }
    }
}

/// Unordered pair of teams, stored with the lower id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(TeamId, TeamId);

impl PairKey {
    pub fn new(a: TeamId, b: TeamId) -> Self {
        if a <= b {
            PairKey(a, b)
        } else {
            PairKey(b, a)
        }
    }
}

/// Team and head-to-head stores for a single pass
#[derive(Debug, Clone, Default)]
pub struct PassState {
    teams: HashMap<TeamId, TeamState>,
    last_h2h_winner: HashMap<PairKey, TeamId>,
}

impl PassState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State of a team before its next game (default if unseen)
    pub fn team(&self, team: TeamId) -> TeamState {
        self.teams.get(&team).copied().unwrap_or_default()
    }

    /// Winner of the most recent meeting between two teams, regardless of venue
    pub fn last_h2h_winner(&self, a: TeamId, b: TeamId) -> Option<TeamId> {
        self.last_h2h_winner.get(&PairKey::new(a, b)).copied()
    }

    /// Apply a finished game
    pub fn record_result(&mut self, winner: TeamId, loser: TeamId) {
        self.teams.entry(winner).or_default().record(true);
        self.teams.entry(loser).or_default().record(false);
        self.last_h2h_winner.insert(PairKey::new(winner, loser), winner);
    }

    /// Number of teams seen so far
    pub fn team_count(&self) -> usize {
        self.teams.len()
    }
}
