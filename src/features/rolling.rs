//! Win percentage over time
//!
//! Folds a labelled game sequence (actual or predicted) into per-date
//! snapshots of each team's win percentage, for charting.

use crate::data::teams::TeamRegistry;
use crate::TeamId;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, VecDeque};

/// Minimal view of a labelled game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelledGame {
    pub date: NaiveDate,
    pub home_team: TeamId,
    pub away_team: TeamId,
    pub home_win: bool,
}

/// Results window for one team
#[derive(Debug, Clone, Default)]
struct TeamWindow {
    results: VecDeque<bool>,
    wins: usize,
}

impl TeamWindow {
    fn push(&mut self, won: bool, window: Option<usize>) {
        self.results.push_back(won);
        if won {
            self.wins += 1;
        }
        if let Some(limit) = window {
            while self.results.len() > limit {
                if self.results.pop_front() == Some(true) {
                    self.wins -= 1;
                }
            }
        }
    }

    fn pct(&self) -> f32 {
        if self.results.is_empty() {
            0.0
        } else {
            self.wins as f32 / self.results.len() as f32
        }
    }
}

/// Per-date win percentage snapshots
#[derive(Debug, Clone, Default)]
pub struct WinPercentageTimeline {
    /// Last `n` games per team, or all games when `None`
    window: Option<usize>,
    teams: HashMap<TeamId, TeamWindow>,
    snapshots: BTreeMap<NaiveDate, HashMap<TeamId, f32>>,
}

impl WinPercentageTimeline {
    /// Cumulative win percentage
    pub fn cumulative() -> Self {
        Self::default()
    }

    /// Win percentage over each team's last `window` games
    pub fn rolling(window: usize) -> Self {
        WinPercentageTimeline {
            window: Some(window.max(1)),
            ..Self::default()
        }
    }

    /// Add a game (games must arrive in date order)
    pub fn add_game(&mut self, game: &LabelledGame) {
        let window = self.window;
        self.teams
            .entry(game.home_team)
            .or_default()
            .push(game.home_win, window);
        self.teams
            .entry(game.away_team)
            .or_default()
            .push(!game.home_win, window);

        // Every team that has played so far appears in the snapshot
        let snapshot = self
            .teams
            .iter()
            .map(|(team, w)| (*team, w.pct()))
            .collect();
        self.snapshots.insert(game.date, snapshot);
    }

    /// Build a timeline from a sequence of games
    pub fn from_games<'a, I>(games: I, window: Option<usize>) -> Self
    where
        I: IntoIterator<Item = &'a LabelledGame>,
    {
        let mut timeline = match window {
            Some(n) => Self::rolling(n),
            None => Self::cumulative(),
        };
        for game in games {
            timeline.add_game(game);
        }
        timeline
    }

    /// Team percentage as of a date (last snapshot on or before it)
    pub fn pct_on(&self, date: NaiveDate, team: TeamId) -> Option<f32> {
        self.snapshots
            .range(..=date)
            .next_back()
            .and_then(|(_, snap)| snap.get(&team).copied())
    }

    /// Snapshots keyed by team name, ready for serialization
    pub fn by_name(&self, registry: &TeamRegistry) -> BTreeMap<NaiveDate, BTreeMap<String, f32>> {
        self.snapshots
            .iter()
            .map(|(date, snap)| {
                let named = snap
                    .iter()
                    .map(|(team, pct)| (registry.name(*team).to_string(), *pct))
                    .collect();
                (*date, named)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
