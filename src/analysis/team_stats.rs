//! Team tournament statistics
//!
//! Lifetime tournament aggregates for each team, built once per session.

use crate::data::HistoricalRecordStore;
use crate::{HistoricalGame, Result, Round, Seed, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Lifetime tournament statistics for a team
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamTournamentStats {
    /// Total tournament games played
    pub games_played: u32,
    pub wins: u32,
    pub losses: u32,
    /// wins / games_played, 0 with no games
    pub win_percentage: f64,
    pub points_scored: u32,
    pub points_allowed: u32,
    /// Average points scored minus allowed per game
    pub avg_scoring_margin: f64,
    /// Distinct tournament years
    pub appearances: u32,
    /// Mean seed over appearances, one seed per year
    pub average_seed: Option<f64>,
    /// Latest round reached
    pub best_round: Option<Round>,
    /// Championship games won
    pub championships: u32,
    pub last_appearance: Option<u16>,
    /// Latest year with a Sweet 16 or later game
    pub last_deep_run: Option<u16>,
}

impl TeamTournamentStats {
    /// Aggregate the games a team played; games it did not play are ignored
    pub fn from_games(team: TeamId, games: &[HistoricalGame]) -> Self {
        let mut stats = TeamTournamentStats::default();
        // year -> (earliest round, seed held in it)
        let mut seasons: BTreeMap<u16, (Round, Seed)> = BTreeMap::new();

        for game in games {
            let (Some(won), Some(score_for), Some(score_against), Some(seed)) = (
                game.did_win(team),
                game.score_for(team),
                game.score_against(team),
                game.seed_for(team),
            ) else {
                continue;
            };

            stats.games_played += 1;
            stats.points_scored += score_for as u32;
            stats.points_allowed += score_against as u32;
            if won {
                stats.wins += 1;
                if game.round == Round::Championship {
                    stats.championships += 1;
                }
            } else {
                stats.losses += 1;
            }

            stats.best_round = stats.best_round.max(Some(game.round));
            if game.round.is_deep_run() {
                stats.last_deep_run = stats.last_deep_run.max(Some(game.year));
            }

            let season = seasons.entry(game.year).or_insert((game.round, seed));
            if game.round < season.0 {
                *season = (game.round, seed);
            }
        }

        if stats.games_played > 0 {
            let played = stats.games_played as f64;
            stats.win_percentage = stats.wins as f64 / played;
            stats.avg_scoring_margin =
                (stats.points_scored as f64 - stats.points_allowed as f64) / played;
        }

        stats.appearances = seasons.len() as u32;
        stats.last_appearance = seasons.keys().next_back().copied();
        if !seasons.is_empty() {
            let seed_total: u32 = seasons.values().map(|(_, seed)| seed.get() as u32).sum();
            stats.average_seed = Some(seed_total as f64 / seasons.len() as f64);
        }

        stats
    }
}

/// Statistics for every known team
#[derive(Debug, Clone, Default)]
pub struct TeamStatsAggregator {
    stats: HashMap<TeamId, TeamTournamentStats>,
    opponents: HashMap<TeamId, BTreeSet<TeamId>>,
    latest_year: Option<u16>,
}

impl TeamStatsAggregator {
    /// Scan the store once per team
    pub fn from_store<S: HistoricalRecordStore + ?Sized>(store: &S) -> Result<Self> {
        let mut aggregator = TeamStatsAggregator::default();

        for team in store.teams()? {
            let games = store.games_for_team(team.id)?;
            let opponents = games.iter().filter_map(|g| g.opponent(team.id)).collect();
            aggregator.latest_year = aggregator
                .latest_year
                .max(games.iter().map(|g| g.year).max());
            aggregator
                .stats
                .insert(team.id, TeamTournamentStats::from_games(team.id, &games));
            aggregator.opponents.insert(team.id, opponents);
        }

        Ok(aggregator)
    }

    /// Get statistics for a team
    pub fn get(&self, team: TeamId) -> Option<&TeamTournamentStats> {
        self.stats.get(&team)
    }

    /// Get statistics for a team, or zero-valued statistics if not found
    pub fn get_or_default(&self, team: TeamId) -> TeamTournamentStats {
        self.stats.get(&team).cloned().unwrap_or_default()
    }

    /// Every team this team has met
    pub fn opponents(&self, team: TeamId) -> impl Iterator<Item = TeamId> + '_ {
        self.opponents.get(&team).into_iter().flatten().copied()
    }

    /// Most recent tournament year in the records
    pub fn latest_year(&self) -> Option<u16> {
        self.latest_year
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }
}
