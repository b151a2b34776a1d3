//! Analysis session

use crate::analysis::{HeadToHead, HeadToHeadIndex, SeedMatchupTable, TeamStatsAggregator, TeamTournamentStats};
use crate::data::HistoricalRecordStore;
use crate::{BracketError, ModelConfig, Result, Seed, Team, TeamId};
use serde::{Deserialize, Serialize};

/// Immutable snapshot of the historical read models
///
/// Built once from a record store; predictors borrow it and several
/// simulations may share it across threads.
#[derive(Debug, Clone)]
pub struct AnalysisSession {
    teams: Vec<Team>,
    team_stats: TeamStatsAggregator,
    seed_table: SeedMatchupTable,
    head_to_head: HeadToHeadIndex,
    config: ModelConfig,
}

/// Auditable summary of a single matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupAnalysis {
    pub team1: String,
    pub team2: String,
    pub seed1: Seed,
    pub seed2: Seed,
    pub team1_stats: TeamTournamentStats,
    pub team2_stats: TeamTournamentStats,
    pub head_to_head: HeadToHead,
    pub head_to_head_win_pct: f64,
    /// Chance the worse seed wins; `None` for equal seeds
    pub upset_probability: Option<f64>,
}

impl AnalysisSession {
    pub fn build<S: HistoricalRecordStore + ?Sized>(store: &S, config: ModelConfig) -> Result<Self> {
        config.validate()?;

        let teams = store.teams()?;
        let team_stats = TeamStatsAggregator::from_store(store)?;
        let seed_table = SeedMatchupTable::from_store(store)?;
        let head_to_head =
            HeadToHeadIndex::from_store(store, &team_stats, config.head_to_head_decay)?;

        log::info!(
            "Built analysis session: {} teams, {} head-to-head pairs, latest year {:?}",
            teams.len(),
            head_to_head.len(),
            team_stats.latest_year()
        );

        Ok(AnalysisSession {
            teams,
            team_stats,
            seed_table,
            head_to_head,
            config,
        })
    }

    /// Find a team by name or alias
    pub fn resolve_team(&self, name: &str) -> Result<&Team> {
        self.teams
            .iter()
            .find(|t| t.matches_name(name))
            .ok_or_else(|| BracketError::UnknownTeam(name.to_string()))
    }

    pub fn get_team_tournament_stats(&self, name: &str) -> Result<TeamTournamentStats> {
        let team = self.resolve_team(name)?;
        Ok(self.team_stats.get_or_default(team.id))
    }

    pub fn get_upset_probability(&self, higher_seed: u8, lower_seed: u8) -> Result<f64> {
        self.seed_table.upset_probability(higher_seed, lower_seed)
    }

    /// Experience in [0, 1] from appearances and how recent the last deep run was
    pub fn experience(&self, team: TeamId) -> f64 {
        let Some(stats) = self.team_stats.get(team) else {
            return 0.0;
        };
        let appearances =
            (stats.appearances as f64 / self.config.experience_full_appearances as f64).min(1.0);
        let recency = match (stats.last_deep_run, self.team_stats.latest_year()) {
            (Some(run), Some(latest)) => {
                let age = latest.saturating_sub(run) as f64;
                (1.0 - age / self.config.deep_run_horizon_years as f64).max(0.0)
            }
            _ => 0.0,
        };
        0.7 * appearances + 0.3 * recency
    }

    pub fn matchup_analysis(
        &self,
        team1: &str,
        team2: &str,
        seed1: u8,
        seed2: u8,
    ) -> Result<MatchupAnalysis> {
        let first = self.resolve_team(team1)?;
        let second = self.resolve_team(team2)?;
        if first.id == second.id {
            return Err(BracketError::SameTeam(first.name.clone()));
        }
        let seed1 = Seed::new(seed1)?;
        let seed2 = Seed::new(seed2)?;

        let head_to_head = self.head_to_head.get(first.id, second.id);
        let upset_probability = if seed1 == seed2 {
            None
        } else {
            let (better, worse) = (seed1.min(seed2), seed1.max(seed2));
            Some(self.get_upset_probability(better.get(), worse.get())?)
        };

        Ok(MatchupAnalysis {
            team1: first.name.clone(),
            team2: second.name.clone(),
            seed1,
            seed2,
            team1_stats: self.team_stats.get_or_default(first.id),
            team2_stats: self.team_stats.get_or_default(second.id),
            head_to_head_win_pct: head_to_head.win_percentage(),
            head_to_head,
            upset_probability,
        })
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn team_stats(&self) -> &TeamStatsAggregator {
        &self.team_stats
    }

    pub fn seed_table(&self) -> &SeedMatchupTable {
        &self.seed_table
    }

    pub fn head_to_head(&self, team1: TeamId, team2: TeamId) -> HeadToHead {
        self.head_to_head.get(team1, team2)
    }

    pub fn latest_year(&self) -> Option<u16> {
        self.team_stats.latest_year()
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}
