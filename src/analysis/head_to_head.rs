//! Head-to-head records between specific teams

use crate::analysis::{TeamStatsAggregator, MARGIN_SCALE};
use crate::data::HistoricalRecordStore;
use crate::{HistoricalGame, Result, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Direct meetings between two teams, from team1's side
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    pub games: u32,
    pub team1_wins: u32,
    pub team2_wins: u32,
    /// team1's average signed margin
    pub avg_margin: f64,
    /// Recency-weighted score in [-1, 1], positive favors team1
    pub score: f64,
}

impl HeadToHead {
    /// Score the meetings between two teams
    ///
    /// Each meeting counts `0.75 + 0.25 * min(margin / 20, 1)` for its winner,
    /// weighted by `decay ^ (latest meeting year - year)`.
    pub fn resolve(team1: TeamId, team2: TeamId, games: &[HistoricalGame], decay: f64) -> Self {
        let meetings: Vec<&HistoricalGame> = games
            .iter()
            .filter(|g| g.involves(team1) && g.involves(team2) && team1 != team2)
            .collect();
        let Some(latest) = meetings.iter().map(|g| g.year).max() else {
            return HeadToHead::default();
        };

        let mut result = HeadToHead::default();
        let mut margin_total = 0i64;
        let mut weighted = 0.0;
        let mut weight_total = 0.0;

        for game in &meetings {
            let team1_won = game.winner == team1;
            let margin = game.margin() as f64;
            let strength = 0.75 + 0.25 * (margin / MARGIN_SCALE).min(1.0);
            let weight = decay.powi((latest - game.year) as i32);

            result.games += 1;
            if team1_won {
                result.team1_wins += 1;
                margin_total += game.margin() as i64;
                weighted += weight * strength;
            } else {
                result.team2_wins += 1;
                margin_total -= game.margin() as i64;
                weighted -= weight * strength;
            }
            weight_total += weight;
        }

        result.avg_margin = margin_total as f64 / result.games as f64;
        result.score = (weighted / weight_total).clamp(-1.0, 1.0);
        result
    }

    /// The same record from team2's side
    pub fn reversed(&self) -> Self {
        HeadToHead {
            games: self.games,
            team1_wins: self.team2_wins,
            team2_wins: self.team1_wins,
            avg_margin: -self.avg_margin,
            score: -self.score,
        }
    }

    /// Score rescaled to [0, 1]
    pub fn as_probability(&self) -> f64 {
        (self.score + 1.0) / 2.0
    }

    /// team1's share of the meetings, 0.5 when they never met
    pub fn win_percentage(&self) -> f64 {
        if self.games == 0 {
            0.5
        } else {
            self.team1_wins as f64 / self.games as f64
        }
    }
}

/// Head-to-head records for every pair of teams that has met
#[derive(Debug, Clone, Default)]
pub struct HeadToHeadIndex {
    records: HashMap<(TeamId, TeamId), HeadToHead>,
}

impl HeadToHeadIndex {
    pub fn from_store<S: HistoricalRecordStore + ?Sized>(
        store: &S,
        aggregator: &TeamStatsAggregator,
        decay: f64,
    ) -> Result<Self> {
        let mut records = HashMap::new();
        for team in store.teams()? {
            for opponent in aggregator.opponents(team.id).filter(|o| *o > team.id) {
                let games = store.games_between(team.id, opponent)?;
                records.insert(
                    (team.id, opponent),
                    HeadToHead::resolve(team.id, opponent, &games, decay),
                );
            }
        }
        Ok(HeadToHeadIndex { records })
    }

    /// Record from team1's side; neutral when the teams never met
    pub fn get(&self, team1: TeamId, team2: TeamId) -> HeadToHead {
        if team1 <= team2 {
            self.records.get(&(team1, team2)).cloned().unwrap_or_default()
        } else {
            self.records
                .get(&(team2, team1))
                .map(HeadToHead::reversed)
                .unwrap_or_default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::MemoryStore;
    use crate::Round;

    fn rivalry() -> MemoryStore {
        let mut store = MemoryStore::new();
        // Duke won big long ago, UNC won narrowly last year
        store
            .record(2021, Round::EliteEight, ("Duke", 2, 90), ("North Carolina", 8, 60))
            .unwrap();
        store
            .record(2022, Round::FinalFour, ("North Carolina", 8, 81), ("Duke", 2, 77))
            .unwrap();
        store.add_team("Baylor");
        store
    }

    fn ids(store: &MemoryStore) -> (TeamId, TeamId) {
        (
            store.team_id("Duke").unwrap(),
            store.team_id("North Carolina").unwrap(),
        )
    }

    #[test]
    fn test_no_meetings_is_neutral() {
        let h2h = HeadToHead::resolve(TeamId(1), TeamId(2), &[], 0.8);
        assert_eq!(h2h.games, 0);
        assert_eq!(h2h.score, 0.0);
        assert_eq!(h2h.as_probability(), 0.5);
        assert_eq!(h2h.win_percentage(), 0.5);
    }

    #[test]
    fn test_recent_meeting_weighs_more() {
        let store = rivalry();
        let (duke, unc) = ids(&store);
        let games = store.games_between(duke, unc).unwrap();
        let h2h = HeadToHead::resolve(unc, duke, &games, 0.8);

        assert_eq!(h2h.games, 2);
        assert_eq!(h2h.team1_wins, 1);
        assert!((h2h.avg_margin - (4.0 - 30.0) / 2.0).abs() < 1e-12);
        // UNC: 0.75 + 0.25 * 0.2 = 0.8 at weight 1; Duke: 1.0 at weight 0.8
        let expected = (0.8 - 0.8) / 1.8;
        assert!((h2h.score - expected).abs() < 1e-12);

        // Without decay Duke's bigger win dominates
        let flat = HeadToHead::resolve(unc, duke, &games, 1.0);
        assert!(flat.score < h2h.score);
        assert!((-1.0..=1.0).contains(&flat.score));
    }

    #[test]
    fn test_index_orientation() {
        let store = rivalry();
        let (duke, unc) = ids(&store);
        let aggregator = TeamStatsAggregator::from_store(&store).unwrap();
        let index = HeadToHeadIndex::from_store(&store, &aggregator, 1.0).unwrap();
        assert_eq!(index.len(), 1);

        let forward = index.get(duke, unc);
        let backward = index.get(unc, duke);
        assert_eq!(forward.reversed(), backward);
        assert!(forward.score > 0.0);
        assert_eq!(forward.team1_wins, 1);

        let baylor = store.team_id("Baylor").unwrap();
        assert_eq!(index.get(baylor, duke), HeadToHead::default());
    }
}
