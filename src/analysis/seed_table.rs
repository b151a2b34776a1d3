//! Seed matchup table
//!
//! Upset statistics for every unordered pair of distinct seeds. Pairs with
//! no history fall back to an estimate from the favorite's observed row.

use crate::analysis::MARGIN_SCALE;
use crate::data::HistoricalRecordStore;
use crate::{BracketError, HistoricalGame, Result, Seed};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Historical results for one seed pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedMatchupStats {
    /// Numerically lower seed
    pub favorite: Seed,
    /// Numerically higher seed
    pub underdog: Seed,
    pub total_games: u32,
    /// Games won by the underdog
    pub upsets: u32,
    pub upset_rate: f64,
    /// Mean winning margin
    pub avg_point_differential: f64,
    /// Mean of favorite score minus underdog score
    pub avg_favorite_margin: f64,
    #[serde(skip)]
    differential_total: u64,
    #[serde(skip)]
    favorite_margin_total: i64,
}

impl SeedMatchupStats {
    fn new(favorite: Seed, underdog: Seed) -> Self {
        SeedMatchupStats {
            favorite,
            underdog,
            total_games: 0,
            upsets: 0,
            upset_rate: 0.0,
            avg_point_differential: 0.0,
            avg_favorite_margin: 0.0,
            differential_total: 0,
            favorite_margin_total: 0,
        }
    }

    fn record(&mut self, game: &HistoricalGame) {
        let (favorite_score, underdog_score) = if game.seed_a == self.favorite {
            (game.score_a, game.score_b)
        } else {
            (game.score_b, game.score_a)
        };

        self.total_games += 1;
        if game.winner_seed() == self.underdog {
            self.upsets += 1;
        }
        self.differential_total += game.margin() as u64;
        self.favorite_margin_total += favorite_score as i64 - underdog_score as i64;

        let total = self.total_games as f64;
        self.upset_rate = self.upsets as f64 / total;
        self.avg_point_differential = self.differential_total as f64 / total;
        self.avg_favorite_margin = self.favorite_margin_total as f64 / total;
    }

    pub fn has_history(&self) -> bool {
        self.total_games > 0
    }

    /// Favorite's edge from margin trend and upset resistance, in [0, 1]
    pub fn favorite_strength(&self) -> f64 {
        let margin = (self.avg_favorite_margin / MARGIN_SCALE).clamp(-1.0, 1.0);
        0.5 * (0.5 + 0.5 * margin) + 0.5 * (1.0 - self.upset_rate)
    }
}

/// Baseline upset rate for a seed gap when no history is close enough
pub fn upset_prior(gap: u8) -> f64 {
    0.5 * (1.0 - gap as f64 / Seed::MAX as f64)
}

/// Per-seed-pair upset statistics covering all 120 pairs
#[derive(Debug, Clone)]
pub struct SeedMatchupTable {
    pairs: BTreeMap<(Seed, Seed), SeedMatchupStats>,
}

impl SeedMatchupTable {
    /// A table with every pair present and no games
    pub fn empty() -> Self {
        let mut pairs = BTreeMap::new();
        for favorite in Seed::all() {
            for underdog in Seed::all().filter(|s| *s > favorite) {
                pairs.insert((favorite, underdog), SeedMatchupStats::new(favorite, underdog));
            }
        }
        SeedMatchupTable { pairs }
    }

    pub fn from_games<'a, I>(games: I) -> Self
    where
        I: IntoIterator<Item = &'a HistoricalGame>,
    {
        let mut table = Self::empty();
        for game in games {
            table.record(game);
        }
        table
    }

    /// Query the store once per seed pair
    pub fn from_store<S: HistoricalRecordStore + ?Sized>(store: &S) -> Result<Self> {
        let mut table = Self::empty();
        let keys: Vec<(Seed, Seed)> = table.pairs.keys().copied().collect();
        for (favorite, underdog) in keys {
            for game in store.games_for_seed_pair(favorite, underdog)? {
                table.record(&game);
            }
        }
        Ok(table)
    }

    fn record(&mut self, game: &HistoricalGame) {
        let key = (game.seed_a.min(game.seed_b), game.seed_a.max(game.seed_b));
        if let Some(stats) = self.pairs.get_mut(&key) {
            stats.record(game);
        }
    }

    /// Statistics for a pair in either order; `None` for equal seeds
    pub fn get(&self, a: Seed, b: Seed) -> Option<&SeedMatchupStats> {
        self.pairs.get(&(a.min(b), a.max(b)))
    }

    /// The pair's statistics only if it has been played
    pub fn favorite_history(&self, favorite: Seed, underdog: Seed) -> Option<&SeedMatchupStats> {
        self.get(favorite, underdog).filter(|s| s.has_history())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SeedMatchupStats> {
        self.pairs.values()
    }

    /// Probability that `lower_seed` beats `higher_seed`
    ///
    /// Observed pairs return their upset rate. Unobserved pairs interpolate
    /// between the nearest observed underdog seeds in the favorite's row, and
    /// are bounded by [`upset_prior`] when only one side has been observed.
    pub fn upset_probability(&self, higher_seed: u8, lower_seed: u8) -> Result<f64> {
        let favorite = Seed::new(higher_seed)?;
        let underdog = Seed::new(lower_seed)?;
        if favorite >= underdog {
            return Err(BracketError::InvalidSeedPair {
                higher: higher_seed,
                lower: lower_seed,
            });
        }

        if let Some(stats) = self.favorite_history(favorite, underdog) {
            return Ok(stats.upset_rate.clamp(0.0, 1.0));
        }

        let observed = |s: &&SeedMatchupStats| s.favorite == favorite && s.has_history();
        let below = self
            .pairs
            .range((favorite, favorite)..(favorite, underdog))
            .map(|(_, s)| s)
            .filter(observed)
            .next_back();
        let above = self
            .pairs
            .range((favorite, underdog)..)
            .map(|(_, s)| s)
            .find(observed);

        let prior = upset_prior(lower_seed - higher_seed);
        let estimate = match (below, above) {
            (Some(lo), Some(hi)) => {
                let span = (hi.underdog.get() - lo.underdog.get()) as f64;
                let t = (underdog.get() - lo.underdog.get()) as f64 / span;
                lo.upset_rate + (hi.upset_rate - lo.upset_rate) * t
            }
            (None, Some(hi)) => hi.upset_rate.max(prior),
            (Some(lo), None) => lo.upset_rate.min(prior),
            (None, None) => prior,
        };

        Ok(estimate.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, MemoryStore};
    use crate::Round;

    fn seed(value: u8) -> Seed {
        Seed::new(value).unwrap()
    }

    /// Ten games each for 1v4 (3 upsets), 1v8 (2 upsets) and 1v16 (none)
    fn sparse_store() -> MemoryStore {
        let mut store = MemoryStore::new();
        for (underdog, upsets) in [(4u8, 3u16), (8, 2), (16, 0)] {
            for i in 0..10u16 {
                let fav = format!("Fav {} {}", underdog, i);
                let dog = format!("Dog {} {}", underdog, i);
                let (fav_score, dog_score) = if i < upsets { (60, 65) } else { (75, 60) };
                store
                    .record(2000 + i, Round::RoundOf64, (&fav, 1, fav_score), (&dog, underdog, dog_score))
                    .unwrap();
            }
        }
        store
    }

    #[test]
    fn test_covers_all_pairs() {
        let table = SeedMatchupTable::empty();
        assert_eq!(table.len(), 120);
        assert!(table.get(seed(3), seed(3)).is_none());
        assert_eq!(table.get(seed(12), seed(5)).unwrap().total_games, 0);
    }

    #[test]
    fn test_observed_pair_statistics() {
        let store = sparse_store();
        let table = SeedMatchupTable::from_store(&store).unwrap();
        let stats = table.get(seed(4), seed(1)).unwrap();
        assert_eq!(stats.total_games, 10);
        assert_eq!(stats.upsets, 3);
        assert!((stats.upset_rate - 0.3).abs() < 1e-12);
        // 3 upsets by 5, 7 wins by 15
        assert!((stats.avg_point_differential - 12.0).abs() < 1e-12);
        assert!((stats.avg_favorite_margin - 9.0).abs() < 1e-12);
        assert!((table.upset_probability(1, 4).unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_from_games_matches_from_store() {
        let store = sparse_store();
        let a = SeedMatchupTable::from_store(&store).unwrap();
        let b = SeedMatchupTable::from_games(store.games());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x, y);
        }
    }

    #[test]
    fn test_fallback_interpolates_between_neighbours() {
        let table = SeedMatchupTable::from_store(&sparse_store()).unwrap();
        // between 1v4 (0.3) and 1v8 (0.2)
        assert!((table.upset_probability(1, 6).unwrap() - 0.25).abs() < 1e-12);
        // between 1v8 (0.2) and 1v16 (0.0)
        assert!((table.upset_probability(1, 12).unwrap() - 0.1).abs() < 1e-12);
        // only a weaker neighbour: bounded below by the prior
        assert!((table.upset_probability(1, 2).unwrap() - upset_prior(1)).abs() < 1e-12);
    }

    #[test]
    fn test_upset_probability_non_increasing_in_underdog_seed() {
        for table in [
            SeedMatchupTable::from_store(&sparse_store()).unwrap(),
            SeedMatchupTable::empty(),
        ] {
            let rates: Vec<f64> = (2..=16)
                .map(|k| table.upset_probability(1, k).unwrap())
                .collect();
            for pair in rates.windows(2) {
                assert!(pair[1] <= pair[0], "{:?}", rates);
            }
            assert!(rates.iter().all(|r| (0.0..=1.0).contains(r)));
        }
        let empty = SeedMatchupTable::empty();
        assert!(empty.upset_probability(1, 2).unwrap() > empty.upset_probability(1, 3).unwrap());
    }

    #[test]
    fn test_invalid_pairs() {
        let table = SeedMatchupTable::empty();
        assert!(matches!(
            table.upset_probability(12, 5),
            Err(BracketError::InvalidSeedPair { higher: 12, lower: 5 })
        ));
        assert!(matches!(
            table.upset_probability(4, 4),
            Err(BracketError::InvalidSeedPair { .. })
        ));
        assert!(matches!(table.upset_probability(0, 5), Err(BracketError::InvalidSeed(0))));
        assert!(matches!(table.upset_probability(1, 17), Err(BracketError::InvalidSeed(17))));
    }

    #[test]
    fn test_classic_pairing_beats_top_seed_pairing() {
        let table = SeedMatchupTable::from_store(&fixtures::historical_store()).unwrap();
        let five_twelve = table.upset_probability(5, 12).unwrap();
        let one_sixteen = table.upset_probability(1, 16).unwrap();
        assert!((five_twelve - 1.0 / 3.0).abs() < 1e-12);
        assert!((one_sixteen - 1.0 / 60.0).abs() < 1e-12);
        assert!(five_twelve > one_sixteen + 0.2);
    }
}
