//! Seed-only predictor

use crate::analysis::AnalysisSession;
use crate::predict::{canonical_sides, decide, Factor, PredictionResult, Predictor};
use crate::{Result, Seed, TeamId};

/// Picks winners from the seed matchup table alone
pub struct SeedPredictor<'a> {
    session: &'a AnalysisSession,
}

impl<'a> SeedPredictor<'a> {
    pub fn new(session: &'a AnalysisSession) -> Self {
        SeedPredictor { session }
    }
}

impl Predictor for SeedPredictor<'_> {
    fn name(&self) -> &'static str {
        "seed"
    }

    fn resolve(&self, name: &str) -> Result<TeamId> {
        Ok(self.session.resolve_team(name)?.id)
    }

    fn predict(&self, team1: &str, team2: &str, seed1: Seed, seed2: Seed) -> Result<PredictionResult> {
        let (first, second) = canonical_sides(self.session, team1, team2, seed1, seed2)?;
        // first never holds the worse seed
        let score = if first.seed == second.seed {
            0.5
        } else {
            1.0 - self
                .session
                .get_upset_probability(first.seed.get(), second.seed.get())?
        };
        Ok(decide(
            self.name(),
            first,
            second,
            &[(Factor::SeedAdvantage, 1.0, score)],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, MemoryStore};
    use crate::ModelConfig;

    fn seed(value: u8) -> Seed {
        Seed::new(value).unwrap()
    }

    #[test]
    fn test_better_seed_wins_by_upset_rate() {
        let session =
            AnalysisSession::build(&fixtures::historical_store(), ModelConfig::default()).unwrap();
        let predictor = SeedPredictor::new(&session);
        let result = predictor.predict("East 12", "East 5", seed(12), seed(5)).unwrap();

        assert_eq!(result.winner.name, "East 5");
        assert!((result.confidence - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.strategy, "seed");
        assert_eq!(result.breakdown.len(), 1);
        assert_eq!(result.breakdown[0].weight, 1.0);
    }

    #[test]
    fn test_equal_seeds_follow_name_order() {
        let mut store = MemoryStore::new();
        store.add_team("Yale");
        store.add_team("Akron");
        let session = AnalysisSession::build(&store, ModelConfig::default()).unwrap();
        let result = SeedPredictor::new(&session)
            .predict("Yale", "Akron", seed(13), seed(13))
            .unwrap();
        assert_eq!(result.winner.name, "Akron");
        assert_eq!(result.confidence, 0.5);
    }
}
