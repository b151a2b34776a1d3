//! Weighted multi-factor historical predictor

use crate::analysis::{AnalysisSession, MARGIN_SCALE};
use crate::predict::{canonical_sides, decide, Factor, PredictionResult, Predictor, Side};
use crate::{Result, Seed, TeamId};

/// Predicts from team history, seed history and head-to-head records
pub struct HistoricalPredictor<'a> {
    session: &'a AnalysisSession,
}

impl<'a> HistoricalPredictor<'a> {
    pub fn new(session: &'a AnalysisSession) -> Self {
        HistoricalPredictor { session }
    }

    /// Predict with raw seed numbers, validating them first
    pub fn predict_winner(
        &self,
        team1: &str,
        team2: &str,
        seed1: u8,
        seed2: u8,
    ) -> Result<PredictionResult> {
        self.predict(team1, team2, Seed::new(seed1)?, Seed::new(seed2)?)
    }

    fn tournament_success(&self, first: Side, second: Side) -> f64 {
        let stats = self.session.team_stats();
        let a = stats.get_or_default(first.team.id);
        let b = stats.get_or_default(second.team.id);
        let edge = (a.win_percentage - b.win_percentage)
            + (a.avg_scoring_margin - b.avg_scoring_margin) / MARGIN_SCALE;
        0.5 + 0.5 * edge.clamp(-1.0, 1.0)
    }

    /// Chance that `first` beats `second` on seed alone
    fn seed_advantage(&self, first: Side, second: Side) -> Result<f64> {
        match first.seed.cmp(&second.seed) {
            std::cmp::Ordering::Equal => Ok(0.5),
            std::cmp::Ordering::Less => {
                let upset = self
                    .session
                    .get_upset_probability(first.seed.get(), second.seed.get())?;
                Ok(1.0 - upset)
            }
            std::cmp::Ordering::Greater => self
                .session
                .get_upset_probability(second.seed.get(), first.seed.get()),
        }
    }

    fn head_to_head(&self, first: Side, second: Side) -> f64 {
        self.session
            .head_to_head(first.team.id, second.team.id)
            .as_probability()
    }

    fn seed_history(&self, first: Side, second: Side) -> Result<f64> {
        if first.seed == second.seed {
            return Ok(0.5);
        }
        let (better, worse) = (first.seed.min(second.seed), first.seed.max(second.seed));
        let strength = match self.session.seed_table().favorite_history(better, worse) {
            Some(stats) => stats.favorite_strength(),
            None => 1.0 - self.session.get_upset_probability(better.get(), worse.get())?,
        };
        Ok(if first.seed == better {
            strength
        } else {
            1.0 - strength
        })
    }

    fn experience(&self, first: Side, second: Side) -> f64 {
        let a = self.session.experience(first.team.id);
        let b = self.session.experience(second.team.id);
        0.5 + 0.5 * (a - b)
    }
}

impl Predictor for HistoricalPredictor<'_> {
    fn name(&self) -> &'static str {
        "historical"
    }

    fn resolve(&self, name: &str) -> Result<TeamId> {
        Ok(self.session.resolve_team(name)?.id)
    }

    fn predict(&self, team1: &str, team2: &str, seed1: Seed, seed2: Seed) -> Result<PredictionResult> {
        let (first, second) = canonical_sides(self.session, team1, team2, seed1, seed2)?;

        let scores = [
            (Factor::TournamentSuccess, self.tournament_success(first, second)),
            (Factor::SeedAdvantage, self.seed_advantage(first, second)?),
            (Factor::HeadToHead, self.head_to_head(first, second)),
            (Factor::SeedHistory, self.seed_history(first, second)?),
            (Factor::Experience, self.experience(first, second)),
        ]
        .map(|(factor, score)| (factor, factor.weight(), score));

        let result = decide(self.name(), first, second, &scores);
        log::debug!(
            "{} ({}) vs {} ({}): {} at {:.3}",
            first.team.name,
            first.seed,
            second.team.name,
            second.seed,
            result.winner.name,
            result.confidence
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{fixtures, MemoryStore};
    use crate::{BracketError, ModelConfig};
    use proptest::prelude::*;
    use std::sync::OnceLock;

    fn session() -> &'static AnalysisSession {
        static SESSION: OnceLock<AnalysisSession> = OnceLock::new();
        SESSION.get_or_init(|| {
            AnalysisSession::build(&fixtures::historical_store(), ModelConfig::default()).unwrap()
        })
    }

    #[test]
    fn test_top_seed_beats_sixteen_seed() {
        let predictor = HistoricalPredictor::new(session());
        let result = predictor
            .predict_winner("Gonzaga", "Norfolk State", 1, 16)
            .unwrap();

        assert_eq!(result.winner.name, "Gonzaga");
        assert_eq!(result.loser.name, "Norfolk State");
        assert!(result.confidence >= 0.9, "confidence {}", result.confidence);
        assert!(!result.is_upset());
        assert_eq!(result.strategy, "historical");
        assert_eq!(result.breakdown.len(), 5);
        // Never met
        assert!((result.contribution(Factor::HeadToHead).unwrap() - 0.075).abs() < 1e-12);
    }

    #[test]
    fn test_breakdown_sums_to_confidence() {
        let predictor = HistoricalPredictor::new(session());
        for (a, b, sa, sb) in [
            ("Gonzaga", "Norfolk State", 1, 16),
            ("East 12", "East 5", 12, 5),
            ("West 9", "West 8", 9, 8),
        ] {
            let result = predictor.predict_winner(a, b, sa, sb).unwrap();
            let total: f64 = result.breakdown_map().values().sum();
            assert!((total - result.confidence).abs() < 1e-9);
            for c in &result.breakdown {
                assert!((0.0..=1.0).contains(&c.score));
                assert!((c.contribution - c.weight * c.score).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_equal_inputs_tie_goes_to_name_order() {
        let mut store = MemoryStore::new();
        store.add_team("Zavier");
        store.add_team("Abilene");
        let session = AnalysisSession::build(&store, ModelConfig::default()).unwrap();
        let predictor = HistoricalPredictor::new(&session);

        let result = predictor.predict_winner("Zavier", "Abilene", 6, 6).unwrap();
        assert_eq!(result.winner.name, "Abilene");
        assert_eq!(result.confidence, 0.5);

        let reversed = predictor.predict_winner("Abilene", "Zavier", 6, 6).unwrap();
        assert_eq!(reversed.winner.name, "Abilene");
    }

    #[test]
    fn test_no_history_still_predicts() {
        let mut store = MemoryStore::new();
        store.add_team("Newcomer A");
        store.add_team("Newcomer B");
        let session = AnalysisSession::build(&store, ModelConfig::default()).unwrap();
        let result = HistoricalPredictor::new(&session)
            .predict_winner("Newcomer B", "Newcomer A", 3, 14)
            .unwrap();
        assert_eq!(result.winner.name, "Newcomer B");
        assert!(result.confidence > 0.5);
    }

    #[test]
    fn test_errors() {
        let predictor = HistoricalPredictor::new(session());
        assert!(matches!(
            predictor.predict_winner("Gonzaga", "Atlantis", 1, 16),
            Err(BracketError::UnknownTeam(name)) if name == "Atlantis"
        ));
        assert!(matches!(
            predictor.predict_winner("Gonzaga", "East 16", 1, 17),
            Err(BracketError::InvalidSeed(17))
        ));
        assert!(matches!(
            predictor.predict_winner("Gonzaga", "GONZAGA", 1, 1),
            Err(BracketError::SameTeam(_))
        ));
    }

    fn team_name() -> impl Strategy<Value = String> {
        (0usize..4, prop::sample::select(fixtures::REGION_SEED_ORDER.to_vec()))
            .prop_map(|(region, seed)| fixtures::team_name(fixtures::LAST_YEAR, region, seed))
    }

    proptest! {
        #[test]
        fn prop_symmetric_and_bounded(
            a in team_name(),
            b in team_name(),
            sa in 1u8..=16,
            sb in 1u8..=16,
        ) {
            prop_assume!(a != b);
            let predictor = HistoricalPredictor::new(session());
            let forward = predictor.predict_winner(&a, &b, sa, sb).unwrap();
            let backward = predictor.predict_winner(&b, &a, sb, sa).unwrap();

            prop_assert_eq!(&forward.winner.name, &backward.winner.name);
            prop_assert_eq!(forward.confidence, backward.confidence);
            prop_assert!(forward.confidence >= 0.5 && forward.confidence <= 1.0);
            prop_assert_eq!(forward, backward);
        }
    }
}
