//! Prediction results and their factor breakdown

use crate::{Seed, Team};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Signals combined by the historical model
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Factor {
    TournamentSuccess,
    SeedAdvantage,
    HeadToHead,
    SeedHistory,
    Experience,
}

impl Factor {
    pub const ALL: [Factor; 5] = [
        Factor::TournamentSuccess,
        Factor::SeedAdvantage,
        Factor::HeadToHead,
        Factor::SeedHistory,
        Factor::Experience,
    ];

    /// Fixed weight in the historical model; the weights sum to 1
    pub fn weight(&self) -> f64 {
        match self {
            Factor::TournamentSuccess => 0.25,
            Factor::SeedAdvantage => 0.30,
            Factor::HeadToHead => 0.15,
            Factor::SeedHistory => 0.20,
            Factor::Experience => 0.10,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Factor::TournamentSuccess => "tournament_success",
            Factor::SeedAdvantage => "seed_advantage",
            Factor::HeadToHead => "head_to_head",
            Factor::SeedHistory => "seed_history",
            Factor::Experience => "experience",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One factor's share of a prediction, from the winner's side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorContribution {
    pub factor: Factor,
    pub weight: f64,
    /// Normalized score in [0, 1]
    pub score: f64,
    /// weight * score
    pub contribution: f64,
}

/// Predicted outcome of one matchup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub winner: Team,
    pub loser: Team,
    pub winner_seed: Seed,
    pub loser_seed: Seed,
    /// Winner's probability, in [0.5, 1]
    pub confidence: f64,
    /// Name of the predictor that produced this result
    pub strategy: String,
    pub breakdown: Vec<FactorContribution>,
}

impl PredictionResult {
    pub fn contribution(&self, factor: Factor) -> Option<f64> {
        self.breakdown
            .iter()
            .find(|c| c.factor == factor)
            .map(|c| c.contribution)
    }

    /// Factor name -> contribution
    pub fn breakdown_map(&self) -> BTreeMap<&'static str, f64> {
        self.breakdown
            .iter()
            .map(|c| (c.factor.name(), c.contribution))
            .collect()
    }

    /// Won by the numerically worse seed
    pub fn is_upset(&self) -> bool {
        self.winner_seed > self.loser_seed
    }
}
