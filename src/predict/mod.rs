//! Matchup prediction
//!
//! Predictors score a matchup from the better-ranked side first, so the
//! result does not depend on argument order.

pub mod historical;
pub mod result;
pub mod seed;

pub use historical::HistoricalPredictor;
pub use result::{Factor, FactorContribution, PredictionResult};
pub use seed::SeedPredictor;

use crate::analysis::AnalysisSession;
use crate::{BracketError, Result, Seed, Team, TeamId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Decides a winner for a pair of seeded teams
pub trait Predictor: Send + Sync {
    fn name(&self) -> &'static str;

    /// The id a name or alias refers to, or `UnknownTeam`
    fn resolve(&self, name: &str) -> Result<TeamId>;

    fn predict(&self, team1: &str, team2: &str, seed1: Seed, seed2: Seed) -> Result<PredictionResult>;
}

/// Available prediction strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    #[default]
    Historical,
    Seed,
}

impl Strategy {
    pub fn predictor<'a>(&self, session: &'a AnalysisSession) -> Box<dyn Predictor + 'a> {
        match self {
            Strategy::Historical => Box::new(HistoricalPredictor::new(session)),
            Strategy::Seed => Box::new(SeedPredictor::new(session)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Historical => "historical",
            Strategy::Seed => "seed",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Strategy {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "historical" => Ok(Strategy::Historical),
            "seed" | "seed-only" => Ok(Strategy::Seed),
            _ => Err(BracketError::Parse(format!("Unknown strategy: {}", s))),
        }
    }
}

/// A resolved team with the seed it holds in this matchup
#[derive(Debug, Clone, Copy)]
pub(crate) struct Side<'a> {
    pub team: &'a Team,
    pub seed: Seed,
}

/// Resolve both teams and put the better-ranked side first
///
/// Better seed, then name, then id.
pub(crate) fn canonical_sides<'a>(
    session: &'a AnalysisSession,
    team1: &str,
    team2: &str,
    seed1: Seed,
    seed2: Seed,
) -> Result<(Side<'a>, Side<'a>)> {
    let first = Side {
        team: session.resolve_team(team1)?,
        seed: seed1,
    };
    let second = Side {
        team: session.resolve_team(team2)?,
        seed: seed2,
    };
    if first.team.id == second.team.id {
        return Err(BracketError::SameTeam(first.team.name.clone()));
    }

    let order = first
        .seed
        .cmp(&second.seed)
        .then_with(|| first.team.name.cmp(&second.team.name))
        .then_with(|| first.team.id.cmp(&second.team.id));
    Ok(match order {
        Ordering::Greater => (second, first),
        _ => (first, second),
    })
}

/// Combine per-factor scores for `first` into a result
///
/// The raw score is `0.5 + sum(weight * (score - 0.5))`; `first` wins ties.
pub(crate) fn decide(
    strategy: &str,
    first: Side,
    second: Side,
    scores: &[(Factor, f64, f64)],
) -> PredictionResult {
    let raw = 0.5 + scores.iter().map(|(_, w, s)| w * (s - 0.5)).sum::<f64>();
    let raw = raw.clamp(0.0, 1.0);
    let first_wins = raw >= 0.5;

    let (winner, loser) = if first_wins {
        (first, second)
    } else {
        (second, first)
    };
    let breakdown = scores
        .iter()
        .map(|&(factor, weight, score)| {
            let score = if first_wins { score } else { 1.0 - score };
            FactorContribution {
                factor,
                weight,
                score,
                contribution: weight * score,
            }
        })
        .collect();

    PredictionResult {
        winner: winner.team.clone(),
        loser: loser.team.clone(),
        winner_seed: winner.seed,
        loser_seed: loser.seed,
        confidence: if first_wins { raw } else { 1.0 - raw },
        strategy: strategy.to_string(),
        breakdown,
    }
}
