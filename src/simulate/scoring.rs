//! Bracket scoring against actual results

use crate::simulate::SimulationResult;
use crate::{HistoricalGame, Round, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Picks and points for one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundScore {
    pub round: Round,
    pub picks: u32,
    pub correct: u32,
    pub points: u32,
    pub possible: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketScore {
    pub rounds: Vec<RoundScore>,
    pub total_points: u32,
    pub possible_points: u32,
    pub correct_picks: u32,
}

/// Score a simulated bracket against the games actually played
///
/// A pick is correct when the simulated winner won a game of the same round
/// in `actual_games`. Team ids in both must come from the same record store.
/// Rounds without a standard name are not scored.
pub fn score_bracket(result: &SimulationResult, actual_games: &[HistoricalGame]) -> BracketScore {
    let winners: HashSet<(Round, TeamId)> =
        actual_games.iter().map(|g| (g.round, g.winner)).collect();

    let mut score = BracketScore {
        rounds: Vec::new(),
        total_points: 0,
        possible_points: 0,
        correct_picks: 0,
    };

    for simulated in &result.rounds {
        let Some(round) = simulated.round else {
            continue;
        };
        let picks = simulated.games.len() as u32;
        let correct = simulated
            .games
            .iter()
            .filter(|g| winners.contains(&(round, g.prediction.winner.id)))
            .count() as u32;

        let round_score = RoundScore {
            round,
            picks,
            correct,
            points: correct * round.points(),
            possible: picks * round.points(),
        };
        score.total_points += round_score.points;
        score.possible_points += round_score.possible;
        score.correct_picks += correct;
        score.rounds.push(round_score);
    }

    log::info!(
        "Bracket score: {} of {} points, {} correct picks",
        score.total_points,
        score.possible_points,
        score.correct_picks
    );
    score
}
