//! Round-by-round bracket simulation

use crate::predict::{PredictionResult, Predictor};
use crate::simulate::{BracketTeam, Field};
use crate::{BracketError, Result, Round, Seed, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One simulated game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedGame {
    pub team1: BracketTeam,
    pub team2: BracketTeam,
    pub team1_id: TeamId,
    pub team2_id: TeamId,
    pub prediction: PredictionResult,
}

impl SimulatedGame {
    fn team1_won(&self) -> bool {
        self.prediction.winner.id == self.team1_id
    }

    /// The entry that advances
    pub fn winner(&self) -> &BracketTeam {
        if self.team1_won() {
            &self.team1
        } else {
            &self.team2
        }
    }

    pub fn loser(&self) -> &BracketTeam {
        if self.team1_won() {
            &self.team2
        } else {
            &self.team1
        }
    }

    pub fn is_upset(&self) -> bool {
        self.winner().seed > self.loser().seed
    }
}

/// All games of one round, in bracket order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedRound {
    /// Position in the simulation, starting at 0
    pub index: usize,
    /// `None` for field sizes without a standard round name
    pub round: Option<Round>,
    pub label: String,
    pub teams_remaining: usize,
    pub games: Vec<SimulatedGame>,
}

/// A game won by the numerically worse seed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upset {
    pub round: String,
    pub winner: String,
    pub winner_seed: Seed,
    pub loser: String,
    pub loser_seed: Seed,
}

/// A complete simulated tournament
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub strategy: String,
    pub rounds: Vec<SimulatedRound>,
    pub champion: BracketTeam,
    /// In the order they happened
    pub upsets: Vec<Upset>,
}

impl SimulationResult {
    pub fn game_count(&self) -> usize {
        self.rounds.iter().map(|r| r.games.len()).sum()
    }
}

/// A field entry with the team it resolved to
#[derive(Debug, Clone)]
struct Entrant {
    team: BracketTeam,
    id: TeamId,
}

impl Entrant {
    fn winner_of(game: &SimulatedGame) -> Self {
        Entrant {
            team: game.winner().clone(),
            id: game.prediction.winner.id,
        }
    }
}

/// Drives a predictor through a bracket
pub struct BracketSimulator<'a> {
    predictor: &'a dyn Predictor,
}

impl<'a> BracketSimulator<'a> {
    pub fn new(predictor: &'a dyn Predictor) -> Self {
        BracketSimulator { predictor }
    }

    /// Simulate a field given as (team, seed, position) entries
    pub fn simulate_bracket(&self, initial_field: &[BracketTeam]) -> Result<SimulationResult> {
        let field = Field::new(initial_field.to_vec())?;
        self.simulate(&field)
    }

    /// Simulate a validated field, play-in games first
    ///
    /// Every entry is resolved before the first game, so an unknown team or
    /// two entries naming the same team fail without any prediction made.
    pub fn simulate(&self, field: &Field) -> Result<SimulationResult> {
        let slots = self.resolve_entries(field)?;
        log::info!(
            "Simulating {} team field with {} predictor",
            field.team_count(),
            self.predictor.name()
        );

        let mut rounds = Vec::with_capacity(field.rounds());
        let mut upsets = Vec::new();
        let mut alive = Vec::with_capacity(field.size());

        let mut play_ins = Vec::new();
        for slot in &slots {
            match slot.as_slice() {
                [first, second] => {
                    let game = self.play(first, second)?;
                    alive.push(Entrant::winner_of(&game));
                    play_ins.push(game);
                }
                teams => alive.extend_from_slice(teams),
            }
        }
        if field.has_play_ins() {
            self.close_round(
                &mut rounds,
                &mut upsets,
                Some(Round::FirstFour),
                field.team_count(),
                play_ins,
            );
        }

        while alive.len() > 1 {
            let teams_remaining = alive.len();
            let mut games = Vec::with_capacity(teams_remaining / 2);
            let mut winners = Vec::with_capacity(teams_remaining / 2);
            for pair in alive.chunks(2) {
                let game = self.play(&pair[0], &pair[1])?;
                winners.push(Entrant::winner_of(&game));
                games.push(game);
            }
            self.close_round(
                &mut rounds,
                &mut upsets,
                Round::for_teams_remaining(teams_remaining),
                teams_remaining,
                games,
            );
            alive = winners;
        }

        let champion = alive
            .pop()
            .ok_or_else(|| BracketError::MalformedBracket("field is empty".to_string()))?
            .team;
        log::info!("Champion: {} ({})", champion.team, champion.seed);

        Ok(SimulationResult {
            strategy: self.predictor.name().to_string(),
            rounds,
            champion,
            upsets,
        })
    }

    /// Resolve each slot's entries, rejecting unknown and repeated teams
    fn resolve_entries(&self, field: &Field) -> Result<Vec<Vec<Entrant>>> {
        let mut seen: HashMap<TeamId, &str> = HashMap::with_capacity(field.team_count());
        let mut slots = Vec::with_capacity(field.size());
        for slot in field.slots() {
            let mut entrants = Vec::with_capacity(2);
            for team in slot.teams() {
                let id = self.predictor.resolve(&team.team)?;
                if let Some(other) = seen.insert(id, &team.team) {
                    log::debug!("{} and {} resolve to team {}", other, team.team, id);
                    return Err(BracketError::DuplicateTeam(team.team.clone()));
                }
                entrants.push(Entrant {
                    team: team.clone(),
                    id,
                });
            }
            slots.push(entrants);
        }
        Ok(slots)
    }

    fn play(&self, team1: &Entrant, team2: &Entrant) -> Result<SimulatedGame> {
        let prediction = self.predictor.predict(
            &team1.team.team,
            &team2.team.team,
            team1.team.seed,
            team2.team.seed,
        )?;
        Ok(SimulatedGame {
            team1: team1.team.clone(),
            team2: team2.team.clone(),
            team1_id: team1.id,
            team2_id: team2.id,
            prediction,
        })
    }

    fn close_round(
        &self,
        rounds: &mut Vec<SimulatedRound>,
        upsets: &mut Vec<Upset>,
        round: Option<Round>,
        teams_remaining: usize,
        games: Vec<SimulatedGame>,
    ) {
        let label = match round {
            Some(round) => round.label().to_string(),
            None => format!("Round of {}", teams_remaining),
        };

        let before = upsets.len();
        upsets.extend(games.iter().filter(|g| g.is_upset()).map(|g| Upset {
            round: label.clone(),
            winner: g.winner().team.clone(),
            winner_seed: g.winner().seed,
            loser: g.loser().team.clone(),
            loser_seed: g.loser().seed,
        }));
        log::info!(
            "{}: {} games, {} upsets",
            label,
            games.len(),
            upsets.len() - before
        );

        rounds.push(SimulatedRound {
            index: rounds.len(),
            round,
            label,
            teams_remaining,
            games,
        });
    }
}
