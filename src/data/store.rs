//! Read interface over historical tournament records

use crate::{BracketError, HistoricalGame, Result, Round, Seed, Team, TeamId};

/// Read-only access to historical tournament games
///
/// Analysis sessions only ever read through this trait; implementations are
/// expected to return games ordered by year, then round.
pub trait HistoricalRecordStore {
    /// All known teams, including teams without any games
    fn teams(&self) -> Result<Vec<Team>>;

    /// Games in which the team played on either side
    fn games_for_team(&self, team: TeamId) -> Result<Vec<HistoricalGame>>;

    /// Games between the two seeds, in either orientation
    fn games_for_seed_pair(&self, seed_a: Seed, seed_b: Seed) -> Result<Vec<HistoricalGame>>;

    /// Direct meetings between two teams
    fn games_between(&self, team_a: TeamId, team_b: TeamId) -> Result<Vec<HistoricalGame>>;
}

/// One side of a game when recording by team name: (name, seed, score)
pub type GameSide<'a> = (&'a str, u8, u16);

/// In-memory record store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    teams: Vec<Team>,
    games: Vec<HistoricalGame>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create a team by name
    pub fn add_team(&mut self, name: &str) -> TeamId {
        if let Some(id) = self.team_id(name) {
            return id;
        }
        let id = TeamId(self.teams.len() as i64 + 1);
        self.teams.push(Team::new(id, name));
        id
    }

    pub fn team_id(&self, name: &str) -> Option<TeamId> {
        self.teams
            .iter()
            .find(|t| t.matches_name(name))
            .map(|t| t.id)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// Add a validated game between known teams
    pub fn add_game(&mut self, game: HistoricalGame) -> Result<()> {
        game.validate()?;
        for id in [game.team_a, game.team_b] {
            if self.team(id).is_none() {
                return Err(BracketError::InvalidGame(format!("{} is not registered", id)));
            }
        }
        self.games.push(game);
        Ok(())
    }

    /// Record a game by team names; the higher score wins
    pub fn record(&mut self, year: u16, round: Round, a: GameSide, b: GameSide) -> Result<()> {
        let (name_a, seed_a, score_a) = a;
        let (name_b, seed_b, score_b) = b;
        if score_a == score_b {
            return Err(BracketError::InvalidGame(format!(
                "{} {}: {} vs {} ended level",
                year, round, name_a, name_b
            )));
        }
        let seed_a = Seed::new(seed_a)?;
        let seed_b = Seed::new(seed_b)?;
        let team_a = self.add_team(name_a);
        let team_b = self.add_team(name_b);
        self.add_game(HistoricalGame {
            year,
            round,
            team_a,
            team_b,
            seed_a,
            seed_b,
            score_a,
            score_b,
            winner: if score_a > score_b { team_a } else { team_b },
        })
    }

    pub fn games(&self) -> &[HistoricalGame] {
        &self.games
    }

    fn select(&self, predicate: impl Fn(&HistoricalGame) -> bool) -> Vec<HistoricalGame> {
        let mut games: Vec<HistoricalGame> =
            self.games.iter().filter(|g| predicate(g)).cloned().collect();
        games.sort_by_key(|g| (g.year, g.round));
        games
    }
}

impl HistoricalRecordStore for MemoryStore {
    fn teams(&self) -> Result<Vec<Team>> {
        Ok(self.teams.clone())
    }

    fn games_for_team(&self, team: TeamId) -> Result<Vec<HistoricalGame>> {
        Ok(self.select(|g| g.involves(team)))
    }

    fn games_for_seed_pair(&self, seed_a: Seed, seed_b: Seed) -> Result<Vec<HistoricalGame>> {
        Ok(self.select(|g| {
            (g.seed_a == seed_a && g.seed_b == seed_b) || (g.seed_a == seed_b && g.seed_b == seed_a)
        }))
    }

    fn games_between(&self, team_a: TeamId, team_b: TeamId) -> Result<Vec<HistoricalGame>> {
        Ok(self.select(|g| g.involves(team_a) && g.involves(team_b)))
    }
}
