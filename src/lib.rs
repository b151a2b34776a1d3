//! Tournament bracket prediction from historical results
//!
//! A weighted multi-factor matchup model and a deterministic single-elimination
//! bracket simulator, both driven by read-only historical tournament records.

pub mod analysis;
pub mod data;
pub mod predict;
pub mod report;
pub mod simulate;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unique identifier for a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub i64);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Team({})", self.0)
    }
}

/// A tournament team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub name: String,
    pub aliases: Vec<String>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Team {
            id,
            name: name.into(),
            aliases: Vec::new(),
        }
    }

    pub fn matches_name(&self, name: &str) -> bool {
        let name_lower = name.to_lowercase();
        self.name.to_lowercase() == name_lower
            || self.aliases.iter().any(|a| a.to_lowercase() == name_lower)
    }
}

/// Tournament seed, 1 (best) through 16
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Seed(u8);

impl Seed {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 16;

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Seed(value))
        } else {
            Err(BracketError::InvalidSeed(value))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Every seed in ranking order
    pub fn all() -> impl Iterator<Item = Seed> {
        (Self::MIN..=Self::MAX).map(Seed)
    }
}

impl TryFrom<u8> for Seed {
    type Error = BracketError;

    fn try_from(value: u8) -> Result<Self> {
        Seed::new(value)
    }
}

impl From<Seed> for u8 {
    fn from(seed: Seed) -> u8 {
        seed.0
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Tournament round, ordered from the play-in games to the final
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Round {
    FirstFour,
    RoundOf64,
    RoundOf32,
    Sweet16,
    EliteEight,
    FinalFour,
    Championship,
}

impl Round {
    pub const ALL: [Round; 7] = [
        Round::FirstFour,
        Round::RoundOf64,
        Round::RoundOf32,
        Round::Sweet16,
        Round::EliteEight,
        Round::FinalFour,
        Round::Championship,
    ];

    pub fn index(&self) -> u8 {
        match self {
            Round::FirstFour => 0,
            Round::RoundOf64 => 1,
            Round::RoundOf32 => 2,
            Round::Sweet16 => 3,
            Round::EliteEight => 4,
            Round::FinalFour => 5,
            Round::Championship => 6,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Round::FirstFour => "First Four",
            Round::RoundOf64 => "Round of 64",
            Round::RoundOf32 => "Round of 32",
            Round::Sweet16 => "Sweet 16",
            Round::EliteEight => "Elite Eight",
            Round::FinalFour => "Final Four",
            Round::Championship => "Championship",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Round::FirstFour => "FF",
            Round::RoundOf64 => "R64",
            Round::RoundOf32 => "R32",
            Round::Sweet16 => "S16",
            Round::EliteEight => "E8",
            Round::FinalFour => "F4",
            Round::Championship => "NC",
        }
    }

    /// Bracket points for a correct pick in this round (play-in games don't count)
    pub fn points(&self) -> u32 {
        match self {
            Round::FirstFour => 0,
            Round::RoundOf64 => 1,
            Round::RoundOf32 => 2,
            Round::Sweet16 => 4,
            Round::EliteEight => 8,
            Round::FinalFour => 16,
            Round::Championship => 32,
        }
    }

    /// Sweet 16 or later
    pub fn is_deep_run(&self) -> bool {
        *self >= Round::Sweet16
    }

    /// Main-bracket round played with `teams` still alive
    pub fn for_teams_remaining(teams: usize) -> Option<Self> {
        match teams {
            64 => Some(Round::RoundOf64),
            32 => Some(Round::RoundOf32),
            16 => Some(Round::Sweet16),
            8 => Some(Round::EliteEight),
            4 => Some(Round::FinalFour),
            2 => Some(Round::Championship),
            _ => None,
        }
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Round {
    type Err = BracketError;

    /// Accepts a round index, short code or label
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if let Ok(index) = trimmed.parse::<u8>() {
            return Round::from_index(index)
                .ok_or_else(|| BracketError::Parse(format!("Unknown round index: {}", index)));
        }
        Round::ALL
            .iter()
            .copied()
            .find(|r| {
                r.code().eq_ignore_ascii_case(trimmed) || r.label().eq_ignore_ascii_case(trimmed)
            })
            .ok_or_else(|| BracketError::Parse(format!("Unknown round: {}", s)))
    }
}

/// A single historical tournament game
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoricalGame {
    pub year: u16,
    pub round: Round,
    pub team_a: TeamId,
    pub team_b: TeamId,
    pub seed_a: Seed,
    pub seed_b: Seed,
    pub score_a: u16,
    pub score_b: u16,
    pub winner: TeamId,
}

impl HistoricalGame {
    /// Check the record is internally consistent
    pub fn validate(&self) -> Result<()> {
        if self.team_a == self.team_b {
            return Err(BracketError::InvalidGame(format!(
                "{} {}: {} listed on both sides",
                self.year, self.round, self.team_a
            )));
        }
        if !self.involves(self.winner) {
            return Err(BracketError::InvalidGame(format!(
                "{} {}: winner {} did not play",
                self.year, self.round, self.winner
            )));
        }
        let (winner_score, loser_score) = if self.winner == self.team_a {
            (self.score_a, self.score_b)
        } else {
            (self.score_b, self.score_a)
        };
        if winner_score < loser_score {
            return Err(BracketError::InvalidGame(format!(
                "{} {}: winner {} scored {} against {}",
                self.year, self.round, self.winner, winner_score, loser_score
            )));
        }
        Ok(())
    }

    pub fn involves(&self, team: TeamId) -> bool {
        self.team_a == team || self.team_b == team
    }

    /// Check if the given team won this game
    pub fn did_win(&self, team: TeamId) -> Option<bool> {
        self.involves(team).then_some(self.winner == team)
    }

    /// Get the opponent for a given team
    pub fn opponent(&self, team: TeamId) -> Option<TeamId> {
        if team == self.team_a {
            Some(self.team_b)
        } else if team == self.team_b {
            Some(self.team_a)
        } else {
            None
        }
    }

    pub fn loser(&self) -> TeamId {
        if self.winner == self.team_a {
            self.team_b
        } else {
            self.team_a
        }
    }

    /// Get score for a specific team
    pub fn score_for(&self, team: TeamId) -> Option<u16> {
        if team == self.team_a {
            Some(self.score_a)
        } else if team == self.team_b {
            Some(self.score_b)
        } else {
            None
        }
    }

    /// Get score against a specific team
    pub fn score_against(&self, team: TeamId) -> Option<u16> {
        self.opponent(team).and_then(|opp| self.score_for(opp))
    }

    /// Get the seed a team held in this game
    pub fn seed_for(&self, team: TeamId) -> Option<Seed> {
        if team == self.team_a {
            Some(self.seed_a)
        } else if team == self.team_b {
            Some(self.seed_b)
        } else {
            None
        }
    }

    pub fn winner_seed(&self) -> Seed {
        if self.winner == self.team_a {
            self.seed_a
        } else {
            self.seed_b
        }
    }

    pub fn loser_seed(&self) -> Seed {
        if self.winner == self.team_a {
            self.seed_b
        } else {
            self.seed_a
        }
    }

    /// Winning score minus losing score
    pub fn margin(&self) -> u16 {
        let (winner_score, loser_score) = if self.winner == self.team_a {
            (self.score_a, self.score_b)
        } else {
            (self.score_b, self.score_a)
        };
        winner_score.saturating_sub(loser_score)
    }

    /// Won by the numerically worse seed
    pub fn is_upset(&self) -> bool {
        self.winner_seed() > self.loser_seed()
    }
}

/// Application-wide errors
#[derive(Debug, Error)]
pub enum BracketError {
    #[error("Unknown team: {0}")]
    UnknownTeam(String),

    #[error("A team cannot play itself: {0}")]
    SameTeam(String),

    #[error("Invalid seed {0}: seeds must be between 1 and 16")]
    InvalidSeed(u8),

    #[error("Invalid seed pair {higher} vs {lower}: higher seed must be numerically lower")]
    InvalidSeedPair { higher: u8, lower: u8 },

    #[error("Malformed bracket: {0}")]
    MalformedBracket(String),

    #[error("Malformed bracket: position {0} is used more than once")]
    DuplicatePosition(usize),

    #[error("Malformed bracket: {0} appears more than once")]
    DuplicateTeam(String),

    #[error("Invalid game record: {0}")]
    InvalidGame(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type Result<T> = std::result::Result<T, BracketError>;

/// Application configuration loaded from bracket.toml
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub data: DataConfig,
}

/// Tunable model parameters (the factor weights are fixed)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Per-year decay applied to older head-to-head meetings
    pub head_to_head_decay: f64,
    /// Appearances needed for the full experience share
    pub experience_full_appearances: u32,
    /// Years after which a deep run no longer counts as recent
    pub deep_run_horizon_years: u16,
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig {
            head_to_head_decay: 0.8,
            experience_full_appearances: 10,
            deep_run_horizon_years: 10,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.head_to_head_decay > 0.0 && self.head_to_head_decay <= 1.0) {
            return Err(BracketError::Config(format!(
                "head_to_head_decay must be in (0, 1], got {}",
                self.head_to_head_decay
            )));
        }
        if self.experience_full_appearances == 0 {
            return Err(BracketError::Config(
                "experience_full_appearances must be at least 1".to_string(),
            ));
        }
        if self.deep_run_horizon_years == 0 {
            return Err(BracketError::Config(
                "deep_run_horizon_years must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    pub database_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            database_path: "data/bracket.db".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            BracketError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| BracketError::Config(format!("Failed to parse config: {}", e)))?;
        config.model.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BracketError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(winner: TeamId, score_a: u16, score_b: u16) -> HistoricalGame {
        HistoricalGame {
            year: 2024,
            round: Round::RoundOf64,
            team_a: TeamId(1),
            team_b: TeamId(2),
            seed_a: Seed::new(5).unwrap(),
            seed_b: Seed::new(12).unwrap(),
            score_a,
            score_b,
            winner,
        }
    }

    #[test]
    fn test_seed_bounds() {
        assert!(Seed::new(0).is_err());
        assert!(Seed::new(17).is_err());
        assert_eq!(Seed::new(1).unwrap().get(), 1);
        assert_eq!(Seed::all().count(), 16);
        assert!(matches!(
            Seed::try_from(20u8),
            Err(BracketError::InvalidSeed(20))
        ));
    }

    #[test]
    fn test_seed_deserialize_rejects_out_of_range() {
        let ok: Seed = serde_json::from_str("12").unwrap();
        assert_eq!(ok.get(), 12);
        assert!(serde_json::from_str::<Seed>("0").is_err());
    }

    #[test]
    fn test_round_parsing() {
        assert_eq!("R64".parse::<Round>().unwrap(), Round::RoundOf64);
        assert_eq!("sweet 16".parse::<Round>().unwrap(), Round::Sweet16);
        assert_eq!("6".parse::<Round>().unwrap(), Round::Championship);
        assert!("7".parse::<Round>().is_err());
        assert!("Play-in".parse::<Round>().is_err());
    }

    #[test]
    fn test_round_points_double() {
        let points: Vec<u32> = Round::ALL.iter().map(|r| r.points()).collect();
        assert_eq!(points, vec![0, 1, 2, 4, 8, 16, 32]);
        assert!(Round::Sweet16.is_deep_run());
        assert!(!Round::RoundOf32.is_deep_run());
        assert_eq!(Round::for_teams_remaining(16), Some(Round::Sweet16));
        assert_eq!(Round::for_teams_remaining(128), None);
    }

    #[test]
    fn test_game_accessors() {
        let upset = game(TeamId(2), 64, 70);
        assert!(upset.is_upset());
        assert_eq!(upset.margin(), 6);
        assert_eq!(upset.loser(), TeamId(1));
        assert_eq!(upset.did_win(TeamId(1)), Some(false));
        assert_eq!(upset.did_win(TeamId(3)), None);
        assert_eq!(upset.score_against(TeamId(2)), Some(64));
        assert_eq!(upset.seed_for(TeamId(2)).map(Seed::get), Some(12));
        assert!(upset.validate().is_ok());
    }

    #[test]
    fn test_game_validation() {
        assert!(game(TeamId(3), 70, 60).validate().is_err());
        assert!(game(TeamId(1), 60, 70).validate().is_err());

        let mut self_game = game(TeamId(1), 70, 60);
        self_game.team_b = TeamId(1);
        assert!(self_game.validate().is_err());
    }

    #[test]
    fn test_config_round_trip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_model_config_validation() {
        let mut model = ModelConfig::default();
        assert!(model.validate().is_ok());
        model.head_to_head_decay = 0.0;
        assert!(model.validate().is_err());
        model.head_to_head_decay = 1.0;
        model.experience_full_appearances = 0;
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_config_load_missing_file() {
        let err = Config::load("/nonexistent/bracket.toml").unwrap_err();
        assert!(matches!(err, BracketError::Config(_)));
    }
}
