//! CSV import for game, matchup and bracket field files

use crate::simulate::{BracketTeam, Field, PlayIn};
use crate::{BracketError, HistoricalGame, Result, Round, Seed, TeamId};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

/// One row of a historical games file
#[derive(Debug, Clone, Deserialize)]
pub struct GameRow {
    pub year: u16,
    pub round: String,
    pub team_a: String,
    pub team_b: String,
    pub seed_a: u8,
    pub seed_b: u8,
    pub score_a: u16,
    pub score_b: u16,
}

impl GameRow {
    /// Convert to a game, resolving team names to ids
    pub fn into_game<F>(self, mut resolve: F) -> Result<HistoricalGame>
    where
        F: FnMut(&str) -> Result<TeamId>,
    {
        if self.score_a == self.score_b {
            return Err(BracketError::InvalidGame(format!(
                "{} {}: {} vs {} ended level",
                self.year, self.round, self.team_a, self.team_b
            )));
        }
        let round: Round = self.round.parse()?;
        let seed_a = Seed::new(self.seed_a)?;
        let seed_b = Seed::new(self.seed_b)?;
        let team_a = resolve(&self.team_a)?;
        let team_b = resolve(&self.team_b)?;

        let game = HistoricalGame {
            year: self.year,
            round,
            team_a,
            team_b,
            seed_a,
            seed_b,
            score_a: self.score_a,
            score_b: self.score_b,
            winner: if self.score_a > self.score_b { team_a } else { team_b },
        };
        game.validate()?;
        Ok(game)
    }
}

/// One row of a matchups file
#[derive(Debug, Clone, Deserialize)]
pub struct MatchupRow {
    pub team1: String,
    pub team2: String,
    pub seed1: u8,
    pub seed2: u8,
}

/// One row of a bracket field file
#[derive(Debug, Clone, Deserialize)]
pub struct FieldRow {
    pub team: String,
    pub seed: u8,
    pub position: usize,
    #[serde(default)]
    pub play_in: Option<bool>,
}

/// Deserialize every row of a headed CSV source
pub fn read_rows<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for record in rdr.deserialize() {
        rows.push(record?);
    }
    Ok(rows)
}

pub fn read_rows_from_path<T, P>(path: P) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let file = std::fs::File::open(path.as_ref())?;
    let rows = read_rows(file)?;
    log::info!("Read {} rows from {}", rows.len(), path.as_ref().display());
    Ok(rows)
}

/// Build a bracket field; play-in rows sharing a position form one play-in game
pub fn field_from_rows(rows: Vec<FieldRow>) -> Result<Field> {
    let mut entries = Vec::new();
    let mut play_in_slots: BTreeMap<usize, Vec<BracketTeam>> = BTreeMap::new();

    for row in rows {
        let entry = BracketTeam::new(row.team, Seed::new(row.seed)?, row.position);
        if row.play_in.unwrap_or(false) {
            play_in_slots.entry(row.position).or_default().push(entry);
        } else {
            entries.push(entry);
        }
    }

    let mut play_ins = Vec::with_capacity(play_in_slots.len());
    for (position, mut teams) in play_in_slots {
        if teams.len() != 2 {
            return Err(BracketError::MalformedBracket(format!(
                "play-in at position {} has {} teams, expected 2",
                position,
                teams.len()
            )));
        }
        let second = teams.remove(1);
        let first = teams.remove(0);
        play_ins.push(PlayIn::new(first, second)?);
    }

    Field::with_play_ins(entries, play_ins)
}
