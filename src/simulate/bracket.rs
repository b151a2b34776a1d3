//! Bracket fields

use crate::{BracketError, Result, Seed};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A team entered in the field at a bracket position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketTeam {
    pub team: String,
    pub seed: Seed,
    pub position: usize,
}

impl BracketTeam {
    pub fn new(team: impl Into<String>, seed: Seed, position: usize) -> Self {
        BracketTeam {
            team: team.into(),
            seed,
            position,
        }
    }
}

/// Two teams competing for one bracket slot before the main rounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayIn {
    pub first: BracketTeam,
    pub second: BracketTeam,
}

impl PlayIn {
    pub fn new(first: BracketTeam, second: BracketTeam) -> Result<Self> {
        if first.position != second.position {
            return Err(BracketError::MalformedBracket(format!(
                "play-in teams {} and {} are at different positions ({} and {})",
                first.team, second.team, first.position, second.position
            )));
        }
        Ok(PlayIn { first, second })
    }

    pub fn position(&self) -> usize {
        self.first.position
    }
}

/// One position of the first main round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Slot {
    Team(BracketTeam),
    PlayIn(PlayIn),
}

impl Slot {
    pub fn position(&self) -> usize {
        match self {
            Slot::Team(team) => team.position,
            Slot::PlayIn(play_in) => play_in.position(),
        }
    }

    /// The one entry, or both sides of a play-in
    pub fn teams(&self) -> Vec<&BracketTeam> {
        match self {
            Slot::Team(team) => vec![team],
            Slot::PlayIn(play_in) => vec![&play_in.first, &play_in.second],
        }
    }
}

/// A validated field, ordered by bracket position
///
/// Positions run from 0 without gaps, team names are unique and the slot
/// count is a power of two of at least 2. Adjacent slots meet in the first
/// main round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    slots: Vec<Slot>,
}

impl Field {
    pub fn new(entries: Vec<BracketTeam>) -> Result<Self> {
        Self::with_play_ins(entries, Vec::new())
    }

    pub fn with_play_ins(entries: Vec<BracketTeam>, play_ins: Vec<PlayIn>) -> Result<Self> {
        let mut slots: Vec<Slot> = entries
            .into_iter()
            .map(Slot::Team)
            .chain(play_ins.into_iter().map(Slot::PlayIn))
            .collect();
        slots.sort_by_key(Slot::position);

        for pair in slots.windows(2) {
            if pair[0].position() == pair[1].position() {
                return Err(BracketError::DuplicatePosition(pair[0].position()));
            }
        }

        let mut names = HashSet::new();
        for team in slots.iter().flat_map(Slot::teams) {
            if !names.insert(team.team.to_lowercase()) {
                return Err(BracketError::DuplicateTeam(team.team.clone()));
            }
        }

        if slots.len() < 2 || !slots.len().is_power_of_two() {
            return Err(BracketError::MalformedBracket(format!(
                "{} slots cannot be paired down to a single champion",
                slots.len()
            )));
        }

        if let Some((expected, slot)) = slots
            .iter()
            .enumerate()
            .find(|(i, slot)| slot.position() != *i)
        {
            return Err(BracketError::MalformedBracket(format!(
                "no team at position {} (next entry is at {})",
                expected,
                slot.position()
            )));
        }

        Ok(Field { slots })
    }

    /// Slots in the first main round
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Teams entered, including both sides of each play-in
    pub fn team_count(&self) -> usize {
        self.slots.iter().map(|s| s.teams().len()).sum()
    }

    pub fn has_play_ins(&self) -> bool {
        self.slots.iter().any(|s| matches!(s, Slot::PlayIn(_)))
    }

    /// Rounds needed to crown a champion, counting the play-in round
    pub fn rounds(&self) -> usize {
        self.size().trailing_zeros() as usize + usize::from(self.has_play_ins())
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, seed: u8, position: usize) -> BracketTeam {
        BracketTeam::new(name, Seed::new(seed).unwrap(), position)
    }

    #[test]
    fn test_field_orders_by_position() {
        let field = Field::new(vec![
            entry("Iowa State", 2, 3),
            entry("Houston", 1, 0),
            entry("Longwood", 16, 1),
            entry("Utah State", 8, 2),
        ])
        .unwrap();
        let positions: Vec<usize> = field.slots().iter().map(Slot::position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert_eq!(field.slots()[3].teams()[0].team, "Iowa State");
        assert_eq!(field.rounds(), 2);
        assert!(!field.has_play_ins());
    }

    #[test]
    fn test_field_positions_must_be_contiguous() {
        let gapped = Field::new(vec![
            entry("P0", 1, 0),
            entry("P5", 16, 5),
            entry("P6", 8, 6),
            entry("P7", 9, 7),
        ]);
        assert!(matches!(gapped, Err(BracketError::MalformedBracket(msg)) if msg.contains("position 1")));

        let shifted = Field::new(vec![entry("A", 1, 1), entry("B", 16, 2)]);
        assert!(matches!(shifted, Err(BracketError::MalformedBracket(_))));

        let play_in = PlayIn::new(entry("Wagner", 16, 3), entry("Howard", 16, 3)).unwrap();
        assert!(matches!(
            Field::with_play_ins(vec![entry("UConn", 1, 0)], vec![play_in]),
            Err(BracketError::MalformedBracket(_))
        ));
    }

    #[test]
    fn test_field_size_must_pair_down() {
        assert!(matches!(Field::new(Vec::new()), Err(BracketError::MalformedBracket(_))));
        assert!(matches!(
            Field::new(vec![entry("A", 1, 0)]),
            Err(BracketError::MalformedBracket(_))
        ));
        assert!(matches!(
            Field::new(vec![entry("A", 1, 0), entry("B", 2, 1), entry("C", 3, 2)]),
            Err(BracketError::MalformedBracket(_))
        ));
        let six = (0..6).map(|i| entry(&format!("T{}", i), 1, i)).collect();
        assert!(matches!(Field::new(six), Err(BracketError::MalformedBracket(_))));
    }

    #[test]
    fn test_field_duplicates() {
        assert!(matches!(
            Field::new(vec![entry("A", 1, 3), entry("B", 16, 3)]),
            Err(BracketError::DuplicatePosition(3))
        ));
        assert!(matches!(
            Field::new(vec![entry("Duke", 1, 0), entry("duke", 16, 1)]),
            Err(BracketError::DuplicateTeam(_))
        ));
    }

    #[test]
    fn test_play_in_slots() {
        let play_in = PlayIn::new(entry("Wagner", 16, 1), entry("Howard", 16, 1)).unwrap();
        let field = Field::with_play_ins(vec![entry("UConn", 1, 0)], vec![play_in]).unwrap();
        assert_eq!(field.size(), 2);
        assert_eq!(field.team_count(), 3);
        assert_eq!(field.rounds(), 2);

        assert!(PlayIn::new(entry("Wagner", 16, 1), entry("Howard", 16, 2)).is_err());
        let clash = PlayIn::new(entry("UConn", 16, 1), entry("Howard", 16, 1)).unwrap();
        assert!(matches!(
            Field::with_play_ins(vec![entry("UConn", 1, 0)], vec![clash]),
            Err(BracketError::DuplicateTeam(_))
        ));
    }
}
