//! Bracket simulation
//!
//! Deterministic single-elimination traversal of a seeded field, and scoring
//! of a simulated bracket against actual results.

pub mod bracket;
pub mod scoring;
pub mod simulator;

pub use bracket::{BracketTeam, Field, PlayIn, Slot};
pub use scoring::{score_bracket, BracketScore, RoundScore};
pub use simulator::{BracketSimulator, SimulatedGame, SimulatedRound, SimulationResult, Upset};
