//! Historical analysis read models
//!
//! Team aggregates, the seed matchup table and head-to-head records, built
//! once from a record store and shared immutably by predictors.

pub mod head_to_head;
pub mod seed_table;
pub mod session;
pub mod team_stats;

pub use head_to_head::{HeadToHead, HeadToHeadIndex};
pub use seed_table::{upset_prior, SeedMatchupStats, SeedMatchupTable};
pub use session::{AnalysisSession, MatchupAnalysis};
pub use team_stats::{TeamStatsAggregator, TeamTournamentStats};

/// Point margin treated as decisive
pub(crate) const MARGIN_SCALE: f64 = 20.0;
