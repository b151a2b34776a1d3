//! Deterministic historical records shared by tests

use crate::data::MemoryStore;
use crate::simulate::BracketTeam;
use crate::{Round, Seed};

pub const REGIONS: [&str; 4] = ["East", "West", "South", "Midwest"];
pub const FIRST_YEAR: u16 = 2010;
pub const LAST_YEAR: u16 = 2024;

/// Seeds in bracket order within a region
pub const REGION_SEED_ORDER: [u8; 16] = [1, 16, 8, 9, 5, 12, 4, 13, 6, 11, 3, 14, 7, 10, 2, 15];

pub fn team_name(year: u16, region: usize, seed: u8) -> String {
    match (region, seed) {
        (1, 1) => "Gonzaga".to_string(),
        (0, 16) if year == 2021 || year == 2023 => "Norfolk State".to_string(),
        _ => format!("{} {}", REGIONS[region], seed),
    }
}

fn is_upset(year: u16, region: usize, favorite: u8) -> bool {
    let k = year as usize + region;
    match favorite {
        1 => year == 2018 && region == 2,
        8 => k % 2 == 0,
        5 => k % 3 == 0,
        4 => k % 5 == 0,
        6 => k % 3 == 1,
        3 => k % 7 == 0,
        7 => k % 3 == 2,
        2 => k % 10 == 0,
        _ => false,
    }
}

/// Fifteen years of first-round games across four regions, plus a 2024 run by Gonzaga
pub fn historical_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    for year in FIRST_YEAR..=LAST_YEAR {
        for region in 0..REGIONS.len() {
            for pair in REGION_SEED_ORDER.chunks(2) {
                let (favorite, underdog) = (pair[0], pair[1]);
                let diff = (underdog - favorite) as u16;
                let (fav_score, dog_score) = if is_upset(year, region, favorite) {
                    (64, 68)
                } else {
                    (70 + diff, 70 - diff / 2)
                };
                store
                    .record(
                        year,
                        Round::RoundOf64,
                        (&team_name(year, region, favorite), favorite, fav_score),
                        (&team_name(year, region, underdog), underdog, dog_score),
                    )
                    .unwrap();
            }
        }
    }
    store
        .record(LAST_YEAR, Round::RoundOf32, ("Gonzaga", 1, 78), ("West 8", 8, 70))
        .unwrap();
    store
        .record(LAST_YEAR, Round::Sweet16, ("Gonzaga", 1, 75), ("West 4", 4, 70))
        .unwrap();
    store
}

/// The 64-team field for the latest fixture year, positions 0..64
pub fn field_2024() -> Vec<BracketTeam> {
    let mut field = Vec::with_capacity(64);
    for region in 0..REGIONS.len() {
        for &seed in REGION_SEED_ORDER.iter() {
            field.push(BracketTeam::new(
                team_name(LAST_YEAR, region, seed),
                Seed::new(seed).unwrap(),
                field.len(),
            ));
        }
    }
    field
}
