//! SQLite database for historical tournament records

use crate::data::store::HistoricalRecordStore;
use crate::{BracketError, HistoricalGame, Result, Round, Seed, Team, TeamId};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

const GAME_COLUMNS: &str = "year, round, team_a_id, team_b_id, seed_a, seed_b, score_a, score_b, winner_id";

/// Database connection and operations
pub struct Database {
    conn: Connection,
}

/// Raw game columns before seed and round validation
struct GameRow {
    year: u16,
    round: u8,
    team_a: i64,
    team_b: i64,
    seed_a: u8,
    seed_b: u8,
    score_a: u16,
    score_b: u16,
    winner: i64,
}

impl GameRow {
    fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(GameRow {
            year: row.get(0)?,
            round: row.get(1)?,
            team_a: row.get(2)?,
            team_b: row.get(3)?,
            seed_a: row.get(4)?,
            seed_b: row.get(5)?,
            score_a: row.get(6)?,
            score_b: row.get(7)?,
            winner: row.get(8)?,
        })
    }

    fn into_game(self) -> Result<HistoricalGame> {
        let round = Round::from_index(self.round)
            .ok_or_else(|| BracketError::Parse(format!("Unknown round index: {}", self.round)))?;
        Ok(HistoricalGame {
            year: self.year,
            round,
            team_a: TeamId(self.team_a),
            team_b: TeamId(self.team_b),
            seed_a: Seed::new(self.seed_a)?,
            seed_b: Seed::new(self.seed_b)?,
            score_a: self.score_a,
            score_b: self.score_b,
            winner: TeamId(self.winner),
        })
    }
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS teams (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                aliases TEXT DEFAULT '[]'
            );

            CREATE TABLE IF NOT EXISTS games (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                year INTEGER NOT NULL,
                round INTEGER NOT NULL,
                team_a_id INTEGER NOT NULL REFERENCES teams(id),
                team_b_id INTEGER NOT NULL REFERENCES teams(id),
                seed_a INTEGER NOT NULL,
                seed_b INTEGER NOT NULL,
                score_a INTEGER NOT NULL,
                score_b INTEGER NOT NULL,
                winner_id INTEGER NOT NULL REFERENCES teams(id),
                UNIQUE(year, round, team_a_id, team_b_id)
            );

            CREATE INDEX IF NOT EXISTS idx_games_year ON games(year);
            CREATE INDEX IF NOT EXISTS idx_games_teams ON games(team_a_id, team_b_id);
            CREATE INDEX IF NOT EXISTS idx_games_seeds ON games(seed_a, seed_b);
            "#,
        )?;
        Ok(())
    }

    // ==================== Team Operations ====================

    /// Get or create a team by name
    pub fn get_or_create_team(&self, name: &str) -> Result<Team> {
        if let Some(team) = self.find_team_by_name(name)? {
            return Ok(team);
        }

        self.conn.execute(
            "INSERT INTO teams (name, aliases) VALUES (?1, '[]')",
            params![name],
        )?;

        let id = TeamId(self.conn.last_insert_rowid());
        Ok(Team::new(id, name))
    }

    fn row_to_team(row: &rusqlite::Row) -> rusqlite::Result<Team> {
        let aliases_json: String = row.get(2)?;
        let aliases: Vec<String> = serde_json::from_str(&aliases_json).unwrap_or_default();
        Ok(Team {
            id: TeamId(row.get(0)?),
            name: row.get(1)?,
            aliases,
        })
    }

    /// Find a team by name or alias
    pub fn find_team_by_name(&self, name: &str) -> Result<Option<Team>> {
        let team = self
            .conn
            .query_row(
                "SELECT id, name, aliases FROM teams WHERE LOWER(name) = ?1",
                params![name.to_lowercase()],
                Self::row_to_team,
            )
            .optional()?;

        if team.is_some() {
            return Ok(team);
        }

        Ok(self.get_all_teams()?.into_iter().find(|t| t.matches_name(name)))
    }

    /// Get team by ID
    pub fn get_team(&self, id: TeamId) -> Result<Team> {
        self.conn
            .query_row(
                "SELECT id, name, aliases FROM teams WHERE id = ?1",
                params![id.0],
                Self::row_to_team,
            )
            .optional()?
            .ok_or_else(|| BracketError::UnknownTeam(id.to_string()))
    }

    /// Get all teams
    pub fn get_all_teams(&self) -> Result<Vec<Team>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, aliases FROM teams ORDER BY name")?;
        let teams = stmt
            .query_map([], Self::row_to_team)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(teams)
    }

    /// Add an alias for a team
    pub fn add_team_alias(&self, team_id: TeamId, alias: &str) -> Result<()> {
        let team = self.get_team(team_id)?;
        let mut aliases = team.aliases;
        if !aliases
            .iter()
            .any(|a| a.to_lowercase() == alias.to_lowercase())
        {
            aliases.push(alias.to_string());
            let aliases_json = serde_json::to_string(&aliases)?;
            self.conn.execute(
                "UPDATE teams SET aliases = ?1 WHERE id = ?2",
                params![aliases_json, team_id.0],
            )?;
        }
        Ok(())
    }

    // ==================== Game Operations ====================

    /// Insert or update a game record
    pub fn upsert_game(&self, game: &HistoricalGame) -> Result<()> {
        upsert_game_on(&self.conn, game)
    }

    /// Insert multiple game records in one transaction
    pub fn upsert_games(&mut self, games: &[HistoricalGame]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        for game in games {
            upsert_game_on(&tx, game)?;
        }
        tx.commit()?;
        log::info!("Stored {} games", games.len());
        Ok(games.len())
    }

    /// Get all games
    pub fn get_all_games(&self) -> Result<Vec<HistoricalGame>> {
        self.query_games("1 = 1", [])
    }

    /// Get the games of a single tournament year
    pub fn get_games_for_year(&self, year: u16) -> Result<Vec<HistoricalGame>> {
        self.query_games("year = ?1", params![year])
    }

    fn query_games<P: rusqlite::Params>(&self, filter: &str, params: P) -> Result<Vec<HistoricalGame>> {
        let sql = format!(
            "SELECT {} FROM games WHERE {} ORDER BY year, round, id",
            GAME_COLUMNS, filter
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params, GameRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        rows.into_iter().map(GameRow::into_game).collect()
    }

    // ==================== Statistics ====================

    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let team_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM teams", [], |row| row.get(0))?;

        let game_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM games", [], |row| row.get(0))?;

        let (earliest_year, latest_year): (Option<u16>, Option<u16>) = self.conn.query_row(
            "SELECT MIN(year), MAX(year) FROM games",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        Ok(DatabaseStats {
            team_count: team_count as usize,
            game_count: game_count as usize,
            earliest_year,
            latest_year,
        })
    }
}

fn upsert_game_on(conn: &Connection, game: &HistoricalGame) -> Result<()> {
    game.validate()?;
    conn.execute(
        r#"
        INSERT INTO games (year, round, team_a_id, team_b_id, seed_a, seed_b,
                           score_a, score_b, winner_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        ON CONFLICT(year, round, team_a_id, team_b_id) DO UPDATE SET
            seed_a = excluded.seed_a,
            seed_b = excluded.seed_b,
            score_a = excluded.score_a,
            score_b = excluded.score_b,
            winner_id = excluded.winner_id
        "#,
        params![
            game.year,
            game.round.index(),
            game.team_a.0,
            game.team_b.0,
            game.seed_a.get(),
            game.seed_b.get(),
            game.score_a,
            game.score_b,
            game.winner.0,
        ],
    )?;
    Ok(())
}

impl HistoricalRecordStore for Database {
    fn teams(&self) -> Result<Vec<Team>> {
        self.get_all_teams()
    }

    fn games_for_team(&self, team: TeamId) -> Result<Vec<HistoricalGame>> {
        self.query_games("team_a_id = ?1 OR team_b_id = ?1", params![team.0])
    }

    fn games_for_seed_pair(&self, seed_a: Seed, seed_b: Seed) -> Result<Vec<HistoricalGame>> {
        self.query_games(
            "(seed_a = ?1 AND seed_b = ?2) OR (seed_a = ?2 AND seed_b = ?1)",
            params![seed_a.get(), seed_b.get()],
        )
    }

    fn games_between(&self, team_a: TeamId, team_b: TeamId) -> Result<Vec<HistoricalGame>> {
        self.query_games(
            "(team_a_id = ?1 AND team_b_id = ?2) OR (team_a_id = ?2 AND team_b_id = ?1)",
            params![team_a.0, team_b.0],
        )
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct DatabaseStats {
    pub team_count: usize,
    pub game_count: usize,
    pub earliest_year: Option<u16>,
    pub latest_year: Option<u16>,
}
