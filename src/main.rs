//! Tournament bracket prediction CLI
//!
//! Matchup predictions and full bracket simulations from historical results.

use bracket::predict::Strategy;
use bracket::{Config, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bracket")]
#[command(about = "Tournament bracket prediction from historical results", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "bracket.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Write JSON results to this file instead of printing
    #[arg(short, long, global = true)]
    output: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Predict the winner of a matchup
    Predict {
        team1: String,
        team2: String,
        /// First team's seed (1-16)
        seed1: u8,
        /// Second team's seed (1-16)
        seed2: u8,
        #[arg(long, default_value = "historical")]
        strategy: Strategy,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Predict every matchup in a CSV file (team1,team2,seed1,seed2)
    Batch {
        /// Input CSV file with matchups
        input: String,
        /// Output JSON file for results
        results: String,
        #[arg(long, default_value = "historical")]
        strategy: Strategy,
    },
    /// Simulate a full bracket from a field CSV (team,seed,position[,play_in])
    Simulate {
        field: String,
        #[arg(long, default_value = "historical")]
        strategy: Strategy,
        /// Score the simulated bracket against this year's stored results
        #[arg(long)]
        score_year: Option<u16>,
        #[arg(long, default_value = "table")]
        format: ReportFormat,
    },
    /// Upset probability for a seed pair
    Upset {
        /// Better seed (lower number)
        higher_seed: u8,
        /// Worse seed (higher number)
        lower_seed: u8,
    },
    /// Tournament statistics for a team
    Stats {
        team: String,
        #[arg(long, default_value = "table")]
        format: ReportFormat,
    },
    /// Head-to-head and seed history for a matchup
    Matchup {
        team1: String,
        team2: String,
        seed1: u8,
        seed2: u8,
        #[arg(long, default_value = "table")]
        format: ReportFormat,
    },
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import historical games from CSV
    /// (year,round,team_a,team_b,seed_a,seed_b,score_a,score_b)
    Import {
        file: String,
    },
    /// Add an alternate name for a stored team
    Alias {
        team: String,
        alias: String,
    },
    /// Show database status
    Status,
}

#[derive(Clone, Copy, Debug)]
enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use table, json, or csv.", s)),
        }
    }
}

/// Output format for reports that have no CSV form
#[derive(Clone, Copy, Debug)]
enum ReportFormat {
    Table,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(ReportFormat::Table),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let output = cli.output.as_deref();
    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Data { action } => match action {
            DataCommands::Import { file } => commands::data_import(&config, &file),
            DataCommands::Alias { team, alias } => commands::data_alias(&config, &team, &alias),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Predict {
            team1,
            team2,
            seed1,
            seed2,
            strategy,
            format,
        } => commands::predict(&config, output, &team1, &team2, seed1, seed2, strategy, format),
        Commands::Batch {
            input,
            results,
            strategy,
        } => commands::batch(&config, &input, &results, strategy),
        Commands::Simulate {
            field,
            strategy,
            score_year,
            format,
        } => commands::simulate(&config, output, &field, strategy, score_year, format),
        Commands::Upset {
            higher_seed,
            lower_seed,
        } => commands::upset(&config, output, higher_seed, lower_seed),
        Commands::Stats { team, format } => commands::stats(&config, output, &team, format),
        Commands::Matchup {
            team1,
            team2,
            seed1,
            seed2,
            format,
        } => commands::matchup(&config, output, &team1, &team2, seed1, seed2, format),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use bracket::analysis::AnalysisSession;
    use bracket::data::import::{self, FieldRow, GameRow, MatchupRow};
    use bracket::data::Database;
    use bracket::predict::Predictor;
    use bracket::report;
    use bracket::simulate::{score_bracket, BracketSimulator};
    use bracket::{BracketError, Seed};
    use serde::Serialize;

    fn open_session(config: &Config) -> Result<AnalysisSession> {
        let db = Database::open(&config.data.database_path)?;
        AnalysisSession::build(&db, config.model.clone())
    }

    fn to_json<T: Serialize>(value: &T) -> Result<String> {
        Ok(serde_json::to_string_pretty(value)?)
    }

    /// Write JSON to the output file when one is given, otherwise print
    fn emit<T: Serialize>(
        output: Option<&str>,
        format: ReportFormat,
        value: &T,
        table: impl FnOnce() -> String,
    ) -> Result<()> {
        if let Some(path) = output {
            std::fs::write(path, to_json(value)?)?;
            println!("Wrote results to {}", path);
            return Ok(());
        }
        match format {
            ReportFormat::Table => print!("{}", table()),
            ReportFormat::Json => println!("{}", to_json(value)?),
        }
        Ok(())
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        println!("Created data/ directory");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'bracket data import games.csv' to load historical games");
        println!("  3. Run 'bracket predict \"Team A\" \"Team B\" 1 16' to make predictions");
        println!("  4. Run 'bracket simulate field.csv' to fill out a bracket");

        Ok(())
    }

    pub fn data_import(config: &Config, file: &str) -> Result<()> {
        let mut db = Database::open(&config.data.database_path)?;
        let rows: Vec<GameRow> = import::read_rows_from_path(file)?;
        println!("Read {} games from {}", rows.len(), file);

        let games = rows
            .into_iter()
            .map(|row| row.into_game(|name| Ok(db.get_or_create_team(name)?.id)))
            .collect::<Result<Vec<_>>>()?;

        let count = db.upsert_games(&games)?;
        println!("Stored {} games in database", count);
        Ok(())
    }

    pub fn data_alias(config: &Config, team: &str, alias: &str) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stored = db
            .find_team_by_name(team)?
            .ok_or_else(|| BracketError::UnknownTeam(team.to_string()))?;
        if let Some(other) = db.find_team_by_name(alias)? {
            if other.id != stored.id {
                return Err(BracketError::Config(format!(
                    "{} already names {}",
                    alias, other.name
                )));
            }
        }
        db.add_team_alias(stored.id, alias)?;
        println!("{} is now also known as {}", stored.name, alias);
        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.database_path);
        println!("  Teams:    {}", stats.team_count);
        println!("  Games:    {}", stats.game_count);
        if let (Some(earliest), Some(latest)) = (stats.earliest_year, stats.latest_year) {
            println!("  Years:    {} to {}", earliest, latest);
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub fn predict(
        config: &Config,
        output: Option<&str>,
        team1: &str,
        team2: &str,
        seed1: u8,
        seed2: u8,
        strategy: Strategy,
        format: OutputFormat,
    ) -> Result<()> {
        let session = open_session(config)?;
        let predictor = strategy.predictor(&session);
        let prediction = predictor.predict(team1, team2, Seed::new(seed1)?, Seed::new(seed2)?)?;

        if let (None, OutputFormat::Csv) = (output, format) {
            println!("winner,winner_seed,loser,loser_seed,confidence,strategy");
            println!(
                "{},{},{},{},{:.4},{}",
                prediction.winner.name,
                prediction.winner_seed,
                prediction.loser.name,
                prediction.loser_seed,
                prediction.confidence,
                prediction.strategy
            );
            return Ok(());
        }
        let format = match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Table | OutputFormat::Csv => ReportFormat::Table,
        };
        emit(output, format, &prediction, || report::format_prediction(&prediction))
    }

    pub fn batch(config: &Config, input: &str, results: &str, strategy: Strategy) -> Result<()> {
        let session = open_session(config)?;
        let predictor = strategy.predictor(&session);
        let rows: Vec<MatchupRow> = import::read_rows_from_path(input)?;

        let mut predictions = Vec::with_capacity(rows.len());
        for row in &rows {
            predictions.push(predictor.predict(
                &row.team1,
                &row.team2,
                Seed::new(row.seed1)?,
                Seed::new(row.seed2)?,
            )?);
        }

        std::fs::write(results, to_json(&predictions)?)?;
        let upsets = predictions.iter().filter(|p| p.is_upset()).count();
        println!(
            "Predicted {} matchups ({} upsets) to {}",
            predictions.len(),
            upsets,
            results
        );
        Ok(())
    }

    pub fn simulate(
        config: &Config,
        output: Option<&str>,
        field_path: &str,
        strategy: Strategy,
        score_year: Option<u16>,
        format: ReportFormat,
    ) -> Result<()> {
        let rows: Vec<FieldRow> = import::read_rows_from_path(field_path)?;
        let field = import::field_from_rows(rows)?;

        let db = Database::open(&config.data.database_path)?;
        let session = AnalysisSession::build(&db, config.model.clone())?;
        let predictor = strategy.predictor(&session);
        let result = BracketSimulator::new(predictor.as_ref()).simulate(&field)?;

        emit(output, format, &result, || report::format_simulation(&result))?;

        if let Some(year) = score_year {
            let actual = db.get_games_for_year(year)?;
            if actual.is_empty() {
                return Err(BracketError::Config(format!("No stored games for {}", year)));
            }
            let score = score_bracket(&result, &actual);
            match format {
                ReportFormat::Json => println!("{}", to_json(&score)?),
                ReportFormat::Table => {
                    println!("\nScore against {}", year);
                    print!("{}", report::format_score(&score));
                }
            }
        }
        Ok(())
    }

    pub fn upset(config: &Config, output: Option<&str>, higher_seed: u8, lower_seed: u8) -> Result<()> {
        let session = open_session(config)?;
        let probability = session.get_upset_probability(higher_seed, lower_seed)?;
        let value = serde_json::json!({
            "higher_seed": higher_seed,
            "lower_seed": lower_seed,
            "upset_probability": probability,
        });
        emit(output, ReportFormat::Table, &value, || {
            format!(
                "({}) over ({}): {:.1}% upset probability\n",
                lower_seed,
                higher_seed,
                probability * 100.0
            )
        })
    }

    pub fn stats(config: &Config, output: Option<&str>, team: &str, format: ReportFormat) -> Result<()> {
        let session = open_session(config)?;
        let name = session.resolve_team(team)?.name.clone();
        let stats = session.get_team_tournament_stats(team)?;
        let value = serde_json::json!({ "team": name, "stats": stats });
        emit(output, format, &value, || report::format_team_stats(&name, &stats))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn matchup(
        config: &Config,
        output: Option<&str>,
        team1: &str,
        team2: &str,
        seed1: u8,
        seed2: u8,
        format: ReportFormat,
    ) -> Result<()> {
        let session = open_session(config)?;
        let analysis = session.matchup_analysis(team1, team2, seed1, seed2)?;
        emit(output, format, &analysis, || report::format_matchup_analysis(&analysis))
    }
}
