//! Text reports for terminal output

use crate::analysis::{MatchupAnalysis, TeamTournamentStats};
use crate::predict::PredictionResult;
use crate::simulate::{BracketScore, SimulationResult};

/// Format a prediction for display
pub fn format_prediction(pred: &PredictionResult) -> String {
    let factors: String = pred
        .breakdown
        .iter()
        .map(|c| {
            format!(
                "│    {:<20} {:>5.3} x {:.2} = {:.3}\n",
                c.factor.name(),
                c.score,
                c.weight,
                c.contribution
            )
        })
        .collect();

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  ({}) {} vs ({}) {}
├─────────────────────────────────────────────────┤
│  Winner:      {}{}
│  Confidence:  {:.1}%
│  Strategy:    {}
│  Factors:
{}└─────────────────────────────────────────────────┘
"#,
        pred.winner_seed,
        pred.winner.name,
        pred.loser_seed,
        pred.loser.name,
        pred.winner.name,
        if pred.is_upset() { " (upset)" } else { "" },
        pred.confidence * 100.0,
        pred.strategy,
        factors
    )
}

pub fn format_simulation(result: &SimulationResult) -> String {
    let mut out = String::new();
    for round in &result.rounds {
        out.push_str(&format!(
            "\n{} ({} teams)\n{}\n",
            round.label,
            round.teams_remaining,
            "─".repeat(60)
        ));
        for game in &round.games {
            out.push_str(&format!(
                "  ({:>2}) {:<22} vs ({:>2}) {:<22} -> {} {:.1}%{}\n",
                game.team1.seed,
                game.team1.team,
                game.team2.seed,
                game.team2.team,
                game.winner().team,
                game.prediction.confidence * 100.0,
                if game.is_upset() { " *" } else { "" }
            ));
        }
    }

    out.push_str(&format!(
        "\nChampion: ({}) {}\nUpsets: {}\n",
        result.champion.seed,
        result.champion.team,
        result.upsets.len()
    ));
    for upset in &result.upsets {
        out.push_str(&format!(
            "  {:<14} ({}) {} over ({}) {}\n",
            upset.round, upset.winner_seed, upset.winner, upset.loser_seed, upset.loser
        ));
    }
    out
}

pub fn format_team_stats(team: &str, stats: &TeamTournamentStats) -> String {
    let average_seed = stats
        .average_seed
        .map(|s| format!("{:.2}", s))
        .unwrap_or_else(|| "-".to_string());
    let best_round = stats
        .best_round
        .map(|r| r.label().to_string())
        .unwrap_or_else(|| "-".to_string());
    let last_deep_run = stats
        .last_deep_run
        .map(|y| y.to_string())
        .unwrap_or_else(|| "-".to_string());

    format!(
        r#"
┌─────────────────────────────────────────────────┐
│  {}
├─────────────────────────────────────────────────┤
│  Record:          {}-{} ({:.1}%)
│  Appearances:     {}
│  Average seed:    {}
│  Points:          {} for, {} against ({:+.1} per game)
│  Best round:      {}
│  Championships:   {}
│  Last deep run:   {}
└─────────────────────────────────────────────────┘
"#,
        team,
        stats.wins,
        stats.losses,
        stats.win_percentage * 100.0,
        stats.appearances,
        average_seed,
        stats.points_scored,
        stats.points_allowed,
        stats.avg_scoring_margin,
        best_round,
        stats.championships,
        last_deep_run
    )
}

pub fn format_matchup_analysis(analysis: &MatchupAnalysis) -> String {
    let upset = analysis
        .upset_probability
        .map(|p| format!("{:.1}%", p * 100.0))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "({}) {} vs ({}) {}\n  Head-to-head: {}-{} in {} games, avg margin {:+.1}\n  Upset probability for the seed pair: {}\n",
        analysis.seed1,
        analysis.team1,
        analysis.seed2,
        analysis.team2,
        analysis.head_to_head.team1_wins,
        analysis.head_to_head.team2_wins,
        analysis.head_to_head.games,
        analysis.head_to_head.avg_margin,
        upset
    )
}

pub fn format_score(score: &BracketScore) -> String {
    let mut out = format!(
        "{:<14} {:>7} {:>7} {:>8}\n",
        "Round", "Correct", "Points", "Possible"
    );
    for round in &score.rounds {
        out.push_str(&format!(
            "{:<14} {:>3}/{:<3} {:>7} {:>8}\n",
            round.round.label(),
            round.correct,
            round.picks,
            round.points,
            round.possible
        ));
    }
    out.push_str(&format!(
        "Total: {} of {} points ({} correct picks)\n",
        score.total_points, score.possible_points, score.correct_picks
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisSession;
    use crate::data::fixtures;
    use crate::predict::HistoricalPredictor;
    use crate::simulate::{BracketSimulator, RoundScore};
    use crate::{ModelConfig, Round};

    #[test]
    fn test_reports_name_the_teams() {
        let session =
            AnalysisSession::build(&fixtures::historical_store(), ModelConfig::default()).unwrap();
        let predictor = HistoricalPredictor::new(&session);

        let prediction = predictor
            .predict_winner("Norfolk State", "Gonzaga", 16, 1)
            .unwrap();
        let text = format_prediction(&prediction);
        assert!(text.contains("Winner:      Gonzaga"));
        assert!(text.contains("seed_advantage"));

        let stats = session.get_team_tournament_stats("Gonzaga").unwrap();
        assert!(format_team_stats("Gonzaga", &stats).contains("17-0"));

        let result = BracketSimulator::new(&predictor)
            .simulate_bracket(&fixtures::field_2024())
            .unwrap();
        let text = format_simulation(&result);
        assert!(text.contains("Round of 64 (64 teams)"));
        assert!(text.contains(&format!("Champion: ({}) {}", result.champion.seed, result.champion.team)));
    }

    #[test]
    fn test_score_report_lines() {
        let score = BracketScore {
            rounds: vec![RoundScore {
                round: Round::RoundOf64,
                picks: 32,
                correct: 24,
                points: 24,
                possible: 32,
            }],
            total_points: 24,
            possible_points: 32,
            correct_picks: 24,
        };
        let text = format_score(&score);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Round"));
        assert!(lines[1].starts_with("Round of 64"));
        assert!(lines[1].contains(" 24/32 "));
        assert_eq!(lines[2], "Total: 24 of 32 points (24 correct picks)");
    }
}
