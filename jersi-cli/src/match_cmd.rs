//! Match command - play games between two players
//!
//! ## Architecture
//!
//! - run(): orchestration
//! - resolve_players(), play_match(), report_results(): phases
//! - formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use jersi_core::Tables;
use jersi_match::{play_match, MatchConfig, MatchResult, SearcherConfig};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Player A: random, abN, mmN, abN@MS or a JSON config file
    #[arg(long, default_value = "ab2")]
    pub a: String,

    /// Player B, same forms as -a
    #[arg(long, default_value = "random")]
    pub b: String,

    /// Number of games to play (will alternate colors)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Maximum turns per game, scored as a draw when reached
    #[arg(long, default_value = "200")]
    pub max_turns: u32,

    /// Play games one after another instead of in parallel
    #[arg(long)]
    pub sequential: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Directory to write each game's move list to
    #[arg(long, value_name = "DIR")]
    pub save_dir: Option<PathBuf>,
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Run match command
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let (a, b) = resolve_players(&args)?;
    let config = MatchConfig {
        games: args.games,
        max_turns: Some(args.max_turns),
        parallel: !args.sequential,
        seed: seed.unwrap_or(MatchConfig::default().seed),
    };

    tracing::info!("Starting match: {} vs {} ({} games)", a, b, config.games);

    let result = play_match(&Tables::shared(), &a, &b, &config)?;

    if let Some(dir) = &args.save_dir {
        save_games(&result, dir)?;
    }
    report_results(&result, &a, &b, args.json)
}

// ============================================================================
// PHASES
// ============================================================================

fn resolve_players(args: &MatchArgs) -> Result<(SearcherConfig, SearcherConfig)> {
    let a = SearcherConfig::resolve(&args.a).with_context(|| format!("player A '{}'", args.a))?;
    let b = SearcherConfig::resolve(&args.b).with_context(|| format!("player B '{}'", args.b))?;
    Ok((a, b))
}

fn save_games(result: &MatchResult, dir: &PathBuf) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    for game in &result.games {
        game.outcome.save_moves(&dir.join(format!("game-{:03}.txt", game.index + 1)))?;
    }
    Ok(())
}

fn report_results(result: &MatchResult, a: &SearcherConfig, b: &SearcherConfig, json: bool) -> Result<()> {
    if json {
        print_json_results(result, a, b)
    } else {
        print_text_results(result, a, b);
        Ok(())
    }
}

// ============================================================================
// UTILITIES
// ============================================================================

fn print_json_results(result: &MatchResult, a: &SearcherConfig, b: &SearcherConfig) -> Result<()> {
    #[derive(Serialize)]
    struct JsonGame {
        game_number: usize,
        a_color: String,
        end: String,
        winner: Option<String>,
        turns: usize,
    }

    #[derive(Serialize)]
    struct JsonOutput {
        a: String,
        b: String,
        total_games: u32,
        a_wins: u32,
        b_wins: u32,
        draws: u32,
        avg_turns: f32,
        a_score: f32,
        games: Vec<JsonGame>,
    }

    let output = JsonOutput {
        a: a.to_string(),
        b: b.to_string(),
        total_games: result.games_played,
        a_wins: result.a_wins,
        b_wins: result.b_wins,
        draws: result.draws,
        avg_turns: result.avg_turns,
        a_score: result.score_for_a(),
        games: result
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.index + 1,
                a_color: g.a_color().to_string(),
                end: format!("{:?}", g.outcome.end),
                winner: g.outcome.winner().map(|p| p.to_string()),
                turns: g.outcome.turns.len(),
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text_results(result: &MatchResult, a: &SearcherConfig, b: &SearcherConfig) {
    println!("\n=== Match Results ===");
    println!("A: {}  B: {}", a, b);
    println!("Total games: {}", result.games_played);
    for game in &result.games {
        let winner = match game.outcome.winner() {
            Some(color) if color == game.a_color() => "A",
            Some(_) => "B",
            None => "-",
        };
        println!(
            "  game {:>3}: A as {:<5} {:>4} turns  winner {}  ({:?})",
            game.index + 1,
            game.a_color(),
            game.outcome.turns.len(),
            winner,
            game.outcome.end
        );
    }
    println!("A wins: {} ({:.1}%)", result.a_wins, 100.0 * result.a_win_rate());
    println!("B wins: {}", result.b_wins);
    println!("Draws:  {} ({:.1}%)", result.draws, 100.0 * result.draw_rate());
    println!("Avg turns: {:.1}", result.avg_turns);
    println!("Score A {:.1} - B {:.1}", result.score_for_a(), result.score_for_b());
}
