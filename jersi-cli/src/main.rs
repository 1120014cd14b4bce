//! Jersi CLI - Command-line interface
//!
//! Commands:
//! - play: Play a single game (engine, random or human players)
//! - match: Play several games between two players
//! - actions: List the legal actions of a position
//! - replay: Replay a saved move list

mod match_cmd;
mod play_cmd;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "jersi")]
#[command(about = "Jersi rules engine and search")]
struct Cli {
    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single game
    Play(play_cmd::PlayArgs),
    /// Play a match between two players
    Match(match_cmd::MatchArgs),
    /// List legal actions
    Actions {
        /// Setup file; the standard opening when omitted
        #[arg(long, value_name = "FILE")]
        setup: Option<PathBuf>,
        /// Inline setup text, e.g. "d4:R e5:s turn:white"
        #[arg(long, conflicts_with = "setup")]
        position: Option<String>,
        /// Moves to play first
        #[arg(long, value_delimiter = ',')]
        moves: Vec<String>,
    },
    /// Replay a move list and show the final position
    Replay {
        /// Move list file, one or more action names per line
        #[arg(value_name = "FILE")]
        moves: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
        Commands::Actions { setup, position, moves } => play_cmd::list_actions(setup, position, &moves),
        Commands::Replay { moves } => play_cmd::replay_file(&moves),
    }
}
