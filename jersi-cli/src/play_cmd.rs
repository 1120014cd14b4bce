//! Play command - a single game, with prompts for human players

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;

use jersi_core::{BoardSetup, GameState, HumanSearcher, Player, Searcher, Tables};
use jersi_match::{load_moves, replay_from, GameRunner, SearcherConfig};

// ============================================================================
// COMMAND ARGUMENTS
// ============================================================================

#[derive(Args)]
pub struct PlayArgs {
    /// White player: random, human, abN, mmN, abN@MS or a JSON config file
    #[arg(long, default_value = "human")]
    pub white: String,

    /// Black player, same forms as --white
    #[arg(long, default_value = "ab2")]
    pub black: String,

    /// Start from a setup file instead of the standard opening
    #[arg(long, value_name = "FILE")]
    pub setup: Option<PathBuf>,

    /// Stop after this many turns
    #[arg(long)]
    pub max_turns: Option<u32>,

    /// Save the move list when the game ends
    #[arg(long, value_name = "FILE")]
    pub save: Option<PathBuf>,

    /// Print the board after every move
    #[arg(long)]
    pub show_board: bool,
}

/// One side of the board
enum Seat {
    Human(HumanSearcher),
    Engine(Box<dyn Searcher>),
}

impl Seat {
    fn build(spec: &str, color: Player, seed: Option<u64>) -> Result<Self> {
        let config = SearcherConfig::resolve(spec)?;
        let config = match seed {
            Some(seed) => config.with_seed(seed.wrapping_add(color as u64)),
            None => config,
        };
        let name = format!("{}:{}", color, config);
        Ok(match config {
            SearcherConfig::Human => Seat::Human(HumanSearcher::new(name)),
            other => Seat::Engine(other.build(name)),
        })
    }
}

// ============================================================================
// ORCHESTRATION
// ============================================================================

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let tables = Tables::shared();
    let initial = initial_state(&tables, args.setup.as_deref(), None)?;
    let mut white = Seat::build(&args.white, Player::White, seed)?;
    let mut black = Seat::build(&args.black, Player::Black, seed)?;

    let mut runner = GameRunner::new(initial, args.max_turns);
    println!("{}", runner.state());

    let stdin = io::stdin();
    let mut input = stdin.lock();
    while !runner.is_over() {
        let seat = match runner.state().player() {
            Player::White => &mut white,
            Player::Black => &mut black,
        };
        let record = match seat {
            Seat::Human(human) => {
                if !prompt_move(human, runner.state(), &mut input)? {
                    println!("game abandoned");
                    return Ok(());
                }
                runner.play_turn(human)
            }
            Seat::Engine(engine) => runner.play_turn(engine.as_mut()),
        };
        println!(
            "{:>3}. {} {} ({} ms)",
            record.turn,
            record.player,
            record.action,
            record.elapsed.as_millis()
        );
        if args.show_board {
            println!("{}", runner.state());
        }
    }

    let outcome = runner.finish();
    println!("{}", outcome.final_state);
    match outcome.winner() {
        Some(winner) => println!("{} wins ({:?})", winner, outcome.end),
        None => println!("draw ({:?})", outcome.end),
    }
    if let Some(path) = &args.save {
        outcome.save_moves(path)?;
        println!("moves saved to {}", path.display());
    }
    Ok(())
}

/// Read lines until the user enters a legal move; false on quit or EOF
fn prompt_move(human: &mut HumanSearcher, state: &GameState, input: &mut impl BufRead) -> Result<bool> {
    loop {
        print!("{} to move> ", state.player());
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match line.trim() {
            "quit" | "exit" => return Ok(false),
            "actions" | "?" => {
                println!("{}", sorted_names(state).join(" "));
                continue;
            }
            "board" => {
                println!("{}", state);
                continue;
            }
            name => match human.set_action_name(state, name) {
                Ok(()) => return Ok(true),
                Err(e) => println!("{} (type 'actions' for the list)", e),
            },
        }
    }
}

// ============================================================================
// POSITION TOOLS
// ============================================================================

/// List legal actions of a position
pub fn list_actions(setup: Option<PathBuf>, position: Option<String>, moves: &[String]) -> Result<()> {
    let tables = Tables::shared();
    let state = initial_state(&tables, setup.as_deref(), position.as_deref())?;
    let state = replay_from(state, moves)?;

    println!("{}", state);
    if let Some(termination) = state.termination() {
        println!("game over: {:?}", termination);
        return Ok(());
    }
    let names = sorted_names(&state);
    println!("{} legal actions", names.len());
    for name in names {
        println!("{}", name);
    }
    Ok(())
}

/// Replay a saved move list from the standard opening
pub fn replay_file(path: &Path) -> Result<()> {
    let moves = load_moves(path)?;
    let state = replay_from(GameState::new(Tables::shared()), &moves)
        .with_context(|| format!("replaying {}", path.display()))?;

    println!("{}", state);
    println!("{} moves replayed", moves.len());
    match state.termination() {
        Some(termination) => println!("game over: {:?}", termination),
        None => println!("game in progress"),
    }
    Ok(())
}

fn initial_state(tables: &Arc<Tables>, setup: Option<&Path>, position: Option<&str>) -> Result<GameState> {
    match (setup, position) {
        (Some(_), Some(_)) => bail!("give either a setup file or a position, not both"),
        (Some(path), None) => {
            let setup = BoardSetup::load(&tables.geometry, path)?;
            Ok(GameState::from_setup(Arc::clone(tables), &setup))
        }
        (None, Some(text)) => Ok(GameState::from_setup_text(Arc::clone(tables), text)?),
        (None, None) => Ok(GameState::new(Arc::clone(tables))),
    }
}

fn sorted_names(state: &GameState) -> Vec<String> {
    let mut names: Vec<String> = state.actions().iter().map(|a| state.action_name(a)).collect();
    names.sort();
    names
}
