//! Jersi Core - Rules engine and search
//!
//! This crate provides the core game logic for Jersi:
//! - Board geometry (45 hexagons with axial coordinates)
//! - Cube kinds and the rock/paper/scissors capture relation
//! - Packed cell codes and precomputed transition tables
//! - Game state and move generation
//! - Position evaluation and minimax/alpha-beta search
//! - Searchers: human proxy, random, minimax

pub mod board;
pub mod pieces;
pub mod codec;
pub mod transitions;
pub mod tables;
pub mod game;
pub mod setup;
pub mod notation;
pub mod eval;
pub mod ai;
pub mod opening;
pub mod searcher;

// Re-exports for convenient access
pub use board::{Direction, Geometry, Hex, HexIndex, HEX_COUNT};
pub use pieces::Cube;
pub use codec::{CellState, HexCode, CODE_BASE};
pub use tables::{Board, Tables};
pub use game::{Action, GameState, Player, Reward, Termination, MAX_CREDIT};
pub use setup::{BoardSetup, SetupError};
pub use notation::NotationError;
pub use eval::{StateEvaluator, Weights, OMEGA};
pub use ai::{search_depth, search_timed, Algorithm, MinimaxSearcher, SearchConfig, SearchResult};
pub use opening::OpeningBook;
pub use searcher::{HumanSearcher, RandomSearcher, Searcher};
