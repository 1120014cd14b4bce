//! Jersi Match - Playing games between searchers
//!
//! This crate provides the orchestration around the engine:
//! - Searcher configuration (short specs and JSON files)
//! - Single games with per-turn timing and termination tracking
//! - Matches with alternating colors, optionally in parallel
//! - Move-list replay

mod config;
mod game_runner;
mod match_play;
mod replay;

pub use config::{ConfigError, MatchConfig, SearcherConfig};
pub use game_runner::{play_game, GameEnd, GameOutcome, GameRunner, TurnRecord};
pub use match_play::{play_match, MatchGame, MatchResult};
pub use replay::{load_moves, parse_moves, replay, replay_from, ReplayError};
