//! Move-list replay

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use jersi_core::{GameState, Tables};

/// A move list that does not fit the game
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("move {index} '{name}' is not legal on turn {turn}")]
    IllegalMove { index: usize, turn: u32, name: String },
    #[error("move {index} '{name}' comes after the game ended on turn {turn}")]
    GameOver { index: usize, turn: u32, name: String },
}

/// Replay `moves` from `initial`; names may omit capture marks
pub fn replay_from<S: AsRef<str>>(initial: GameState, moves: &[S]) -> Result<GameState, ReplayError> {
    let mut state = initial;
    for (index, name) in moves.iter().enumerate() {
        let name = name.as_ref();
        if state.is_terminal() {
            return Err(ReplayError::GameOver {
                index,
                turn: state.turn(),
                name: name.to_string(),
            });
        }
        let next = match state.find_action(name) {
            Some(action) => state.take_action(action),
            None => {
                return Err(ReplayError::IllegalMove {
                    index,
                    turn: state.turn(),
                    name: name.to_string(),
                })
            }
        };
        state = next;
    }
    Ok(state)
}

/// Replay `moves` from the standard opening
pub fn replay<S: AsRef<str>>(tables: &Arc<Tables>, moves: &[S]) -> Result<GameState, ReplayError> {
    replay_from(GameState::new(Arc::clone(tables)), moves)
}

/// Read a move list: whitespace separated names, `#` starts a comment
pub fn load_moves(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading move list {}", path.display()))?;
    Ok(parse_moves(&content))
}

pub fn parse_moves(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}
