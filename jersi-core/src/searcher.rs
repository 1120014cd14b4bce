//! Searcher trait and the simple players
//!
//! Anything that can pick an action for the side to move implements
//! [`Searcher`]; the game runner only talks to this trait.

use std::time::Duration;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::game::{Action, GameState};
use crate::notation::NotationError;

/// Picks an action for the player to move
pub trait Searcher: Send {
    /// Choose a legal action. Panics if `state` is terminal.
    fn search(&mut self, state: &GameState) -> Action;

    fn name(&self) -> &str;

    /// True for a proxy that relays externally supplied moves
    fn is_interactive(&self) -> bool {
        false
    }

    /// Wall-clock budget per move, if any
    fn time_limit(&self) -> Option<Duration> {
        None
    }
}

/// Build a seeded generator, or an entropy-seeded one
pub(crate) fn make_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

// ============================================================================
// RANDOM
// ============================================================================

/// Uniformly random legal action
pub struct RandomSearcher {
    name: String,
    rng: ChaCha8Rng,
}

impl RandomSearcher {
    pub fn new(name: impl Into<String>, seed: Option<u64>) -> Self {
        Self {
            name: name.into(),
            rng: make_rng(seed),
        }
    }
}

impl Searcher for RandomSearcher {
    fn search(&mut self, state: &GameState) -> Action {
        assert!(!state.is_terminal(), "search on a terminal state");
        state
            .actions()
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_else(|| panic!("non-terminal state without actions"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// HUMAN
// ============================================================================

/// Relays the move a user typed; the UI queues a name before each search
pub struct HumanSearcher {
    name: String,
    pending: Option<String>,
}

impl HumanSearcher {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            pending: None,
        }
    }

    /// Queue the next move after checking it against `state`. Names with or
    /// without capture marks are accepted.
    pub fn set_action_name(&mut self, state: &GameState, name: &str) -> Result<(), NotationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(NotationError::Empty);
        }
        let action = state
            .find_action(name)
            .ok_or_else(|| NotationError::UnknownAction(name.to_string()))?;
        self.pending = Some(state.action_name(action));
        Ok(())
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Searcher for HumanSearcher {
    /// Panics when no valid move was queued for this state
    fn search(&mut self, state: &GameState) -> Action {
        assert!(!state.is_terminal(), "search on a terminal state");
        let name = self
            .pending
            .take()
            .unwrap_or_else(|| panic!("no action queued for {}", self.name));
        state
            .action_by_name(&name)
            .cloned()
            .unwrap_or_else(|| panic!("queued action {} is not legal here", name))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn is_interactive(&self) -> bool {
        true
    }
}
