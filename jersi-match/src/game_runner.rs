//! Game runner - plays a single game between two searchers

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::Context;
use jersi_core::{GameState, Player, Reward, Searcher, Termination};
use serde::{Deserialize, Serialize};

/// Why a game stopped
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEnd {
    /// The rules ended the game
    Finished(Termination),
    /// The runner's turn limit was reached first; scored as a draw
    TurnLimit,
}

/// One played turn
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TurnRecord {
    pub turn: u32,
    pub player: Player,
    /// Full action name, with capture marks
    pub action: String,
    /// Time the searcher took
    pub elapsed: Duration,
}

/// Outcome of a single game
#[derive(Clone, Debug)]
pub struct GameOutcome {
    pub end: GameEnd,
    /// (white, black)
    pub rewards: (Reward, Reward),
    pub turns: Vec<TurnRecord>,
    pub final_state: GameState,
}

impl GameOutcome {
    /// Get winner (None for draw)
    pub fn winner(&self) -> Option<Player> {
        match self.rewards {
            (Reward::Win, _) => Some(Player::White),
            (_, Reward::Win) => Some(Player::Black),
            _ => None,
        }
    }

    pub fn white_wins(&self) -> bool {
        self.winner() == Some(Player::White)
    }

    pub fn black_wins(&self) -> bool {
        self.winner() == Some(Player::Black)
    }

    pub fn is_draw(&self) -> bool {
        self.winner().is_none()
    }

    /// Action names in play order
    pub fn moves(&self) -> Vec<&str> {
        self.turns.iter().map(|t| t.action.as_str()).collect()
    }

    /// Total searcher time spent by `player`
    pub fn thinking_time(&self, player: Player) -> Duration {
        self.turns.iter().filter(|t| t.player == player).map(|t| t.elapsed).sum()
    }

    /// Write the move list, one action per line, for later replay
    pub fn save_moves(&self, path: &Path) -> anyhow::Result<()> {
        let mut content = self.moves().join("\n");
        content.push('\n');
        std::fs::write(path, content).with_context(|| format!("writing move list {}", path.display()))?;
        Ok(())
    }
}

/// Plays one game turn by turn
pub struct GameRunner {
    state: GameState,
    turns: Vec<TurnRecord>,
    max_turns: Option<u32>,
}

impl GameRunner {
    pub fn new(initial: GameState, max_turns: Option<u32>) -> Self {
        Self {
            state: initial,
            turns: Vec::new(),
            max_turns,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn turns(&self) -> &[TurnRecord] {
        &self.turns
    }

    fn turn_limit_reached(&self) -> bool {
        self.max_turns.map_or(false, |max| self.turns.len() as u32 >= max)
    }

    pub fn is_over(&self) -> bool {
        self.state.is_terminal() || self.turn_limit_reached()
    }

    /// Ask `searcher` for the next action and apply it
    pub fn play_turn(&mut self, searcher: &mut dyn Searcher) -> &TurnRecord {
        assert!(!self.is_over(), "play_turn on a finished game");
        let start = Instant::now();
        let action = searcher.search(&self.state);
        let elapsed = start.elapsed();

        let record = TurnRecord {
            turn: self.state.turn(),
            player: self.state.player(),
            action: self.state.action_name(&action),
            elapsed,
        };
        tracing::debug!(
            turn = record.turn,
            player = %record.player,
            searcher = searcher.name(),
            action = %record.action,
            ms = elapsed.as_millis() as u64,
            "move"
        );

        self.state = self.state.take_action(&action);
        self.turns.push(record);
        &self.turns[self.turns.len() - 1]
    }

    /// Alternate the two searchers until the game ends
    pub fn play(mut self, white: &mut dyn Searcher, black: &mut dyn Searcher) -> GameOutcome {
        while !self.is_over() {
            match self.state.player() {
                Player::White => self.play_turn(white),
                Player::Black => self.play_turn(black),
            };
        }
        let outcome = self.finish();
        tracing::info!(
            white = white.name(),
            black = black.name(),
            end = ?outcome.end,
            winner = ?outcome.winner(),
            turns = outcome.turns.len(),
            "game over"
        );
        outcome
    }

    /// Close the game; panics if it is still running
    pub fn finish(self) -> GameOutcome {
        let (end, rewards) = match self.state.termination() {
            Some(termination) => (GameEnd::Finished(termination), termination.rewards()),
            None if self.turn_limit_reached() => (GameEnd::TurnLimit, (Reward::Draw, Reward::Draw)),
            None => panic!("finish on a running game"),
        };
        GameOutcome {
            end,
            rewards,
            turns: self.turns,
            final_state: self.state,
        }
    }
}

/// Play a full game from `initial` without keeping the runner around
pub fn play_game(
    initial: GameState,
    white: &mut dyn Searcher,
    black: &mut dyn Searcher,
    max_turns: Option<u32>,
) -> GameOutcome {
    GameRunner::new(initial, max_turns).play(white, black)
}
