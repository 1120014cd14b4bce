//! Match play - several games between two players
//!
//! Player A takes White in even games and Black in odd ones.

use std::sync::Arc;

use jersi_core::{GameState, Player, Tables};
use rayon::prelude::*;

use crate::config::{ConfigError, MatchConfig, SearcherConfig};
use crate::game_runner::{play_game, GameOutcome};

/// Result of a match (multiple games)
#[derive(Clone, Debug)]
pub struct MatchResult {
    /// Wins for player A
    pub a_wins: u32,
    /// Wins for player B
    pub b_wins: u32,
    /// Draws, turn-limited games included
    pub draws: u32,
    /// Average game length in turns
    pub avg_turns: f32,
    /// Total games played
    pub games_played: u32,
    /// Individual games, each with whether A played White
    pub games: Vec<MatchGame>,
}

/// One game of a match
#[derive(Clone, Debug)]
pub struct MatchGame {
    pub index: usize,
    pub a_is_white: bool,
    pub outcome: GameOutcome,
}

impl MatchGame {
    /// Color played by player A
    pub fn a_color(&self) -> Player {
        if self.a_is_white {
            Player::White
        } else {
            Player::Black
        }
    }
}

impl MatchResult {
    /// Create empty result
    pub fn empty() -> Self {
        Self {
            a_wins: 0,
            b_wins: 0,
            draws: 0,
            avg_turns: 0.0,
            games_played: 0,
            games: Vec::new(),
        }
    }

    /// Wins = 1.0, Draws = 0.5, Losses = 0.0
    pub fn score_for_a(&self) -> f32 {
        self.a_wins as f32 + 0.5 * self.draws as f32
    }

    pub fn score_for_b(&self) -> f32 {
        self.b_wins as f32 + 0.5 * self.draws as f32
    }

    pub fn a_win_rate(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.a_wins as f32 / self.games_played as f32
        }
    }

    pub fn draw_rate(&self) -> f32 {
        if self.games_played == 0 {
            0.0
        } else {
            self.draws as f32 / self.games_played as f32
        }
    }
}

/// Play a match between two players from the standard opening
pub fn play_match(
    tables: &Arc<Tables>,
    a: &SearcherConfig,
    b: &SearcherConfig,
    config: &MatchConfig,
) -> Result<MatchResult, ConfigError> {
    if a.is_interactive() || b.is_interactive() {
        return Err(ConfigError::HumanInMatch);
    }
    a.validate()?;
    b.validate()?;
    if config.games == 0 {
        return Ok(MatchResult::empty());
    }

    let games: Vec<MatchGame> = if config.parallel {
        (0..config.games)
            .into_par_iter()
            .map(|index| play_single_game(tables, a, b, config, index))
            .collect()
    } else {
        (0..config.games)
            .map(|index| play_single_game(tables, a, b, config, index))
            .collect()
    };

    Ok(aggregate_results(games))
}

/// Play game `index`, alternating colors and seeding from the match seed
fn play_single_game(
    tables: &Arc<Tables>,
    a: &SearcherConfig,
    b: &SearcherConfig,
    config: &MatchConfig,
    index: usize,
) -> MatchGame {
    let seed = config.seed.wrapping_add(index as u64);
    let a_is_white = index % 2 == 0;
    let mut a_searcher = a.with_seed(seed).build(format!("A:{}", a));
    let mut b_searcher = b.with_seed(seed.wrapping_add(1)).build(format!("B:{}", b));

    let initial = GameState::new(Arc::clone(tables));
    let outcome = if a_is_white {
        play_game(initial, a_searcher.as_mut(), b_searcher.as_mut(), config.max_turns)
    } else {
        play_game(initial, b_searcher.as_mut(), a_searcher.as_mut(), config.max_turns)
    };

    MatchGame {
        index,
        a_is_white,
        outcome,
    }
}

/// Aggregate game outcomes into a match result
fn aggregate_results(mut games: Vec<MatchGame>) -> MatchResult {
    games.sort_by_key(|g| g.index);

    let mut result = MatchResult::empty();
    let mut total_turns = 0usize;
    for game in &games {
        total_turns += game.outcome.turns.len();
        match game.outcome.winner() {
            Some(winner) if winner == game.a_color() => result.a_wins += 1,
            Some(_) => result.b_wins += 1,
            None => result.draws += 1,
        }
    }

    result.games_played = games.len() as u32;
    result.avg_turns = if games.is_empty() {
        0.0
    } else {
        total_turns as f32 / games.len() as f32
    };
    result.games = games;
    result
}
