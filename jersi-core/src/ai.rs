//! Minimax and alpha-beta search

use std::cmp::Reverse;
use std::path::PathBuf;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::eval::{StateEvaluator, Weights};
use crate::game::{Action, GameState, Player};
use crate::opening::OpeningBook;
use crate::searcher::{make_rng, Searcher};

// ============================================================================
// CONSTANTS
// ============================================================================

/// How often the time-boxed race checks its deadline
const POLL_SLICE: Duration = Duration::from_millis(10);

// ============================================================================
// CONFIGURATION
// ============================================================================

/// Tree search flavour
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Algorithm {
    Minimax,
    #[default]
    AlphaBeta,
}

/// Search configuration for a [`MinimaxSearcher`]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub algorithm: Algorithm,
    /// Fixed depth, or the deepest depth raced when time-boxed
    pub depth: u32,
    /// Wall-clock budget per move; `None` searches to `depth` unconditionally
    pub time_limit_ms: Option<u64>,
    pub weights: Weights,
    /// Directory of the opening book, disabled when `None`
    pub openings_dir: Option<PathBuf>,
    /// Random seed for reproducibility (None = random)
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            algorithm: Algorithm::AlphaBeta,
            depth: 2,
            time_limit_ms: None,
            weights: Weights::default(),
            openings_dir: None,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Alpha-beta at the given depth
    pub fn alpha_beta(depth: u32) -> Self {
        Self {
            algorithm: Algorithm::AlphaBeta,
            depth,
            ..Default::default()
        }
    }

    /// Plain minimax at the given depth
    pub fn minimax(depth: u32) -> Self {
        Self {
            algorithm: Algorithm::Minimax,
            depth,
            ..Default::default()
        }
    }

    pub fn with_time_limit(mut self, ms: u64) -> Self {
        self.time_limit_ms = Some(ms);
        self
    }

    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_openings(mut self, dir: impl Into<PathBuf>) -> Self {
        self.openings_dir = Some(dir.into());
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }

    /// Short label such as `ab3` or `mm2@500`
    pub fn label(&self) -> String {
        let prefix = match self.algorithm {
            Algorithm::Minimax => "mm",
            Algorithm::AlphaBeta => "ab",
        };
        match self.time_limit_ms {
            Some(ms) => format!("{}{}@{}", prefix, self.depth, ms),
            None => format!("{}{}", prefix, self.depth),
        }
    }
}

// ============================================================================
// TREE SEARCH
// ============================================================================

/// Whose turn it is relative to the root player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Max,
    Min,
}

impl Side {
    pub fn flip(self) -> Self {
        match self {
            Side::Max => Side::Min,
            Side::Min => Side::Max,
        }
    }
}

/// Score an action for ordering (higher = search first)
fn move_score(action: &Action) -> u32 {
    2 * action.capture_count() + action.stack_move_count()
}

/// Recursive search from one root player's point of view
pub struct TreeSearch<'a> {
    evaluator: &'a StateEvaluator,
    maximizer: Player,
    rng: &'a mut ChaCha8Rng,
    nodes: u64,
}

impl<'a> TreeSearch<'a> {
    pub fn new(evaluator: &'a StateEvaluator, maximizer: Player, rng: &'a mut ChaCha8Rng) -> Self {
        Self {
            evaluator,
            maximizer,
            rng,
            nodes: 0,
        }
    }

    /// Nodes visited so far
    pub fn nodes(&self) -> u64 {
        self.nodes
    }

    /// Action indices shuffled, then stably sorted by capture and stack moves
    fn ordered(&mut self, actions: &[Action]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..actions.len()).collect();
        order.shuffle(&mut *self.rng);
        order.sort_by_key(|&i| Reverse(move_score(&actions[i])));
        order
    }

    fn leaf(&mut self, state: &GameState, depth: u32) -> Option<f32> {
        self.nodes += 1;
        if depth == 0 || state.is_terminal() {
            Some(self.evaluator.evaluate_with_depth(state, self.maximizer, depth))
        } else {
            None
        }
    }

    pub fn minimax(&mut self, state: &GameState, side: Side, depth: u32) -> f32 {
        if let Some(value) = self.leaf(state, depth) {
            return value;
        }

        let children = state.actions().iter().map(|action| state.child(action));
        let mut best = match side {
            Side::Max => f32::NEG_INFINITY,
            Side::Min => f32::INFINITY,
        };
        for child in children {
            let value = self.minimax(&child, side.flip(), depth - 1);
            best = match side {
                Side::Max => best.max(value),
                Side::Min => best.min(value),
            };
        }
        best
    }

    /// Fail-soft alpha-beta. Cutoffs are strict, so a result inside
    /// `[alpha, beta]` is the exact minimax value.
    pub fn alpha_beta(&mut self, state: &GameState, side: Side, depth: u32, mut alpha: f32, mut beta: f32) -> f32 {
        if let Some(value) = self.leaf(state, depth) {
            return value;
        }

        let actions = state.actions();
        let order = self.ordered(actions);

        match side {
            Side::Max => {
                let mut best = f32::NEG_INFINITY;
                for i in order {
                    let child = state.child(&actions[i]);
                    best = best.max(self.alpha_beta(&child, Side::Min, depth - 1, alpha, beta));
                    if best > beta {
                        break;
                    }
                    alpha = alpha.max(best);
                }
                best
            }
            Side::Min => {
                let mut best = f32::INFINITY;
                for i in order {
                    let child = state.child(&actions[i]);
                    best = best.min(self.alpha_beta(&child, Side::Max, depth - 1, alpha, beta));
                    if best < alpha {
                        break;
                    }
                    beta = beta.min(best);
                }
                best
            }
        }
    }
}

// ============================================================================
// ROOT SEARCH
// ============================================================================

/// Outcome of one root search
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub depth: u32,
    /// Value of the best actions, from the mover's point of view
    pub value: f32,
    /// Every action reaching `value`
    pub best: Vec<Action>,
    pub nodes: u64,
    pub elapsed: Duration,
    pub from_book: bool,
}

impl SearchResult {
    /// One of the best actions, uniformly at random
    pub fn choose(&self, rng: &mut ChaCha8Rng) -> Action {
        self.best
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| panic!("search result at depth {} has no action", self.depth))
    }
}

/// Search the root to a fixed depth, consulting the opening book on the
/// standard starting position
pub fn search_depth(state: &GameState, config: &SearchConfig, depth: u32, rng: &mut ChaCha8Rng) -> SearchResult {
    assert!(!state.is_terminal(), "search on a terminal state");
    assert!(depth >= 1, "search depth must be at least 1");
    let start = Instant::now();

    let book = config
        .openings_dir
        .as_ref()
        .filter(|_| state.is_standard_opening())
        .map(OpeningBook::new);

    if let Some(entries) = book.as_ref().and_then(|book| book.load(state, depth)) {
        let value = entries.iter().map(|(_, v)| *v).fold(f32::NEG_INFINITY, f32::max);
        return SearchResult {
            depth,
            value,
            best: entries.into_iter().map(|(action, _)| action).collect(),
            nodes: 0,
            elapsed: start.elapsed(),
            from_book: true,
        };
    }

    let evaluator = StateEvaluator::new(config.weights);
    let mut search = TreeSearch::new(&evaluator, state.player(), rng);
    let actions = state.actions();
    let order = search.ordered(actions);

    // Scores are kept per call, keyed by action index
    let mut scores: FxHashMap<usize, f32> = FxHashMap::default();
    let mut alpha = f32::NEG_INFINITY;
    for i in order {
        let child = state.child(&actions[i]);
        let value = match config.algorithm {
            Algorithm::Minimax => search.minimax(&child, Side::Min, depth - 1),
            Algorithm::AlphaBeta => search.alpha_beta(&child, Side::Min, depth - 1, alpha, f32::INFINITY),
        };
        tracing::debug!(action = %state.action_name(&actions[i]), value, depth, "searched");
        scores.insert(i, value);
        alpha = alpha.max(value);
    }

    let mut best_indices: Vec<usize> = scores
        .iter()
        .filter(|(_, value)| **value == alpha)
        .map(|(&i, _)| i)
        .collect();
    best_indices.sort_unstable();
    let best: Vec<Action> = best_indices.iter().map(|&i| actions[i].clone()).collect();

    if let Some(book) = &book {
        let entries: Vec<(Action, f32)> = best.iter().map(|action| (action.clone(), alpha)).collect();
        book.store(state, depth, &entries);
    }

    SearchResult {
        depth,
        value: alpha,
        best,
        nodes: search.nodes(),
        elapsed: start.elapsed(),
        from_book: false,
    }
}

/// Race one search per depth `1..=config.depth` against `time_limit` and
/// keep the deepest that finished. Late workers are left running detached
/// and their results dropped. Panics if not even depth 1 finished.
pub fn search_timed(state: &GameState, config: &SearchConfig, time_limit: Duration, rng: &mut ChaCha8Rng) -> SearchResult {
    assert!(!state.is_terminal(), "search on a terminal state");
    let deadline = Instant::now() + time_limit;
    let (tx, rx) = mpsc::channel();

    for depth in 1..=config.depth {
        let tx = tx.clone();
        let state = state.clone();
        let config = config.clone();
        let seed: u64 = rng.gen();
        thread::spawn(move || {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let result = search_depth(&state, &config, depth, &mut rng);
            // The receiver is gone once the deadline passed
            let _ = tx.send(result);
        });
    }
    drop(tx);

    let mut deepest: Option<SearchResult> = None;
    let mut received = 0;
    while received < config.depth {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        match rx.recv_timeout((deadline - now).min(POLL_SLICE)) {
            Ok(result) => {
                received += 1;
                if deepest.as_ref().map_or(true, |d| result.depth > d.depth) {
                    deepest = Some(result);
                }
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    let result = deepest.unwrap_or_else(|| panic!("no search depth finished within {:?}", time_limit));
    if result.depth < config.depth {
        tracing::warn!(
            reached = result.depth,
            requested = config.depth,
            "time limit hit before the deepest search finished"
        );
    }
    result
}

// ============================================================================
// SEARCHER
// ============================================================================

/// Minimax or alpha-beta player
pub struct MinimaxSearcher {
    name: String,
    config: SearchConfig,
    rng: ChaCha8Rng,
}

impl MinimaxSearcher {
    pub fn new(name: impl Into<String>, config: SearchConfig) -> Self {
        let rng = make_rng(config.seed);
        Self {
            name: name.into(),
            config,
            rng,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the configured search without choosing among the best actions
    pub fn search_result(&mut self, state: &GameState) -> SearchResult {
        match self.config.time_limit() {
            Some(limit) => search_timed(state, &self.config, limit, &mut self.rng),
            None => search_depth(state, &self.config, self.config.depth, &mut self.rng),
        }
    }
}

impl Searcher for MinimaxSearcher {
    fn search(&mut self, state: &GameState) -> Action {
        let result = self.search_result(state);
        tracing::debug!(
            searcher = %self.name,
            depth = result.depth,
            value = result.value,
            ties = result.best.len(),
            nodes = result.nodes,
            book = result.from_book,
            "search finished"
        );
        result.choose(&mut self.rng)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn time_limit(&self) -> Option<Duration> {
        self.config.time_limit()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Termination;
    use crate::tables::Tables;
    use std::collections::HashSet;

    fn from_text(text: &str) -> GameState {
        GameState::from_setup_text(Tables::shared(), text).unwrap()
    }

    fn small_game() -> GameState {
        from_text("c3:R d3:P d4:s e3:p b4:WW f2:w")
    }

    fn best_names(state: &GameState, result: &SearchResult) -> HashSet<String> {
        result.best.iter().map(|a| state.action_name(a)).collect()
    }

    #[test]
    fn test_alpha_beta_matches_minimax() {
        for text in ["c3:R d3:P d4:s e3:p b4:WW f2:w", "d4:WS c4:P e4:r e5:sp turn:black"] {
            let game = from_text(text);
            for depth in 1..=3 {
                let mut rng = ChaCha8Rng::seed_from_u64(depth as u64);
                let mm = search_depth(&game, &SearchConfig::minimax(depth), depth, &mut rng);
                let ab = search_depth(&game, &SearchConfig::alpha_beta(depth), depth, &mut rng);
                assert_eq!(ab.value, mm.value, "{} at depth {}", text, depth);
                assert!(best_names(&game, &ab).is_subset(&best_names(&game, &mm)));
                assert!(ab.nodes <= mm.nodes);
            }
        }
    }

    #[test]
    fn test_takes_immediate_win() {
        let game = from_text("f3:R c3:r b4:W");
        for depth in 1..=2 {
            let mut searcher = MinimaxSearcher::new("ab", SearchConfig::alpha_beta(depth).with_seed(5));
            let action = searcher.search(&game);
            let next = game.take_action(&action);
            assert_eq!(next.termination(), Some(Termination::Goal(Player::White)));
        }
    }

    #[test]
    fn test_move_ordering_puts_captures_first() {
        let game = small_game();
        let evaluator = StateEvaluator::default();
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut search = TreeSearch::new(&evaluator, game.player(), &mut rng);
        let actions = game.actions();
        let order = search.ordered(actions);
        assert_eq!(order.len(), actions.len());
        let scores: Vec<u32> = order.iter().map(|&i| move_score(&actions[i])).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert!(actions[order[0]].is_capture());
    }

    #[test]
    fn test_timed_search_reaches_depth() {
        let game = small_game();
        let config = SearchConfig::alpha_beta(2).with_time_limit(30_000);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let result = search_timed(&game, &config, config.time_limit().unwrap(), &mut rng);
        assert_eq!(result.depth, 2);
        assert!(!result.best.is_empty());
    }

    #[test]
    fn test_timed_search_falls_back_to_shallower_depth() {
        let game = GameState::new(Tables::shared());
        let config = SearchConfig::alpha_beta(5).with_time_limit(300);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let result = search_timed(&game, &config, config.time_limit().unwrap(), &mut rng);

        assert!(result.depth >= 1 && result.depth < 5, "reached depth {}", result.depth);
        let action = result.choose(&mut rng);
        assert!(game.actions().contains(&action));
    }

    #[test]
    fn test_searcher_uses_opening_book() {
        let dir = std::env::temp_dir().join(format!("jersi-ai-book-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        let game = GameState::new(Tables::shared());
        let config = SearchConfig::alpha_beta(1).with_openings(&dir).with_seed(2);

        let first = MinimaxSearcher::new("ab", config.clone()).search_result(&game);
        assert!(!first.from_book);
        let second = MinimaxSearcher::new("ab", config).search_result(&game);
        assert!(second.from_book);
        assert_eq!(best_names(&game, &first), best_names(&game, &second));
        assert_eq!(first.value, second.value);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_config_builders() {
        let config = SearchConfig::minimax(3).with_time_limit(250).with_seed(7);
        assert_eq!(config.label(), "mm3@250");
        assert_eq!(config.time_limit(), Some(Duration::from_millis(250)));
        assert_eq!(SearchConfig::alpha_beta(4).label(), "ab4");

        let json = serde_json::to_string(&config).unwrap();
        let back: SearchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
        let partial: SearchConfig = serde_json::from_str(r#"{"depth": 5}"#).unwrap();
        assert_eq!(partial.algorithm, Algorithm::AlphaBeta);
        assert_eq!(partial.depth, 5);
    }
}
