//! Integration tests for the Jersi engine
//!
//! Tests the full stack: rules, setups, search, game runner, matches and replay

use std::time::Duration;

use jersi_core::{
    search_depth, search_timed, BoardSetup, CellState, Cube, GameState, HumanSearcher, MinimaxSearcher, Player,
    RandomSearcher, Reward, SearchConfig, Searcher, SetupError, Tables, Termination, MAX_CREDIT,
};
use jersi_match::{
    parse_moves, play_game, play_match, replay, GameEnd, GameRunner, MatchConfig, ReplayError, SearcherConfig,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// TEST FIXTURES
// ============================================================================

/// Standard opening position
fn opening() -> GameState {
    GameState::new(Tables::shared())
}

/// Position from setup text
fn position(text: &str) -> GameState {
    GameState::from_setup_text(Tables::shared(), text).unwrap()
}

/// A small middle game with captures available to both sides
fn skirmish() -> GameState {
    position("c3:R d3:P d4:s e3:p b4:WW f2:w")
}

// ============================================================================
// RULES TESTS
// ============================================================================

#[test]
fn test_opening_position() {
    let game = opening();
    assert_eq!(game.player(), Player::White);
    assert_eq!(game.credit(), MAX_CREDIT);
    assert_eq!(game.actions().len(), 186);
    assert!(game.actions().iter().all(|a| !a.is_capture()));
}

#[test]
fn test_first_move_builds_stack() {
    let game = opening();
    let action = game.action_by_name("a1-a2").unwrap().clone();
    let next = game.take_action(&action);

    assert_eq!(next.cell_at("a1"), Some(CellState::Empty));
    assert_eq!(
        next.cell_at("a2"),
        Some(CellState::Stack { owner: Player::White, bottom: Cube::Rock, top: Cube::Paper })
    );
    assert_eq!(next.player(), Player::Black);
    assert_eq!(next.credit(), MAX_CREDIT - 1);
    assert_eq!(next.turn(), 2);

    // the parent state is unchanged
    assert_eq!(game.cell_at("a1"), Some(CellState::Single { owner: Player::White, cube: Cube::Paper }));
}

#[test]
fn test_capture_resets_credit() {
    let game = position("d4:R d5:s a1:W g1:w credit:7");
    let action = game.action_by_simple_name("d4-d5").unwrap().clone();
    let next = game.take_action(&action);

    assert_eq!(next.credit(), MAX_CREDIT);
    assert_eq!(next.cell_at("d5"), Some(CellState::Single { owner: Player::White, cube: Cube::Rock }));
    // Black's only cube left is the wise one, which can still move
    assert!(!next.is_terminal());
}

#[test]
fn test_game_ends_on_goal() {
    let game = position("f3:R c4:r b4:W");
    let action = game.find_action("f3-g3").unwrap().clone();
    let next = game.take_action(&action);

    assert_eq!(next.termination(), Some(Termination::Goal(Player::White)));
    assert_eq!(next.reward_for(Player::White), Some(Reward::Win));
    assert_eq!(next.reward_for(Player::Black), Some(Reward::Loss));
}

#[test]
fn test_setup_errors_are_readable() {
    let err = GameState::from_setup_text(Tables::shared(), "z9:R").unwrap_err();
    assert_eq!(err, SetupError::UnknownHex("z9".into()));
    assert_eq!(err.to_string(), "unknown hexagon 'z9'");

    let err = GameState::from_setup_text(Tables::shared(), "a1:RW").unwrap_err();
    assert!(err.to_string().contains("wise cube on a fighter"));

    let tables = Tables::shared();
    let setup = BoardSetup::standard(&tables.geometry);
    let text = setup.to_text(&tables.geometry);
    assert_eq!(BoardSetup::parse(&tables.geometry, &text).unwrap(), setup);
}

// ============================================================================
// SEARCH TESTS
// ============================================================================

#[test]
fn test_alpha_beta_agrees_with_minimax() {
    let game = skirmish();
    for depth in 1..=2 {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mm = search_depth(&game, &SearchConfig::minimax(depth), depth, &mut rng);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let ab = search_depth(&game, &SearchConfig::alpha_beta(depth), depth, &mut rng);

        assert_eq!(ab.value, mm.value, "depth {}", depth);
        assert!(ab.nodes <= mm.nodes);
        for action in &ab.best {
            assert!(mm.best.contains(action));
        }
    }
}

#[test]
fn test_search_finds_winning_move() {
    let game = position("f3:R c4:r b4:W");
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let result = search_depth(&game, &SearchConfig::alpha_beta(2), 2, &mut rng);

    let action = result.choose(&mut rng);
    let next = game.take_action(&action);
    assert_eq!(next.termination(), Some(Termination::Goal(Player::White)));
}

#[test]
fn test_timed_search_returns_legal_action() {
    let game = skirmish();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let config = SearchConfig::alpha_beta(2);
    let result = search_timed(&game, &config, Duration::from_secs(30), &mut rng);

    assert_eq!(result.depth, 2);
    let action = result.choose(&mut rng);
    assert!(game.actions().contains(&action));
}

#[test]
fn test_searcher_is_reproducible() {
    let game = skirmish();
    let mut a = MinimaxSearcher::new("a", SearchConfig::alpha_beta(2).with_seed(9));
    let mut b = MinimaxSearcher::new("b", SearchConfig::alpha_beta(2).with_seed(9));
    assert_eq!(a.search(&game), b.search(&game));
}

// ============================================================================
// GAME RUNNER TESTS
// ============================================================================

#[test]
fn test_random_game_replays() {
    let mut white = RandomSearcher::new("white", Some(21));
    let mut black = RandomSearcher::new("black", Some(22));
    let outcome = play_game(opening(), &mut white, &mut black, Some(300));

    let replayed = replay(&Tables::shared(), &outcome.moves()).unwrap();
    assert_eq!(replayed.board(), outcome.final_state.board());
    assert_eq!(replayed.credit(), outcome.final_state.credit());
    assert_eq!(replayed.termination(), outcome.final_state.termination());
    if let GameEnd::Finished(termination) = outcome.end {
        assert_eq!(outcome.rewards, termination.rewards());
    }
}

#[test]
fn test_engine_beats_random_from_race() {
    let mut white = MinimaxSearcher::new("ab", SearchConfig::alpha_beta(2).with_seed(1));
    let mut black = RandomSearcher::new("random", Some(1));
    let outcome = play_game(position("f3:R c4:r b4:W"), &mut white, &mut black, None);
    assert!(outcome.white_wins());
}

#[test]
fn test_human_and_engine_share_runner() {
    let mut runner = GameRunner::new(opening(), None);
    let mut human = HumanSearcher::new("me");
    let mut engine = RandomSearcher::new("random", Some(2));

    human.set_action_name(runner.state(), "a1-a2").unwrap();
    runner.play_turn(&mut human);
    runner.play_turn(&mut engine);

    assert_eq!(runner.turns().len(), 2);
    assert_eq!(runner.turns()[0].action, "a1-a2");
    assert_eq!(runner.state().player(), Player::White);
    assert!(human.set_action_name(runner.state(), "a1-a2").is_err());
}

// ============================================================================
// MATCH AND REPLAY TESTS
// ============================================================================

#[test]
fn test_match_between_configs() {
    let a: SearcherConfig = "ab1".parse().unwrap();
    let b: SearcherConfig = "random".parse().unwrap();
    let config = MatchConfig::default().with_games(2).with_max_turns(40);
    let result = play_match(&Tables::shared(), &a, &b, &config).unwrap();

    assert_eq!(result.games_played, 2);
    assert_eq!(result.a_wins + result.b_wins + result.draws, 2);
    assert!(result.games.iter().all(|g| g.outcome.turns.len() <= 40));
    assert!(result.games[0].a_is_white);
    assert!(!result.games[1].a_is_white);
}

#[test]
fn test_replay_rejects_bad_lists() {
    let tables = Tables::shared();
    let moves = parse_moves("a1-a2 # white\nz1-z2\n");
    assert_eq!(
        replay(&tables, &moves).unwrap_err(),
        ReplayError::IllegalMove { index: 1, turn: 2, name: "z1-z2".into() }
    );
}
