//! Game state and move generation

use std::cell::OnceCell;
use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::board::{Direction, HexIndex, HEX_COUNT};
use crate::codec::{CellState, HexCode};
use crate::notation::{action_name, simple_name};
use crate::setup::{BoardSetup, SetupError};
use crate::tables::{Board, Step, Tables};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Credit restored by every capture; reaching zero draws the game
pub const MAX_CREDIT: u8 = 20;

/// Sub-move kinds used in [`Action::move_code`]
pub const CUBE_MOVE: u8 = 0;
pub const STACK_MOVE: u8 = 1;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player color
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    White = 0,
    Black = 1,
}

impl Player {
    pub const ALL: [Player; 2] = [Player::White, Player::Black];

    pub fn opponent(self) -> Self {
        match self {
            Player::White => Player::Black,
            Player::Black => Player::White,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::White => f.write_str("white"),
            Player::Black => f.write_str("black"),
        }
    }
}

/// Outcome for one player of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reward {
    Win,
    Draw,
    Loss,
}

impl Reward {
    pub fn value(self) -> f32 {
        match self {
            Reward::Win => 1.0,
            Reward::Draw => 0.0,
            Reward::Loss => -1.0,
        }
    }
}

/// Why a state is terminal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A fighter of this player stands on one of its goal cells
    Goal(Player),
    /// No capture for [`MAX_CREDIT`] turns
    CreditExhausted,
    /// The player to move has no legal action and loses
    NoActions(Player),
}

impl Termination {
    /// Rewards as (white, black)
    pub fn rewards(self) -> (Reward, Reward) {
        let won_by = |player: Player| match player {
            Player::White => (Reward::Win, Reward::Loss),
            Player::Black => (Reward::Loss, Reward::Win),
        };
        match self {
            Termination::Goal(player) => won_by(player),
            Termination::CreditExhausted => (Reward::Draw, Reward::Draw),
            Termination::NoActions(player) => won_by(player.opponent()),
        }
    }
}

/// A legal action: one or two sub-moves with the resulting board
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    path: [HexIndex; 3],
    len: u8,
    board: Board,
    move_code: u8,
    capture_code: u8,
}

impl Action {
    fn single(src: HexIndex, kind: u8, step: &Step) -> Self {
        Self {
            path: [src, step.dst, step.dst],
            len: 2,
            board: step.board,
            move_code: kind,
            capture_code: step.capture as u8,
        }
    }

    fn double(src: HexIndex, first_kind: u8, first: &Step, second_kind: u8, second: &Step) -> Self {
        Self {
            path: [src, first.dst, second.dst],
            len: 3,
            board: second.board,
            move_code: first_kind + 2 * second_kind,
            capture_code: first.capture as u8 + 2 * second.capture as u8,
        }
    }

    /// Hexes visited: source then the destination of each sub-move
    pub fn path(&self) -> &[HexIndex] {
        &self.path[..self.len as usize]
    }

    /// Board codes after the action
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Bit `i` set when sub-move `i` moved a whole stack
    pub fn move_code(&self) -> u8 {
        self.move_code
    }

    /// Bit `i` set when sub-move `i` captured
    pub fn capture_code(&self) -> u8 {
        self.capture_code
    }

    pub fn sub_move_count(&self) -> usize {
        self.len as usize - 1
    }

    pub fn is_stack_move(&self, sub_move: usize) -> bool {
        self.move_code & (1 << sub_move) != 0
    }

    pub fn captured(&self, sub_move: usize) -> bool {
        self.capture_code & (1 << sub_move) != 0
    }

    pub fn is_capture(&self) -> bool {
        self.capture_code != 0
    }

    pub fn capture_count(&self) -> u32 {
        self.capture_code.count_ones()
    }

    pub fn stack_move_count(&self) -> u32 {
        self.move_code.count_ones()
    }
}

/// Name lookups built from the legal action set
#[derive(Clone, Debug, Default)]
struct ActionNames {
    full: FxHashMap<String, usize>,
    simple: FxHashMap<String, usize>,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Immutable game state (every action yields a new state)
#[derive(Clone)]
pub struct GameState {
    tables: Arc<Tables>,
    board: Board,
    player: Player,
    credit: u8,
    turn: u32,

    // Lazily computed, never shared between states
    actions: OnceCell<Vec<Action>>,
    has_action: OnceCell<bool>,
    termination: OnceCell<Option<Termination>>,
    names: OnceCell<ActionNames>,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Standard starting position, White to move
    pub fn new(tables: Arc<Tables>) -> Self {
        let setup = BoardSetup::standard(&tables.geometry);
        Self::from_setup(tables, &setup)
    }

    /// Create from raw board codes
    pub fn from_board(tables: Arc<Tables>, board: Board, player: Player, credit: u8, turn: u32) -> Self {
        Self {
            tables,
            board,
            player,
            credit,
            turn,
            actions: OnceCell::new(),
            has_action: OnceCell::new(),
            termination: OnceCell::new(),
            names: OnceCell::new(),
        }
    }

    /// Create from a validated setup
    pub fn from_setup(tables: Arc<Tables>, setup: &BoardSetup) -> Self {
        let board = setup.to_board();
        Self::from_board(tables, board, setup.player, setup.credit, setup.turn)
    }

    /// Parse and validate a setup text, leaving nothing behind on failure
    pub fn from_setup_text(tables: Arc<Tables>, text: &str) -> Result<Self, SetupError> {
        let setup = BoardSetup::parse(&tables.geometry, text)?;
        Ok(Self::from_setup(tables, &setup))
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn tables(&self) -> &Arc<Tables> {
        &self.tables
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Player to move
    pub fn player(&self) -> Player {
        self.player
    }

    pub fn credit(&self) -> u8 {
        self.credit
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn code(&self, hex: HexIndex) -> HexCode {
        self.board[hex as usize]
    }

    pub fn cell(&self, hex: HexIndex) -> CellState {
        CellState::decode(self.code(hex))
    }

    /// Cell by name, `None` for an unknown hex
    pub fn cell_at(&self, name: &str) -> Option<CellState> {
        self.tables.geometry.index_of(name).map(|hex| self.cell(hex))
    }

    /// True for the untouched standard starting position
    pub fn is_standard_opening(&self) -> bool {
        self.turn == 1
            && self.player == Player::White
            && self.credit == MAX_CREDIT
            && self.board == BoardSetup::standard(&self.tables.geometry).to_board()
    }

    // ========================================================================
    // TERMINATION
    // ========================================================================

    pub fn is_terminal(&self) -> bool {
        self.termination().is_some()
    }

    /// Uncached variant, for benchmarks and tests
    pub fn is_terminal_uncached(&self) -> bool {
        self.compute_termination(self.compute_has_action()).is_some()
    }

    /// Reason the game is over, checked White goal, Black goal, credit,
    /// then lack of actions
    pub fn termination(&self) -> Option<Termination> {
        *self
            .termination
            .get_or_init(|| self.compute_termination(self.has_action()))
    }

    /// (white, black) rewards, only for a terminal state
    pub fn rewards(&self) -> Option<(Reward, Reward)> {
        self.termination().map(Termination::rewards)
    }

    pub fn reward_for(&self, player: Player) -> Option<Reward> {
        self.rewards().map(|(white, black)| match player {
            Player::White => white,
            Player::Black => black,
        })
    }

    fn compute_termination(&self, has_action: bool) -> Option<Termination> {
        if self.goal_reached(Player::White) {
            Some(Termination::Goal(Player::White))
        } else if self.goal_reached(Player::Black) {
            Some(Termination::Goal(Player::Black))
        } else if self.credit == 0 {
            Some(Termination::CreditExhausted)
        } else if !has_action {
            Some(Termination::NoActions(self.player))
        } else {
            None
        }
    }

    fn goal_reached(&self, player: Player) -> bool {
        self.tables.geometry.goals(player).iter().any(|&hex| {
            let code = self.code(hex);
            code.is_owned_by(player) && code.has_fighter()
        })
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// All legal actions for the player to move. The order carries no meaning.
    pub fn actions(&self) -> &[Action] {
        self.actions.get_or_init(|| self.generate_actions())
    }

    /// Uncached variant, for benchmarks and tests
    pub fn actions_uncached(&self) -> Vec<Action> {
        self.generate_actions()
    }

    /// Whether at least one action exists, without generating them all
    pub fn has_action(&self) -> bool {
        if let Some(actions) = self.actions.get() {
            return !actions.is_empty();
        }
        *self.has_action.get_or_init(|| self.compute_has_action())
    }

    fn compute_has_action(&self) -> bool {
        let tables = &*self.tables;
        // Every first sub-move is an action on its own
        self.own_cells().any(|src| {
            Direction::ALL.iter().any(|&direction| {
                tables.cube_step(&self.board, src, direction).is_some()
                    || (self.code(src).has_stack()
                        && (tables.stack_step(&self.board, src, direction).is_some()
                            || tables.stack_jump(&self.board, src, direction).is_some()))
            })
        })
    }

    fn own_cells(&self) -> impl Iterator<Item = HexIndex> + '_ {
        (0..HEX_COUNT as HexIndex).filter(move |&hex| self.code(hex).is_owned_by(self.player))
    }

    fn generate_actions(&self) -> Vec<Action> {
        let mut actions = Vec::with_capacity(256);
        for src in self.own_cells() {
            let is_stack = self.code(src).has_stack();
            for direction in Direction::ALL {
                self.generate_cube_moves(src, direction, &mut actions);
                if is_stack {
                    self.generate_stack_moves(src, direction, &mut actions);
                }
            }
        }
        actions
    }

    /// A cube step, then every stack continuation if it built a stack
    fn generate_cube_moves(&self, src: HexIndex, direction: Direction, actions: &mut Vec<Action>) {
        let tables = &*self.tables;
        let first = match tables.cube_step(&self.board, src, direction) {
            Some(step) => step,
            None => return,
        };
        actions.push(Action::single(src, CUBE_MOVE, &first));

        if !first.board[first.dst as usize].has_stack() {
            return;
        }
        for next_direction in Direction::ALL {
            let continuations = [
                tables.stack_step(&first.board, first.dst, next_direction),
                tables.stack_jump(&first.board, first.dst, next_direction),
            ];
            for second in continuations.iter().flatten() {
                actions.push(Action::double(src, CUBE_MOVE, &first, STACK_MOVE, second));
            }
        }
    }

    /// A one- or two-cell stack move, each optionally followed by a cube step
    fn generate_stack_moves(&self, src: HexIndex, direction: Direction, actions: &mut Vec<Action>) {
        let tables = &*self.tables;
        let firsts = [
            tables.stack_step(&self.board, src, direction),
            tables.stack_jump(&self.board, src, direction),
        ];
        for first in firsts.iter().flatten() {
            actions.push(Action::single(src, STACK_MOVE, first));
            for next_direction in Direction::ALL {
                if let Some(second) = tables.cube_step(&first.board, first.dst, next_direction) {
                    actions.push(Action::double(src, STACK_MOVE, first, CUBE_MOVE, &second));
                }
            }
        }
    }

    // ========================================================================
    // APPLY ACTION
    // ========================================================================

    /// Apply a legal action, returning the new state. Panics on a terminal
    /// state or an action outside the legal set.
    pub fn take_action(&self, action: &Action) -> GameState {
        assert!(!self.is_terminal(), "take_action on a terminal state");
        assert!(
            self.actions().contains(action),
            "illegal action {}",
            self.action_name(action)
        );
        self.child(action)
    }

    /// Successor without the legality check; search only feeds actions
    /// generated from this state
    pub(crate) fn child(&self, action: &Action) -> GameState {
        let credit = if action.is_capture() {
            MAX_CREDIT
        } else {
            self.credit.saturating_sub(1)
        };
        GameState::from_board(
            Arc::clone(&self.tables),
            action.board,
            self.player.opponent(),
            credit,
            self.turn + 1,
        )
    }

    // ========================================================================
    // NOTATION
    // ========================================================================

    /// Full name with capture marks, e.g. `b4=c4-d5!`
    pub fn action_name(&self, action: &Action) -> String {
        action_name(&self.tables.geometry, action)
    }

    pub fn action_by_name(&self, name: &str) -> Option<&Action> {
        let index = *self.action_names().full.get(name)?;
        self.actions().get(index)
    }

    pub fn action_by_simple_name(&self, name: &str) -> Option<&Action> {
        let index = *self.action_names().simple.get(name)?;
        self.actions().get(index)
    }

    /// Look a name up with or without capture marks; misplaced marks are
    /// ignored
    pub fn find_action(&self, name: &str) -> Option<&Action> {
        self.action_by_name(name)
            .or_else(|| self.action_by_simple_name(&simple_name(name)))
    }

    fn action_names(&self) -> &ActionNames {
        self.names.get_or_init(|| {
            let mut names = ActionNames::default();
            for (i, action) in self.actions().iter().enumerate() {
                let full = self.action_name(action);
                names.simple.insert(simple_name(&full), i);
                names.full.insert(full, i);
            }
            names
        })
    }
}

impl fmt::Debug for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameState")
            .field("player", &self.player)
            .field("credit", &self.credit)
            .field("turn", &self.turn)
            .field("setup", &BoardSetup::from_state(self).to_text(&self.tables.geometry))
            .finish()
    }
}

impl fmt::Display for GameState {
    /// Rows from Black's edge down to White's edge, short rows indented
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let geometry = &self.tables.geometry;
        let letters: Vec<char> = crate::board::Geometry::row_letters().collect();
        for &letter in letters.iter().rev() {
            let cells: Vec<HexIndex> = geometry.row(letter).collect();
            let indent = if cells.len() % 2 == 0 { "  " } else { "" };
            write!(f, "{} {}", letter, indent)?;
            for hex in cells {
                write!(f, "{:<4}", self.cell(hex).to_string())?;
            }
            writeln!(f)?;
        }
        write!(f, "{} to move, turn {}, credit {}", self.player, self.turn, self.credit)
    }
}

// ============================================================================
// TESTS
// ============================================================================
