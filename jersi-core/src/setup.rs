//! BoardSetup - sparse cube placement and its text form
//!
//! A setup text is a whitespace separated list of `<hex>:<cubes>` entries,
//! where `<cubes>` is one letter for a single cube or two letters (bottom,
//! then top) for a stack. Upper case letters are White, lower case Black:
//!
//! ```text
//! b4:WW d4:R e5:sp turn:black credit:12 move:31
//! ```
//!
//! `turn:` names the side to move; `credit:` and `move:` (the turn counter)
//! default to a fresh game.

use std::path::Path;

use anyhow::Context;

use crate::board::{Geometry, HexIndex, HEX_COUNT};
use crate::codec::CellState;
use crate::game::{GameState, Player, MAX_CREDIT};
use crate::pieces::Cube;
use crate::tables::Board;

/// Standard White army; Black holds the point reflection
const WHITE_LAYOUT: [(&str, &str); 13] = [
    ("a1", "P"),
    ("a2", "R"),
    ("a3", "S"),
    ("a4", "P"),
    ("a5", "R"),
    ("a6", "S"),
    ("b1", "S"),
    ("b2", "P"),
    ("b3", "R"),
    ("b4", "WW"),
    ("b5", "S"),
    ("b6", "P"),
    ("b7", "R"),
];

/// Why a setup was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("unknown hexagon '{0}'")]
    UnknownHex(String),
    #[error("hexagon '{0}' is set more than once")]
    DuplicateHex(String),
    #[error("malformed entry '{0}', expected <hex>:<cubes>")]
    MalformedEntry(String),
    #[error("unknown cube letter '{0}', expected one of RPSW or rpsw")]
    UnknownCube(char),
    #[error("stack on '{0}' mixes White and Black cubes")]
    MixedOwners(String),
    #[error("stack on '{0}' puts a wise cube on a fighter")]
    WiseOnFighter(String),
    #[error("{player} has {count} {cube} cubes, at most {max} allowed")]
    TooManyCubes {
        player: Player,
        cube: Cube,
        count: usize,
        max: usize,
    },
    #[error("invalid credit '{0}', expected 0..={max}", max = MAX_CREDIT)]
    InvalidCredit(String),
    #[error("invalid turn '{0}', expected white or black")]
    InvalidTurn(String),
    #[error("invalid move number '{0}', expected a number from 1")]
    InvalidMoveNumber(String),
}

/// A validated cube placement plus the side to move
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardSetup {
    cells: [CellState; HEX_COUNT],
    pub player: Player,
    pub credit: u8,
    pub turn: u32,
}

impl Default for BoardSetup {
    fn default() -> Self {
        Self {
            cells: [CellState::Empty; HEX_COUNT],
            player: Player::White,
            credit: MAX_CREDIT,
            turn: 1,
        }
    }
}

impl BoardSetup {
    /// Empty board, White to move
    pub fn empty() -> Self {
        Self::default()
    }

    /// Standard starting position
    pub fn standard(geometry: &Geometry) -> Self {
        let mut setup = Self::empty();
        for (name, cubes) in WHITE_LAYOUT {
            let white = geometry
                .index_of(name)
                .unwrap_or_else(|| panic!("standard layout names unknown hex {}", name));
            let black = geometry
                .index_of_hex(geometry.hex(white).mirrored())
                .unwrap_or_else(|| panic!("mirror of {} is off the board", name));
            let cell = parse_cell(name, cubes, cubes)
                .unwrap_or_else(|e| panic!("bad standard layout entry: {}", e));
            setup.cells[white as usize] = cell;
            setup.cells[black as usize] = recolor(cell, Player::Black);
        }
        setup
    }

    /// Capture the position of a game state
    pub fn from_state(state: &GameState) -> Self {
        let mut setup = Self {
            player: state.player(),
            credit: state.credit(),
            turn: state.turn(),
            ..Self::default()
        };
        for hex in 0..HEX_COUNT {
            setup.cells[hex] = state.cell(hex as HexIndex);
        }
        setup
    }

    /// Parse and validate a setup text
    pub fn parse(geometry: &Geometry, text: &str) -> Result<Self, SetupError> {
        let mut setup = Self::empty();
        let mut seen = [false; HEX_COUNT];

        for entry in text.split_whitespace() {
            let (key, value) = entry
                .split_once(':')
                .filter(|(key, value)| !key.is_empty() && !value.is_empty())
                .ok_or_else(|| SetupError::MalformedEntry(entry.to_string()))?;

            match key {
                "turn" => {
                    setup.player = match value {
                        "white" => Player::White,
                        "black" => Player::Black,
                        _ => return Err(SetupError::InvalidTurn(value.to_string())),
                    };
                }
                "credit" => {
                    setup.credit = value
                        .parse::<u8>()
                        .ok()
                        .filter(|&credit| credit <= MAX_CREDIT)
                        .ok_or_else(|| SetupError::InvalidCredit(value.to_string()))?;
                }
                "move" => {
                    setup.turn = value
                        .parse::<u32>()
                        .ok()
                        .filter(|&turn| turn >= 1)
                        .ok_or_else(|| SetupError::InvalidMoveNumber(value.to_string()))?;
                }
                name => {
                    let hex = geometry
                        .index_of(name)
                        .ok_or_else(|| SetupError::UnknownHex(name.to_string()))?;
                    if seen[hex as usize] {
                        return Err(SetupError::DuplicateHex(name.to_string()));
                    }
                    seen[hex as usize] = true;
                    setup.place(geometry, hex, parse_cell(name, value, entry)?)?;
                }
            }
        }

        setup.validate()?;
        Ok(setup)
    }

    /// Parse a setup text, reporting the outcome as a flag and a message
    /// suitable for an interactive prompt
    pub fn check(geometry: &Geometry, text: &str) -> (bool, String) {
        match Self::parse(geometry, text) {
            Ok(setup) => (true, format!("setup ok: {} cubes, {} to move", setup.cube_count(), setup.player)),
            Err(e) => (false, e.to_string()),
        }
    }

    /// Load a setup text file
    pub fn load(geometry: &Geometry, path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading setup {}", path.display()))?;
        Self::parse(geometry, &content).with_context(|| format!("parsing setup {}", path.display()))
    }

    /// Enforce the per-side cube limits
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.credit > MAX_CREDIT {
            return Err(SetupError::InvalidCredit(self.credit.to_string()));
        }
        for player in Player::ALL {
            for cube in Cube::ALL {
                let count = self
                    .cells
                    .iter()
                    .filter(|cell| cell.owner() == Some(player))
                    .flat_map(|cell| cell.encode().cubes())
                    .filter(|&c| c == cube)
                    .count();
                if count > cube.max_count() {
                    return Err(SetupError::TooManyCubes {
                        player,
                        cube,
                        count,
                        max: cube.max_count(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn cell(&self, hex: HexIndex) -> CellState {
        self.cells[hex as usize]
    }

    /// Place (or clear) one cell; stacks must be legal
    pub fn place(&mut self, geometry: &Geometry, hex: HexIndex, cell: CellState) -> Result<(), SetupError> {
        if !cell.is_valid() {
            return Err(SetupError::WiseOnFighter(geometry.name(hex).to_string()));
        }
        self.cells[hex as usize] = cell;
        Ok(())
    }

    pub fn cube_count(&self) -> usize {
        self.cells.iter().map(|cell| cell.encode().cube_count() as usize).sum()
    }

    /// Encode into board codes
    pub fn to_board(&self) -> Board {
        let mut board = [Default::default(); HEX_COUNT];
        for (code, cell) in board.iter_mut().zip(self.cells.iter()) {
            *code = cell.encode();
        }
        board
    }

    /// Render in the text form accepted by [`BoardSetup::parse`]
    pub fn to_text(&self, geometry: &Geometry) -> String {
        let mut entries: Vec<String> = self
            .cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| **cell != CellState::Empty)
            .map(|(hex, cell)| format!("{}:{}", geometry.name(hex as HexIndex), cell))
            .collect();
        if self.player == Player::Black {
            entries.push("turn:black".to_string());
        }
        if self.credit != MAX_CREDIT {
            entries.push(format!("credit:{}", self.credit));
        }
        if self.turn != 1 {
            entries.push(format!("move:{}", self.turn));
        }
        entries.join(" ")
    }
}

fn recolor(cell: CellState, owner: Player) -> CellState {
    match cell {
        CellState::Empty => CellState::Empty,
        CellState::Single { cube, .. } => CellState::Single { owner, cube },
        CellState::Stack { bottom, top, .. } => CellState::Stack { owner, bottom, top },
    }
}

fn parse_cell(name: &str, value: &str, entry: &str) -> Result<CellState, SetupError> {
    let mut cubes = Vec::with_capacity(2);
    for c in value.chars() {
        cubes.push(Cube::from_letter(c).ok_or(SetupError::UnknownCube(c))?);
    }
    match cubes.as_slice() {
        [(cube, owner)] => Ok(CellState::Single { owner: *owner, cube: *cube }),
        [(bottom, owner), (top, top_owner)] => {
            if owner != top_owner {
                return Err(SetupError::MixedOwners(name.to_string()));
            }
            let stack = CellState::Stack { owner: *owner, bottom: *bottom, top: *top };
            if !stack.is_valid() {
                return Err(SetupError::WiseOnFighter(name.to_string()));
            }
            Ok(stack)
        }
        _ => Err(SetupError::MalformedEntry(entry.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::Tables;
    use std::sync::Arc;

    fn geometry() -> Geometry {
        Geometry::build()
    }

    #[test]
    fn test_standard_setup() {
        let geometry = geometry();
        let setup = BoardSetup::standard(&geometry);
        assert_eq!(setup.cube_count(), 28);
        assert!(setup.validate().is_ok());

        let at = |name: &str| setup.cell(geometry.index_of(name).unwrap());
        assert_eq!(at("a2"), CellState::Single { owner: Player::White, cube: Cube::Rock });
        assert_eq!(at("g5"), CellState::Single { owner: Player::Black, cube: Cube::Rock });
        assert_eq!(at("g6"), CellState::Single { owner: Player::Black, cube: Cube::Paper });
        assert_eq!(at("f7"), CellState::Single { owner: Player::Black, cube: Cube::Scissors });
        assert_eq!(
            at("f4"),
            CellState::Stack { owner: Player::Black, bottom: Cube::Wise, top: Cube::Wise }
        );
        assert_eq!(at("d4"), CellState::Empty);
    }

    #[test]
    fn test_text_round_trip() {
        let geometry = geometry();
        let setup = BoardSetup::standard(&geometry);
        let parsed = BoardSetup::parse(&geometry, &setup.to_text(&geometry)).unwrap();
        assert_eq!(parsed, setup);

        let text = "b4:WW d4:R e5:sp turn:black credit:12 move:31";
        let setup = BoardSetup::parse(&geometry, text).unwrap();
        assert_eq!(setup.player, Player::Black);
        assert_eq!(setup.credit, 12);
        assert_eq!(setup.turn, 31);
        assert_eq!(setup.to_text(&geometry), text);
    }

    #[test]
    fn test_state_round_trip_keeps_turn() {
        let tables = Tables::shared();
        let mut state = GameState::new(Arc::clone(&tables));
        for name in ["a1-a2", "g6-g5", "b1-c1"] {
            let action = state.action_by_name(name).unwrap().clone();
            state = state.take_action(&action);
        }
        let text = BoardSetup::from_state(&state).to_text(&tables.geometry);
        let back = GameState::from_setup_text(Arc::clone(&tables), &text).unwrap();

        assert_eq!(back.turn(), 4);
        assert_eq!(back.player(), Player::Black);
        assert_eq!(back.credit(), state.credit());
        assert_eq!(back.board(), state.board());
    }

    #[test]
    fn test_setup_errors() {
        let geometry = geometry();
        let err = |text: &str| BoardSetup::parse(&geometry, text).unwrap_err();

        assert_eq!(err("z9:R"), SetupError::UnknownHex("z9".into()));
        assert_eq!(err("a1:R a1:P"), SetupError::DuplicateHex("a1".into()));
        assert_eq!(err("a1R"), SetupError::MalformedEntry("a1R".into()));
        assert_eq!(err("a1:RPS"), SetupError::MalformedEntry("a1:RPS".into()));
        assert_eq!(err("a1:X"), SetupError::UnknownCube('X'));
        assert_eq!(err("a1:Rp"), SetupError::MixedOwners("a1".into()));
        assert_eq!(err("a1:RW"), SetupError::WiseOnFighter("a1".into()));
        assert_eq!(err("credit:21"), SetupError::InvalidCredit("21".into()));
        assert_eq!(err("turn:red"), SetupError::InvalidTurn("red".into()));
        assert_eq!(err("move:0"), SetupError::InvalidMoveNumber("0".into()));
        assert_eq!(err("move:soon"), SetupError::InvalidMoveNumber("soon".into()));
        assert_eq!(
            err("a1:W a2:W a3:W"),
            SetupError::TooManyCubes { player: Player::White, cube: Cube::Wise, count: 3, max: 2 }
        );
    }

    #[test]
    fn test_check_reports_messages() {
        let geometry = geometry();
        let (ok, message) = BoardSetup::check(&geometry, "d4:R d5:r");
        assert!(ok);
        assert!(message.contains("2 cubes"));

        let (ok, message) = BoardSetup::check(&geometry, "a1:r a2:r a3:r a4:r a5:r");
        assert!(!ok);
        assert!(message.contains("at most 4"));
    }

    #[test]
    fn test_place() {
        let geometry = geometry();
        let mut setup = BoardSetup::empty();
        let d4 = geometry.index_of("d4").unwrap();
        let bad = CellState::Stack { owner: Player::White, bottom: Cube::Rock, top: Cube::Wise };
        assert!(setup.place(&geometry, d4, bad).is_err());
        assert_eq!(setup.cell(d4), CellState::Empty);

        let good = CellState::Stack { owner: Player::White, bottom: Cube::Wise, top: Cube::Rock };
        setup.place(&geometry, d4, good).unwrap();
        assert_eq!(setup.to_board()[d4 as usize], good.encode());
    }
}
