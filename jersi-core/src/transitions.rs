//! Precomputed transition tables
//!
//! The movement, stacking and capture rules are evaluated once for every
//! combination of valid cell codes, so move generation only does array
//! lookups. Three tables exist:
//!
//! - cube path 1: the top (or only) cube of a cell steps onto a neighbour
//! - stack path 1: a whole stack steps onto a neighbour
//! - stack path 2: a whole stack moves two cells in a line over an empty cell
//!
//! Two-cell keys are `CODE_BASE * dst + src`, three-cell keys are
//! `CODE_BASE² * dst + CODE_BASE * mid + src`. A `None` entry is an illegal
//! transition.

use crate::codec::{CellState, HexCode, CODE_BASE};

/// Result of a two-cell transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub src: HexCode,
    pub dst: HexCode,
    pub capture: bool,
}

/// Result of a three-cell transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LongTransition {
    pub src: HexCode,
    pub mid: HexCode,
    pub dst: HexCode,
    pub capture: bool,
}

/// Key of a two-cell path
#[inline]
pub const fn path_key2(src: HexCode, dst: HexCode) -> usize {
    CODE_BASE * dst.index() + src.index()
}

/// Key of a three-cell path
#[inline]
pub const fn path_key3(src: HexCode, mid: HexCode, dst: HexCode) -> usize {
    CODE_BASE * CODE_BASE * dst.index() + CODE_BASE * mid.index() + src.index()
}

/// Inverse of [`path_key3`], returning `[src, mid, dst]`. Panics if a
/// component is not a valid code.
pub fn unpack_path_key3(key: usize) -> [HexCode; 3] {
    let component = |raw: usize| {
        HexCode::from_raw(raw as u8)
            .unwrap_or_else(|| panic!("path key {} holds malformed code {}", key, raw))
    };
    [
        component(key % CODE_BASE),
        component((key / CODE_BASE) % CODE_BASE),
        component(key / (CODE_BASE * CODE_BASE)),
    ]
}

/// The three transition tables
#[derive(Clone)]
pub struct TransitionTables {
    cube_path1: Vec<Option<Transition>>,
    stack_path1: Vec<Option<Transition>>,
    stack_path2: Vec<Option<LongTransition>>,
}

impl TransitionTables {
    /// Enumerate every pair (and triple) of valid cell states
    pub fn build() -> Self {
        let mut cube_path1 = vec![None; CODE_BASE * CODE_BASE];
        let mut stack_path1 = vec![None; CODE_BASE * CODE_BASE];
        let mut stack_path2 = vec![None; CODE_BASE * CODE_BASE * CODE_BASE];

        for src in CellState::all() {
            for dst in CellState::all() {
                let key = path_key2(src.encode(), dst.encode());
                cube_path1[key] = cube_step(src, dst).map(to_transition);
                stack_path1[key] = stack_step(src, dst).map(to_transition);

                // The middle cell must be empty before and after the move
                let mid = CellState::Empty;
                if let Some((new_src, new_dst, capture)) = stack_step(src, dst) {
                    let key = path_key3(src.encode(), mid.encode(), dst.encode());
                    stack_path2[key] = Some(LongTransition {
                        src: new_src.encode(),
                        mid: mid.encode(),
                        dst: new_dst.encode(),
                        capture,
                    });
                }
            }
        }

        Self {
            cube_path1,
            stack_path1,
            stack_path2,
        }
    }

    #[inline]
    pub fn cube_path1(&self, src: HexCode, dst: HexCode) -> Option<Transition> {
        self.cube_path1[path_key2(src, dst)]
    }

    #[inline]
    pub fn stack_path1(&self, src: HexCode, dst: HexCode) -> Option<Transition> {
        self.stack_path1[path_key2(src, dst)]
    }

    #[inline]
    pub fn stack_path2(&self, src: HexCode, mid: HexCode, dst: HexCode) -> Option<LongTransition> {
        self.stack_path2[path_key3(src, mid, dst)]
    }
}

fn to_transition((src, dst, capture): (CellState, CellState, bool)) -> Transition {
    Transition {
        src: src.encode(),
        dst: dst.encode(),
        capture,
    }
}

/// Move the exposed cube of `src` onto `dst`
fn cube_step(src: CellState, dst: CellState) -> Option<(CellState, CellState, bool)> {
    let (owner, mover, remaining) = match src {
        CellState::Empty => return None,
        CellState::Single { owner, cube } => (owner, cube, CellState::Empty),
        CellState::Stack { owner, bottom, top } => (owner, top, CellState::Single { owner, cube: bottom }),
    };
    let landed = CellState::Single { owner, cube: mover };

    match dst {
        CellState::Empty => Some((remaining, landed, false)),
        CellState::Single { owner: other, cube } if other == owner => {
            let merged = CellState::Stack { owner, bottom: cube, top: mover };
            merged.is_valid().then_some((remaining, merged, false))
        }
        CellState::Stack { owner: other, .. } if other == owner => None,
        CellState::Single { cube: defender, .. } | CellState::Stack { top: defender, .. } => {
            mover.beats(defender).then_some((remaining, landed, true))
        }
    }
}

/// Move the whole stack of `src` onto `dst`
fn stack_step(src: CellState, dst: CellState) -> Option<(CellState, CellState, bool)> {
    let (owner, top) = match src {
        CellState::Stack { owner, top, .. } => (owner, top),
        _ => return None,
    };

    match dst {
        CellState::Empty => Some((CellState::Empty, src, false)),
        _ if dst.owner() == Some(owner) => None,
        CellState::Single { cube: defender, .. } | CellState::Stack { top: defender, .. } => {
            top.beats(defender).then_some((CellState::Empty, src, true))
        }
    }
}
