//! Engine tables: geometry plus transitions, built once and shared

use std::sync::{Arc, OnceLock};

use crate::board::{Direction, Geometry, HexIndex, HEX_COUNT};
use crate::codec::HexCode;
use crate::transitions::TransitionTables;

/// One cell code per hexagon index
pub type Board = [HexCode; HEX_COUNT];

/// A resolved sub-move: the board after it, where the mover landed, and
/// whether it captured
#[derive(Clone, Copy, Debug)]
pub struct Step {
    pub board: Board,
    pub dst: HexIndex,
    pub capture: bool,
}

/// Read-only tables shared by every game state and search worker
pub struct Tables {
    pub geometry: Geometry,
    pub transitions: TransitionTables,
}

impl Tables {
    pub fn build() -> Self {
        let geometry = Geometry::build();
        let transitions = TransitionTables::build();
        tracing::debug!("engine tables built");
        Self { geometry, transitions }
    }

    /// Process-wide instance, built on first use
    pub fn shared() -> Arc<Tables> {
        static SHARED: OnceLock<Arc<Tables>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Tables::build())))
    }

    /// Step the exposed cube of `src` one cell in `direction`
    #[inline]
    pub fn cube_step(&self, board: &Board, src: HexIndex, direction: Direction) -> Option<Step> {
        let dst = self.geometry.next(src, direction)?;
        let t = self
            .transitions
            .cube_path1(board[src as usize], board[dst as usize])?;
        let mut next = *board;
        next[src as usize] = t.src;
        next[dst as usize] = t.dst;
        Some(Step { board: next, dst, capture: t.capture })
    }

    /// Step the whole stack on `src` one cell in `direction`
    #[inline]
    pub fn stack_step(&self, board: &Board, src: HexIndex, direction: Direction) -> Option<Step> {
        let dst = self.geometry.next(src, direction)?;
        let t = self
            .transitions
            .stack_path1(board[src as usize], board[dst as usize])?;
        let mut next = *board;
        next[src as usize] = t.src;
        next[dst as usize] = t.dst;
        Some(Step { board: next, dst, capture: t.capture })
    }

    /// Move the whole stack on `src` two cells in `direction`, over an empty cell
    #[inline]
    pub fn stack_jump(&self, board: &Board, src: HexIndex, direction: Direction) -> Option<Step> {
        let mid = self.geometry.next(src, direction)?;
        let dst = self.geometry.next_next(src, direction)?;
        let t = self.transitions.stack_path2(
            board[src as usize],
            board[mid as usize],
            board[dst as usize],
        )?;
        let mut next = *board;
        next[src as usize] = t.src;
        next[mid as usize] = t.mid;
        next[dst as usize] = t.dst;
        Some(Step { board: next, dst, capture: t.capture })
    }
}
