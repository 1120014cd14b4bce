//! Cell state codec
//!
//! A cell is packed into seven bits:
//!
//! | bits | field |
//! |------|-------|
//! | 0    | not empty |
//! | 1    | has stack |
//! | 2    | owner (0 = White, 1 = Black) |
//! | 3-4  | bottom cube (the only cube when not stacked) |
//! | 5-6  | top cube, only meaningful with bit 1 |
//!
//! The empty cell is always code 0. Board states are plain arrays of these
//! codes, which keeps copying a position cheap.

use std::fmt;

use crate::game::Player;
use crate::pieces::Cube;

/// Size of the code space; table keys are built in this base
pub const CODE_BASE: usize = 128;

const NOT_EMPTY: u8 = 1 << 0;
const HAS_STACK: u8 = 1 << 1;
const OWNER: u8 = 1 << 2;
const BOTTOM_SHIFT: u8 = 3;
const TOP_SHIFT: u8 = 5;
const KIND_MASK: u8 = 0b11;

/// Packed cell contents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexCode(u8);

impl HexCode {
    pub const EMPTY: HexCode = HexCode(0);

    pub const fn raw(self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Wrap a raw code, rejecting bit patterns that are not a valid cell
    pub fn from_raw(raw: u8) -> Option<HexCode> {
        let code = HexCode(raw);
        code.is_valid().then_some(code)
    }

    fn is_valid(self) -> bool {
        let raw = self.0;
        if raw == 0 {
            return true;
        }
        if raw as usize >= CODE_BASE || raw & NOT_EMPTY == 0 {
            return false;
        }
        if raw & HAS_STACK == 0 {
            return (raw >> TOP_SHIFT) & KIND_MASK == 0;
        }
        let bottom = Cube::from_bits(raw >> BOTTOM_SHIFT);
        let top = Cube::from_bits(raw >> TOP_SHIFT);
        bottom == Cube::Wise || top.is_fighter()
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 & NOT_EMPTY == 0
    }

    #[inline]
    pub const fn has_stack(self) -> bool {
        self.0 & HAS_STACK != 0
    }

    #[inline]
    pub fn owner(self) -> Option<Player> {
        if self.is_empty() {
            None
        } else if self.0 & OWNER == 0 {
            Some(Player::White)
        } else {
            Some(Player::Black)
        }
    }

    #[inline]
    pub fn is_owned_by(self, player: Player) -> bool {
        self.owner() == Some(player)
    }

    /// Bottom cube, or the only cube of a single
    #[inline]
    pub fn bottom(self) -> Option<Cube> {
        (!self.is_empty()).then(|| Cube::from_bits(self.0 >> BOTTOM_SHIFT))
    }

    /// Top cube of a stack
    #[inline]
    pub fn top(self) -> Option<Cube> {
        self.has_stack().then(|| Cube::from_bits(self.0 >> TOP_SHIFT))
    }

    /// The exposed cube: the top of a stack, or the only cube
    #[inline]
    pub fn fighting_cube(self) -> Option<Cube> {
        self.top().or_else(|| self.bottom())
    }

    pub fn cube_count(self) -> u8 {
        if self.is_empty() {
            0
        } else if self.has_stack() {
            2
        } else {
            1
        }
    }

    pub fn fighter_count(self) -> u8 {
        self.cubes().filter(|c| c.is_fighter()).count() as u8
    }

    pub fn has_fighter(self) -> bool {
        self.cubes().any(|c| c.is_fighter())
    }

    /// Cubes from bottom to top
    pub fn cubes(self) -> impl Iterator<Item = Cube> {
        self.bottom().into_iter().chain(self.top())
    }
}

/// Unpacked cell contents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellState {
    Empty,
    Single { owner: Player, cube: Cube },
    Stack { owner: Player, bottom: Cube, top: Cube },
}

impl CellState {
    /// A wise cube may only rest on another wise cube
    pub fn is_valid(&self) -> bool {
        match *self {
            CellState::Stack { bottom, top, .. } => bottom == Cube::Wise || top.is_fighter(),
            _ => true,
        }
    }

    pub fn owner(&self) -> Option<Player> {
        match *self {
            CellState::Empty => None,
            CellState::Single { owner, .. } | CellState::Stack { owner, .. } => Some(owner),
        }
    }

    /// Pack into a [`HexCode`]. Panics on an invalid stack.
    pub fn encode(&self) -> HexCode {
        assert!(self.is_valid(), "cannot encode invalid cell state {:?}", self);
        let owner_bit = |owner: Player| if owner == Player::White { 0 } else { OWNER };
        match *self {
            CellState::Empty => HexCode::EMPTY,
            CellState::Single { owner, cube } => {
                HexCode(NOT_EMPTY | owner_bit(owner) | (cube.bits() << BOTTOM_SHIFT))
            }
            CellState::Stack { owner, bottom, top } => HexCode(
                NOT_EMPTY
                    | HAS_STACK
                    | owner_bit(owner)
                    | (bottom.bits() << BOTTOM_SHIFT)
                    | (top.bits() << TOP_SHIFT),
            ),
        }
    }

    /// Unpack a [`HexCode`]. Panics on a malformed code.
    pub fn decode(code: HexCode) -> CellState {
        assert!(code.is_valid(), "malformed cell code {:#09b}", code.raw());
        match (code.owner(), code.bottom(), code.top()) {
            (None, _, _) => CellState::Empty,
            (Some(owner), Some(cube), None) => CellState::Single { owner, cube },
            (Some(owner), Some(bottom), Some(top)) => CellState::Stack { owner, bottom, top },
            (Some(_), None, _) => unreachable!("non-empty code always has a bottom cube"),
        }
    }

    /// Every valid cell state: the empty cell first, then for each owner and
    /// bottom cube the single followed by every permitted stack.
    pub fn all() -> impl Iterator<Item = CellState> {
        std::iter::once(CellState::Empty).chain(Player::ALL.into_iter().flat_map(|owner| {
            Cube::ALL.into_iter().flat_map(move |bottom| {
                std::iter::once(CellState::Single { owner, cube: bottom }).chain(
                    Cube::ALL
                        .into_iter()
                        .filter(move |&top| bottom == Cube::Wise || top.is_fighter())
                        .map(move |top| CellState::Stack { owner, bottom, top }),
                )
            })
        }))
    }
}

impl From<CellState> for HexCode {
    fn from(state: CellState) -> Self {
        state.encode()
    }
}

impl From<HexCode> for CellState {
    fn from(code: HexCode) -> Self {
        CellState::decode(code)
    }
}

impl fmt::Display for CellState {
    /// Setup notation: bottom letter then top letter, `.` when empty
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            CellState::Empty => write!(f, "."),
            CellState::Single { owner, cube } => write!(f, "{}", cube.letter(owner)),
            CellState::Stack { owner, bottom, top } => {
                write!(f, "{}{}", bottom.letter(owner), top.letter(owner))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn random_state(rng: &mut ChaCha8Rng) -> CellState {
        let owner = *Player::ALL.choose(rng).unwrap();
        match rng.gen_range(0..4) {
            0 => CellState::Empty,
            1 => CellState::Single { owner, cube: *Cube::ALL.choose(rng).unwrap() },
            // Wise bottom forces any top to be legal
            2 => CellState::Stack { owner, bottom: Cube::Wise, top: *Cube::ALL.choose(rng).unwrap() },
            _ => CellState::Stack {
                owner,
                bottom: *Cube::ALL.choose(rng).unwrap(),
                top: *Cube::ALL[..3].choose(rng).unwrap(),
            },
        }
    }

    #[test]
    fn test_codec_bijection() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..200 {
            let state = random_state(&mut rng);
            assert_eq!(CellState::decode(state.encode()), state);
        }
    }

    #[test]
    fn test_all_states_coverage() {
        let codes: Vec<HexCode> = CellState::all().map(|s| s.encode()).collect();
        let unique: HashSet<HexCode> = codes.iter().copied().collect();
        assert_eq!(unique.len(), codes.len(), "codes must be unique");
        assert_eq!(codes.iter().min(), Some(&HexCode::EMPTY));
        assert!(codes.len() <= CODE_BASE);
        assert_eq!(codes.len(), 35);
        assert!(CellState::all().all(|s| s.is_valid()));
    }

    #[test]
    fn test_from_raw_matches_all_states() {
        let valid: HashSet<u8> = CellState::all().map(|s| s.encode().raw()).collect();
        for raw in 0..=u8::MAX {
            assert_eq!(HexCode::from_raw(raw).is_some(), valid.contains(&raw), "raw {}", raw);
        }
    }

    #[test]
    fn test_accessors() {
        let code = CellState::Stack { owner: Player::Black, bottom: Cube::Wise, top: Cube::Paper }.encode();
        assert!(code.has_stack());
        assert_eq!(code.owner(), Some(Player::Black));
        assert_eq!(code.bottom(), Some(Cube::Wise));
        assert_eq!(code.top(), Some(Cube::Paper));
        assert_eq!(code.fighting_cube(), Some(Cube::Paper));
        assert_eq!(code.cube_count(), 2);
        assert_eq!(code.fighter_count(), 1);

        let single = CellState::Single { owner: Player::White, cube: Cube::Rock }.encode();
        assert_eq!(single.top(), None);
        assert_eq!(single.fighting_cube(), Some(Cube::Rock));
        assert!(HexCode::EMPTY.is_empty());
        assert_eq!(HexCode::EMPTY.owner(), None);
    }

    #[test]
    #[should_panic]
    fn test_wise_on_fighter_rejected() {
        CellState::Stack { owner: Player::White, bottom: Cube::Rock, top: Cube::Wise }.encode();
    }

    #[test]
    #[should_panic]
    fn test_malformed_code_rejected() {
        // top bits set without the stack flag
        CellState::decode(HexCode(NOT_EMPTY | (1 << TOP_SHIFT)));
    }
}
