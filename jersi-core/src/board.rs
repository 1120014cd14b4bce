//! Hex board geometry with axial coordinates
//!
//! The board has seven rows `a`..`g` of 6,7,6,7,6,7,6 cells. Every lookup the
//! engine needs at move-generation time (neighbours one and two steps away,
//! pairwise distances, distance to goal) is precomputed once by
//! [`Geometry::build`] and indexed by dense [`HexIndex`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::game::Player;

/// Dense hexagon index, assigned by sorting hex names
pub type HexIndex = u8;

/// Number of cells on the board
pub const HEX_COUNT: usize = 45;

/// Row letter, axial `u` of the first cell, and cell count, from White's edge
/// to Black's edge. Row `d` is the centre row (`v = 0`).
const ROWS: [(char, i8, usize); 7] = [
    ('a', -1, 6),
    ('b', -2, 7),
    ('c', -2, 6),
    ('d', -3, 7),
    ('e', -3, 6),
    ('f', -4, 7),
    ('g', -4, 6),
];

/// Row reached by White to win
const WHITE_GOAL_ROW: char = 'g';
/// Row reached by Black to win
const BLACK_GOAL_ROW: char = 'a';

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Hex {
    pub u: i8,
    pub v: i8,
}

impl Hex {
    pub const fn new(u: i8, v: i8) -> Self {
        Self { u, v }
    }

    /// Distance from the centre cell `d4`
    pub fn distance_to_center(&self) -> u8 {
        self.distance_to(Hex::new(0, 0))
    }

    /// Distance between two hexes
    pub fn distance_to(&self, other: Hex) -> u8 {
        let du = (self.u - other.u).abs();
        let dv = (self.v - other.v).abs();
        let ds = ((self.u + self.v) - (other.u + other.v)).abs();
        ((du + dv + ds) / 2) as u8
    }

    /// Neighbouring coordinate in a direction (may be off-board)
    pub fn neighbor(&self, direction: Direction) -> Hex {
        let (du, dv) = direction.offset();
        Hex::new(self.u + du, self.v + dv)
    }

    /// Point reflection through the board centre
    pub fn mirrored(&self) -> Hex {
        Hex::new(-self.u, -self.v)
    }
}

/// The six directions around a hex. North points from White's edge to
/// Black's edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    East = 0,
    NorthEast = 1,
    NorthWest = 2,
    West = 3,
    SouthWest = 4,
    SouthEast = 5,
}

/// Direction vectors in axial coordinates (du, dv), indexed by `Direction`
pub const DIRECTIONS: [(i8, i8); 6] = [
    (1, 0),   // E
    (0, 1),   // NE
    (-1, 1),  // NW
    (-1, 0),  // W
    (0, -1),  // SW
    (1, -1),  // SE
];

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::East,
        Direction::NorthEast,
        Direction::NorthWest,
        Direction::West,
        Direction::SouthWest,
        Direction::SouthEast,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn offset(self) -> (i8, i8) {
        DIRECTIONS[self.index()]
    }

    pub fn opposite(self) -> Direction {
        Direction::ALL[(self.index() + 3) % 6]
    }
}

/// Precomputed board geometry
#[derive(Clone, Debug)]
pub struct Geometry {
    names: Vec<String>,
    hexes: Vec<Hex>,
    by_name: FxHashMap<String, HexIndex>,
    by_hex: FxHashMap<Hex, HexIndex>,
    next: Vec<[Option<HexIndex>; 6]>,
    next_next: Vec<[Option<HexIndex>; 6]>,
    distance: Vec<[u8; HEX_COUNT]>,
    goal_distance: [[u8; HEX_COUNT]; 2],
    center_distance: [u8; HEX_COUNT],
    goals: [Vec<HexIndex>; 2],
}

impl Geometry {
    /// Build every geometry table from the hardcoded row layout
    pub fn build() -> Self {
        let mut cells: Vec<(String, Hex)> = Vec::with_capacity(HEX_COUNT);
        for (row, &(letter, first_u, len)) in ROWS.iter().enumerate() {
            let v = row as i8 - 3;
            for col in 0..len {
                cells.push((format!("{}{}", letter, col + 1), Hex::new(first_u + col as i8, v)));
            }
        }
        cells.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(cells.len(), HEX_COUNT, "row layout must describe {} cells", HEX_COUNT);

        let names: Vec<String> = cells.iter().map(|(name, _)| name.clone()).collect();
        let hexes: Vec<Hex> = cells.iter().map(|&(_, hex)| hex).collect();

        let by_name: FxHashMap<String, HexIndex> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i as HexIndex))
            .collect();
        let by_hex: FxHashMap<Hex, HexIndex> = hexes
            .iter()
            .enumerate()
            .map(|(i, &hex)| (hex, i as HexIndex))
            .collect();

        let mut next = vec![[None; 6]; HEX_COUNT];
        let mut next_next = vec![[None; 6]; HEX_COUNT];
        for (i, hex) in hexes.iter().enumerate() {
            for direction in Direction::ALL {
                let one = hex.neighbor(direction);
                let two = one.neighbor(direction);
                next[i][direction.index()] = by_hex.get(&one).copied();
                next_next[i][direction.index()] = by_hex.get(&two).copied();
            }
        }

        let mut distance = vec![[0u8; HEX_COUNT]; HEX_COUNT];
        for (i, a) in hexes.iter().enumerate() {
            for (j, b) in hexes.iter().enumerate() {
                distance[i][j] = a.distance_to(*b);
            }
        }

        let row_cells = |letter: char| -> Vec<HexIndex> {
            names
                .iter()
                .enumerate()
                .filter(|(_, name)| name.starts_with(letter))
                .map(|(i, _)| i as HexIndex)
                .collect()
        };
        let goals = [row_cells(WHITE_GOAL_ROW), row_cells(BLACK_GOAL_ROW)];

        let mut goal_distance = [[0u8; HEX_COUNT]; 2];
        for player in Player::ALL {
            for (i, row) in distance.iter().enumerate() {
                goal_distance[player.index()][i] = goals[player.index()]
                    .iter()
                    .map(|&g| row[g as usize])
                    .min()
                    .unwrap_or(u8::MAX);
            }
        }

        let mut center_distance = [0u8; HEX_COUNT];
        for (i, hex) in hexes.iter().enumerate() {
            center_distance[i] = hex.distance_to_center();
        }

        Self {
            names,
            hexes,
            by_name,
            by_hex,
            next,
            next_next,
            distance,
            goal_distance,
            center_distance,
            goals,
        }
    }

    /// Hex name such as `"d4"`
    pub fn name(&self, hex: HexIndex) -> &str {
        &self.names[hex as usize]
    }

    pub fn hex(&self, hex: HexIndex) -> Hex {
        self.hexes[hex as usize]
    }

    pub fn index_of(&self, name: &str) -> Option<HexIndex> {
        self.by_name.get(name).copied()
    }

    pub fn index_of_hex(&self, hex: Hex) -> Option<HexIndex> {
        self.by_hex.get(&hex).copied()
    }

    /// Cell one step away, `None` when off-board
    #[inline]
    pub fn next(&self, hex: HexIndex, direction: Direction) -> Option<HexIndex> {
        self.next[hex as usize][direction.index()]
    }

    /// Cell two steps away in a straight line, `None` when off-board
    #[inline]
    pub fn next_next(&self, hex: HexIndex, direction: Direction) -> Option<HexIndex> {
        self.next_next[hex as usize][direction.index()]
    }

    #[inline]
    pub fn distance(&self, a: HexIndex, b: HexIndex) -> u8 {
        self.distance[a as usize][b as usize]
    }

    /// Distance from a cell to the nearest goal cell of `player`
    #[inline]
    pub fn goal_distance(&self, player: Player, hex: HexIndex) -> u8 {
        self.goal_distance[player.index()][hex as usize]
    }

    #[inline]
    pub fn center_distance(&self, hex: HexIndex) -> u8 {
        self.center_distance[hex as usize]
    }

    /// The six cells `player` must reach with a fighter
    pub fn goals(&self, player: Player) -> &[HexIndex] {
        &self.goals[player.index()]
    }

    /// Indices of a row, from column 1 upward
    pub fn row(&self, letter: char) -> impl Iterator<Item = HexIndex> + '_ {
        self.names
            .iter()
            .enumerate()
            .filter(move |(_, name)| name.starts_with(letter))
            .map(|(i, _)| i as HexIndex)
    }

    /// Row letters from White's edge to Black's edge
    pub fn row_letters() -> impl Iterator<Item = char> {
        ROWS.iter().map(|&(letter, _, _)| letter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout() {
        let geometry = Geometry::build();
        assert_eq!(geometry.index_of("a1"), Some(0));
        assert_eq!(geometry.index_of("g6"), Some(44));
        assert_eq!(geometry.index_of("d4").map(|h| geometry.hex(h)), Some(Hex::new(0, 0)));
        assert_eq!(geometry.index_of("h1"), None);
        assert_eq!(geometry.row('b').count(), 7);
        assert_eq!(geometry.row('c').count(), 6);
    }

    #[test]
    fn test_neighbors() {
        let g = Geometry::build();
        let a1 = g.index_of("a1").unwrap();
        let names: Vec<&str> = Direction::ALL
            .iter()
            .filter_map(|&d| g.next(a1, d))
            .map(|h| g.name(h))
            .collect();
        assert_eq!(names, vec!["a2", "b2", "b1"]);

        let b4 = g.index_of("b4").unwrap();
        assert_eq!(g.next(b4, Direction::NorthEast).map(|h| g.name(h)), Some("c4"));
        assert_eq!(g.next(b4, Direction::NorthWest).map(|h| g.name(h)), Some("c3"));
        assert_eq!(g.next_next(b4, Direction::NorthEast).map(|h| g.name(h)), Some("d5"));
        assert_eq!(g.next_next(b4, Direction::NorthWest).map(|h| g.name(h)), Some("d3"));
        assert_eq!(g.next_next(b4, Direction::SouthEast), None);
    }

    #[test]
    fn test_adjacency_is_symmetric() {
        let g = Geometry::build();
        for hex in 0..HEX_COUNT as HexIndex {
            for d in Direction::ALL {
                if let Some(n) = g.next(hex, d) {
                    assert_eq!(g.next(n, d.opposite()), Some(hex));
                    assert_eq!(g.distance(hex, n), 1);
                }
            }
        }
    }

    #[test]
    fn test_distances() {
        let g = Geometry::build();
        let d4 = g.index_of("d4").unwrap();
        let a1 = g.index_of("a1").unwrap();
        let g6 = g.index_of("g6").unwrap();
        assert_eq!(g.center_distance(d4), 0);
        assert_eq!(g.center_distance(a1), 4);
        assert_eq!(g.goal_distance(Player::White, a1), 6);
        assert_eq!(g.goal_distance(Player::White, g6), 0);
        assert_eq!(g.goal_distance(Player::Black, a1), 0);
        assert_eq!(g.goal_distance(Player::Black, d4), 3);
        assert_eq!(g.goals(Player::White).len(), 6);
        assert_eq!(g.goals(Player::Black).len(), 6);
    }
}
