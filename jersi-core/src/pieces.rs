//! Cube kinds and the capture relation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::Player;

/// Maximum number of each fighter kind per side
pub const MAX_FIGHTERS_PER_KIND: usize = 4;
/// Maximum number of wise cubes per side
pub const MAX_WISE: usize = 2;

/// Kind of a cube
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Cube {
    Rock = 0,
    Paper = 1,
    Scissors = 2,
    Wise = 3,
}

impl Cube {
    pub const ALL: [Cube; 4] = [Cube::Rock, Cube::Paper, Cube::Scissors, Cube::Wise];

    /// Decode the two-bit kind field
    pub const fn from_bits(bits: u8) -> Cube {
        match bits & 0b11 {
            0 => Cube::Rock,
            1 => Cube::Paper,
            2 => Cube::Scissors,
            _ => Cube::Wise,
        }
    }

    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Fighters capture and can be captured; wise cubes do neither
    pub const fn is_fighter(self) -> bool {
        !matches!(self, Cube::Wise)
    }

    /// Rock beats scissors, scissors beats paper, paper beats rock
    pub const fn beats(self, other: Cube) -> bool {
        matches!(
            (self, other),
            (Cube::Rock, Cube::Scissors) | (Cube::Scissors, Cube::Paper) | (Cube::Paper, Cube::Rock)
        )
    }

    /// How many cubes of this kind a side may own
    pub const fn max_count(self) -> usize {
        match self {
            Cube::Wise => MAX_WISE,
            _ => MAX_FIGHTERS_PER_KIND,
        }
    }

    /// Setup letter: upper case for White, lower case for Black
    pub fn letter(self, owner: Player) -> char {
        let c = match self {
            Cube::Rock => 'R',
            Cube::Paper => 'P',
            Cube::Scissors => 'S',
            Cube::Wise => 'W',
        };
        match owner {
            Player::White => c,
            Player::Black => c.to_ascii_lowercase(),
        }
    }

    /// Inverse of [`Cube::letter`]
    pub fn from_letter(c: char) -> Option<(Cube, Player)> {
        let owner = if c.is_ascii_uppercase() { Player::White } else { Player::Black };
        let cube = match c.to_ascii_uppercase() {
            'R' => Cube::Rock,
            'P' => Cube::Paper,
            'S' => Cube::Scissors,
            'W' => Cube::Wise,
            _ => return None,
        };
        Some((cube, owner))
    }
}

impl fmt::Display for Cube {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Cube::Rock => "rock",
            Cube::Paper => "paper",
            Cube::Scissors => "scissors",
            Cube::Wise => "wise",
        };
        f.write_str(name)
    }
}
