//! Discrete actions submitted to the game backend

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Control-key code, as `C(c)` in the game sources
const fn ctrl(c: u8) -> u8 {
    c & 0x1f
}

/// Compass directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Direction {
    North,
    South,
    East,
    West,
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl Direction {
    /// Get the (row, column) delta for this direction
    pub const fn delta(&self) -> (i8, i8) {
        match self {
            Direction::North => (-1, 0),
            Direction::South => (1, 0),
            Direction::East => (0, 1),
            Direction::West => (0, -1),
            Direction::NorthEast => (-1, 1),
            Direction::NorthWest => (-1, -1),
            Direction::SouthEast => (1, 1),
            Direction::SouthWest => (1, -1),
        }
    }

    /// Get direction from (row, column) deltas, or None if they are not a
    /// single compass step
    pub const fn from_delta(drow: i8, dcol: i8) -> Option<Self> {
        match (drow, dcol) {
            (-1, 0) => Some(Direction::North),
            (1, 0) => Some(Direction::South),
            (0, 1) => Some(Direction::East),
            (0, -1) => Some(Direction::West),
            (-1, 1) => Some(Direction::NorthEast),
            (-1, -1) => Some(Direction::NorthWest),
            (1, 1) => Some(Direction::SouthEast),
            (1, -1) => Some(Direction::SouthWest),
            _ => None,
        }
    }

    /// Check if this is a diagonal direction
    pub const fn is_diagonal(&self) -> bool {
        let (dr, dc) = self.delta();
        dr != 0 && dc != 0
    }

    /// Key typed for this direction (vi-keys)
    pub const fn key(&self) -> u8 {
        match self {
            Direction::North => b'k',
            Direction::South => b'j',
            Direction::East => b'l',
            Direction::West => b'h',
            Direction::NorthEast => b'u',
            Direction::NorthWest => b'y',
            Direction::SouthEast => b'n',
            Direction::SouthWest => b'b',
        }
    }
}

/// One discrete action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Step (or attack, or open a door) in a direction
    Move(Direction),
    /// Climb up stairs
    Up,
    /// Descend stairs
    Down,
    /// Kick; the backend then asks for a direction
    Kick,
    /// Search adjacent squares for hidden things
    Search,
    /// Dismiss a pending `--More--`
    Escape,
    /// Answer `y` to a yes/no question
    Confirm,
}

impl Action {
    /// Key code the backend receives
    pub const fn key(&self) -> u8 {
        match self {
            Action::Move(dir) => dir.key(),
            Action::Up => b'<',
            Action::Down => b'>',
            Action::Kick => ctrl(b'd'),
            Action::Search => b's',
            Action::Escape => 0x1b,
            Action::Confirm => b'y',
        }
    }
}

impl From<Direction> for Action {
    fn from(dir: Direction) -> Self {
        Action::Move(dir)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Move(dir) => write!(f, "move {dir}"),
            Action::Up => f.write_str("up"),
            Action::Down => f.write_str("down"),
            Action::Kick => f.write_str("kick"),
            Action::Search => f.write_str("search"),
            Action::Escape => f.write_str("escape"),
            Action::Confirm => f.write_str("confirm"),
        }
    }
}
