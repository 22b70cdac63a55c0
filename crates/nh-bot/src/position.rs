//! Map coordinates

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{COLNO, ROWNO};

/// A cell on the map, addressed by row and column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i16,
    pub col: i16,
}

impl Position {
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    /// Build from an array index
    pub const fn from_index((row, col): (usize, usize)) -> Self {
        Self::new(row as i16, col as i16)
    }

    /// Array index of this cell; only meaningful when `in_bounds`
    pub const fn index(&self) -> (usize, usize) {
        (self.row as usize, self.col as usize)
    }

    /// Check that the cell lies on the map
    pub const fn in_bounds(&self) -> bool {
        self.row >= 0 && (self.row as usize) < ROWNO && self.col >= 0 && (self.col as usize) < COLNO
    }

    pub const fn offset(&self, drow: i8, dcol: i8) -> Self {
        Self::new(self.row + drow as i16, self.col + dcol as i16)
    }

    /// Chebyshev distance (king moves)
    pub const fn chebyshev(&self, other: &Position) -> i16 {
        let dr = (self.row - other.row).abs();
        let dc = (self.col - other.col).abs();
        if dr > dc { dr } else { dc }
    }

    /// Check if adjacent (including diagonals)
    pub const fn is_adjacent(&self, other: &Position) -> bool {
        self.chebyshev(other) == 1
    }

    /// Check if adjacent along a row or column
    pub const fn is_orthogonal_to(&self, other: &Position) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }

    /// Iterate over every cell of the map in row-major order
    pub fn all() -> impl Iterator<Item = Position> {
        (0..ROWNO).flat_map(|row| (0..COLNO).map(move |col| Position::from_index((row, col))))
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}
