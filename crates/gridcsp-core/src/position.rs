//! Grid coordinates.

use std::fmt::{self, Display};

use crate::Direction;

/// A `(row, col)` coordinate.
///
/// Coordinates are signed and zero-based. A position does not have to lie
/// inside a grid: outside clues are addressed by positions one step past the
/// border (for example `(-1, 3)` above the fourth column).
///
/// Positions serialize as a `[row, col]` pair.
///
/// # Examples
///
/// ```
/// use gridcsp_core::{Direction, Position};
///
/// let pos = Position::new(2, 3);
/// assert_eq!(pos.step(Direction::UpLeft), Position::new(1, 2));
/// assert_eq!(pos.to_string(), "r3c4");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(from = "(i32, i32)", into = "(i32, i32)")]
pub struct Position {
    row: i32,
    col: i32,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    #[inline]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the zero-based row.
    #[must_use]
    #[inline]
    pub const fn row(self) -> i32 {
        self.row
    }

    /// Returns the zero-based column.
    #[must_use]
    #[inline]
    pub const fn col(self) -> i32 {
        self.col
    }

    /// Returns the position shifted by `(d_row, d_col)`.
    ///
    /// Coordinates saturate at the `i32` bounds.
    #[must_use]
    #[inline]
    pub const fn offset(self, d_row: i32, d_col: i32) -> Self {
        Self::new(self.row.saturating_add(d_row), self.col.saturating_add(d_col))
    }

    /// Returns the neighboring position one step in `direction`.
    #[must_use]
    #[inline]
    pub const fn step(self, direction: Direction) -> Self {
        let (d_row, d_col) = direction.delta();
        self.offset(d_row, d_col)
    }

    /// Returns `true` if `other` shares an edge with this position.
    #[must_use]
    pub const fn is_orthogonally_adjacent(self, other: Self) -> bool {
        let d_row = self.row.abs_diff(other.row);
        let d_col = self.col.abs_diff(other.col);
        (d_row == 1 && d_col == 0) || (d_row == 0 && d_col == 1)
    }

    /// Returns `true` if `other` touches this position by edge or corner.
    #[must_use]
    pub const fn is_king_adjacent(self, other: Self) -> bool {
        let d_row = self.row.abs_diff(other.row);
        let d_col = self.col.abs_diff(other.col);
        d_row <= 1 && d_col <= 1 && (d_row + d_col) > 0
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}c{}", i64::from(self.row) + 1, i64::from(self.col) + 1)
    }
}

impl From<(i32, i32)> for Position {
    fn from((row, col): (i32, i32)) -> Self {
        Self::new(row, col)
    }
}

impl From<Position> for (i32, i32) {
    fn from(pos: Position) -> Self {
        (pos.row, pos.col)
    }
}
