//! Per-cell data.

use crate::Position;

/// A single cell owned by a [`Grid`](crate::Grid).
///
/// Cells are identified by their [`Position`]; the grid never holds two cells
/// at the same position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Location of the cell.
    pub position: Position,
    /// Region the cell belongs to, or `None` when undetermined.
    pub region: Option<u32>,
    /// Given digit, if any.
    pub given: Option<i64>,
    /// `true` for border cells that hold outside clues rather than digits.
    pub outside: bool,
}

impl Cell {
    /// Creates an empty inside cell with no region.
    #[must_use]
    pub const fn new(position: Position) -> Self {
        Self {
            position,
            region: None,
            given: None,
            outside: false,
        }
    }

    /// Returns `true` if the cell holds a digit (is not an outside cell).
    #[must_use]
    #[inline]
    pub const fn is_inside(&self) -> bool {
        !self.outside
    }
}
