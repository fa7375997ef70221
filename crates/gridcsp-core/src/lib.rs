//! Grid geometry for Sudoku-variant puzzles.
//!
//! This crate provides the geometric model that constraint generators query
//! while compiling a puzzle: cell positions, compass directions, and a
//! rectangular [`Grid`] of [`Cell`]s with region assignments, givens, and
//! "outside" border cells.
//!
//! # Overview
//!
//! - [`position`]: Signed `(row, col)` coordinates. Coordinates may lie outside
//!   the grid, which is how outside clues address the border.
//! - [`direction`]: The eight compass directions used by rays and outside clues.
//! - [`cell`]: Per-cell data owned by the grid.
//! - [`grid`]: The immutable geometry oracle (rows, columns, regions, diagonals,
//!   neighborhoods, rays, disjoint groups).
//!
//! Every derived view only yields cells that exist in the grid and are not
//! flagged as outside. Unknown coordinates produce empty results rather than
//! errors.
//!
//! # Examples
//!
//! ```
//! use gridcsp_core::{Direction, Grid, Position};
//!
//! let grid = Grid::standard(9);
//! assert_eq!(grid.knight_moves(Position::new(4, 4)).len(), 8);
//! assert_eq!(grid.ray(Position::new(0, 0), Direction::Down).len(), 8);
//! assert_eq!(grid.positive_diagonal().len(), 9);
//! ```

pub mod cell;
pub mod direction;
pub mod grid;
pub mod position;

pub use self::{
    cell::Cell,
    direction::Direction,
    grid::{Grid, GridParseError},
    position::Position,
};
