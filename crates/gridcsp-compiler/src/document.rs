//! The serialized form of a puzzle.
//!
//! A [`PuzzleDocument`] mirrors [`Puzzle`] with plain serde-friendly fields,
//! so puzzles can be read from JSON (or any other serde format) and checked
//! before compilation:
//!
//! ```json
//! {
//!   "grid": { "rows": 9, "cols": 9, "givens": [{ "cell": [0, 0], "value": 5 }] },
//!   "elements": {
//!     "killer_cage": {
//!       "flags": ["ALL_CAGE_TOTALS_ARE_DIFFERENT"],
//!       "instances": {
//!         "c1": { "shape": "cage", "cells": [[0, 1], [0, 2]], "value": "10" }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Element order in the document is preserved and decides the order of the
//! compiled model.

use gridcsp_core::{Grid, Position};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::puzzle::{ConstraintInstance, ConstraintsElement, Puzzle};

/// Errors converting a [`PuzzleDocument`] into a [`Puzzle`].
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum DocumentError {
    /// The grid has no rows or no columns.
    #[display("grid must have at least one row and one column")]
    EmptyGrid,
    /// The region matrix does not match the grid dimensions.
    #[display("region matrix must be {rows}x{cols}")]
    RegionShape {
        /// Expected number of rows.
        rows: usize,
        /// Expected number of columns.
        cols: usize,
    },
    /// Only one of `box_rows` and `box_cols` was given, or one is zero.
    #[display("box_rows and box_cols must both be positive")]
    IncompleteBoxes,
    /// A given or outside cell lies off the grid.
    #[display("cell {cell} is not part of the grid")]
    CellOutOfRange {
        /// The offending cell.
        cell: Position,
    },
}

/// A serialized puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleDocument {
    /// Grid layout.
    pub grid: GridDocument,
    /// Valid digits. Defaults to `1..=max(rows, cols)`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digits: Option<Vec<i64>>,
    /// Elements by tool id, in order.
    #[serde(default)]
    pub elements: IndexMap<String, ElementDocument>,
}

/// A serialized grid.
///
/// Regions come from `regions` if present, otherwise from the box
/// dimensions, otherwise from standard boxes when the grid is square. A
/// rectangular grid without any of these has no regions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDocument {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// Box height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_rows: Option<usize>,
    /// Box width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_cols: Option<usize>,
    /// Region id per cell, row by row. `null` leaves a cell without a region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regions: Option<Vec<Vec<Option<u32>>>>,
    /// Given digits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub givens: Vec<GivenDocument>,
    /// Cells that are part of the matrix but not of the puzzle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub outside: Vec<Position>,
}

/// A given digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GivenDocument {
    /// The cell.
    pub cell: Position,
    /// The digit.
    pub value: i64,
}

/// A serialized constraints element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDocument {
    /// Negative flags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
    /// Instances by id, in order.
    #[serde(default)]
    pub instances: IndexMap<String, ConstraintInstance>,
}

impl GridDocument {
    /// Builds the grid.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions, the region matrix, the box
    /// dimensions, or any given or outside cell is invalid.
    pub fn to_grid(&self) -> Result<Grid, DocumentError> {
        let Self { rows, cols, .. } = *self;
        if rows == 0 || cols == 0 {
            return Err(DocumentError::EmptyGrid);
        }

        let mut grid = match (&self.regions, self.box_rows, self.box_cols) {
            (Some(regions), _, _) => {
                if regions.len() != rows || regions.iter().any(|row| row.len() != cols) {
                    return Err(DocumentError::RegionShape { rows, cols });
                }
                let mut grid = Grid::new(rows, cols);
                for (row, ids) in (0..).zip(regions) {
                    for (col, &id) in (0..).zip(ids) {
                        grid.set_region(Position::new(row, col), id);
                    }
                }
                grid
            }
            (None, Some(box_rows), Some(box_cols)) if box_rows > 0 && box_cols > 0 => {
                Grid::with_boxes(rows, cols, box_rows, box_cols)
            }
            (None, None, None) if rows == cols => Grid::standard(rows),
            (None, None, None) => Grid::new(rows, cols),
            (None, _, _) => return Err(DocumentError::IncompleteBoxes),
        };

        for given in &self.givens {
            if !grid.set_given(given.cell, Some(given.value)) {
                return Err(DocumentError::CellOutOfRange { cell: given.cell });
            }
        }
        for &cell in &self.outside {
            if !grid.set_outside(cell, true) {
                return Err(DocumentError::CellOutOfRange { cell });
            }
        }
        Ok(grid)
    }
}

impl PuzzleDocument {
    /// Converts the document into a [`Puzzle`].
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is invalid (see [`GridDocument::to_grid`]).
    pub fn into_puzzle(self) -> Result<Puzzle, DocumentError> {
        let mut puzzle = Puzzle::new(self.grid.to_grid()?);
        if let Some(digits) = self.digits {
            puzzle = puzzle.with_digits(digits);
        }
        for (tool_id, document) in self.elements {
            let mut element = ConstraintsElement::new(tool_id);
            for flag in document.flags {
                element = element.with_flag(flag);
            }
            for (id, instance) in document.instances {
                element.insert(id, instance);
            }
            puzzle.add_element(element);
        }
        Ok(puzzle)
    }
}

impl TryFrom<PuzzleDocument> for Puzzle {
    type Error = DocumentError;

    fn try_from(document: PuzzleDocument) -> Result<Self, Self::Error> {
        document.into_puzzle()
    }
}
