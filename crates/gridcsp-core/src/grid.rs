//! The grid geometry oracle.

use std::{collections::BTreeSet, str::FromStr};

use crate::{Cell, Direction, Position};

/// Knight move offsets, clockwise from two-up-one-right.
const KNIGHT_OFFSETS: [(i32, i32); 8] = [
    (-2, 1),
    (-1, 2),
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
];

/// A rectangular matrix of [`Cell`]s.
///
/// `Grid` answers purely geometric questions: which cells form a row, a region
/// or a diagonal, which cells neighbor a given cell, and which cells lie along a
/// ray towards the border. It has no knowledge of solvers or constraints.
///
/// Derived views only return positions of cells that exist and are not flagged
/// as outside. Coordinates outside the matrix yield empty results.
///
/// # Examples
///
/// ```
/// use gridcsp_core::{Grid, Position};
///
/// let grid = Grid::standard(6);
/// assert_eq!(grid.region_of(Position::new(0, 3)), Some(1));
/// assert_eq!(grid.region(0).len(), 6);
/// assert!(grid.cell_at(Position::new(6, 0)).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: i32,
    cols: i32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of empty inside cells with no regions.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        let rows = to_i32(rows);
        let cols = to_i32(cols);
        let cells = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| Cell::new(Position::new(row, col))))
            .collect();
        Self { rows, cols, cells }
    }

    /// Creates a square grid with rectangular box regions.
    ///
    /// The box height is the largest divisor of `size` not exceeding its square
    /// root; the box width is `size` divided by that height. A 9×9 grid gets
    /// 3×3 boxes and a 6×6 grid gets 2×3 boxes.
    #[must_use]
    pub fn standard(size: usize) -> Self {
        let box_rows = (1..=size)
            .take_while(|d| d * d <= size)
            .filter(|d| size % d == 0)
            .last()
            .unwrap_or(1);
        let box_cols = size.checked_div(box_rows).unwrap_or(size).max(1);
        Self::with_boxes(size, size, box_rows, box_cols)
    }

    /// Creates a grid whose regions are `box_rows`×`box_cols` boxes.
    #[must_use]
    pub fn with_boxes(rows: usize, cols: usize, box_rows: usize, box_cols: usize) -> Self {
        let mut grid = Self::new(rows, cols);
        grid.assign_box_regions(box_rows, box_cols);
        grid
    }

    /// Returns the number of rows.
    #[must_use]
    #[inline]
    pub fn rows(&self) -> usize {
        usize::try_from(self.rows).unwrap_or_default()
    }

    /// Returns the number of columns.
    #[must_use]
    #[inline]
    pub fn cols(&self) -> usize {
        usize::try_from(self.cols).unwrap_or_default()
    }

    /// Returns `true` if the grid has as many rows as columns.
    #[must_use]
    pub fn is_square(&self) -> bool {
        self.rows == self.cols
    }

    /// Returns `true` if any cell is flagged as outside.
    #[must_use]
    pub fn has_outside_cells(&self) -> bool {
        self.cells.iter().any(|cell| cell.outside)
    }

    /// Returns `true` if `pos` addresses a cell of the matrix (inside or outside).
    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.index_of(pos).is_some()
    }

    /// Returns `true` if `pos` addresses an inside cell.
    #[must_use]
    pub fn is_inside(&self, pos: Position) -> bool {
        self.inside_cell(pos).is_some()
    }

    /// Returns the cell at `pos`, or `None` if the coordinate is off the matrix.
    #[must_use]
    pub fn cell_at(&self, pos: Position) -> Option<&Cell> {
        self.index_of(pos).map(|i| &self.cells[i])
    }

    /// Returns the cell at `pos` unless it is missing or flagged as outside.
    #[must_use]
    pub fn inside_cell(&self, pos: Position) -> Option<&Cell> {
        self.cell_at(pos).filter(|cell| cell.is_inside())
    }

    /// Returns all cells in row-major order, outside cells included.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Returns the positions of all inside cells in row-major order.
    pub fn inside_positions(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.is_inside())
            .map(|cell| cell.position)
    }

    /// Sets the region of the cell at `pos`. Returns `false` if there is no such cell.
    pub fn set_region(&mut self, pos: Position, region: Option<u32>) -> bool {
        self.cell_mut(pos).map(|cell| cell.region = region).is_some()
    }

    /// Sets the given digit of the cell at `pos`. Returns `false` if there is no such cell.
    pub fn set_given(&mut self, pos: Position, given: Option<i64>) -> bool {
        self.cell_mut(pos).map(|cell| cell.given = given).is_some()
    }

    /// Flags the cell at `pos` as outside. Returns `false` if there is no such cell.
    pub fn set_outside(&mut self, pos: Position, outside: bool) -> bool {
        self.cell_mut(pos).map(|cell| cell.outside = outside).is_some()
    }

    /// Assigns box regions, numbered left to right, top to bottom.
    ///
    /// A zero box dimension leaves the regions untouched.
    pub fn assign_box_regions(&mut self, box_rows: usize, box_cols: usize) {
        let (box_rows, box_cols) = (to_i32(box_rows), to_i32(box_cols));
        if box_rows == 0 || box_cols == 0 {
            return;
        }
        let boxes_per_row = (self.cols + box_cols - 1) / box_cols;
        for cell in &mut self.cells {
            let pos = cell.position;
            let id = (pos.row() / box_rows) * boxes_per_row + pos.col() / box_cols;
            cell.region = u32::try_from(id).ok();
        }
    }

    /// Returns the inside cells of row `row`, left to right.
    #[must_use]
    pub fn row(&self, row: i32) -> Vec<Position> {
        self.collect_inside((0..self.cols).map(|col| Position::new(row, col)))
    }

    /// Returns the inside cells of column `col`, top to bottom.
    #[must_use]
    pub fn column(&self, col: i32) -> Vec<Position> {
        self.collect_inside((0..self.rows).map(|row| Position::new(row, col)))
    }

    /// Returns the inside cells of region `id` in row-major order.
    #[must_use]
    pub fn region(&self, id: u32) -> Vec<Position> {
        self.cells
            .iter()
            .filter(|cell| cell.is_inside() && cell.region == Some(id))
            .map(|cell| cell.position)
            .collect()
    }

    /// Returns the region of the inside cell at `pos`.
    #[must_use]
    pub fn region_of(&self, pos: Position) -> Option<u32> {
        self.inside_cell(pos).and_then(|cell| cell.region)
    }

    /// Returns the distinct region ids of inside cells, ascending.
    #[must_use]
    pub fn used_region_ids(&self) -> Vec<u32> {
        self.cells
            .iter()
            .filter(|cell| cell.is_inside())
            .filter_map(|cell| cell.region)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Returns the diagonal running from the bottom-left corner up to the right.
    ///
    /// On a grid without outside cells this has `min(rows, cols)` cells.
    #[must_use]
    pub fn positive_diagonal(&self) -> Vec<Position> {
        let len = self.rows.min(self.cols);
        self.collect_inside((0..len).map(|i| Position::new(self.rows - 1 - i, i)))
    }

    /// Returns the diagonal running from the top-left corner down to the right.
    ///
    /// On a grid without outside cells this has `min(rows, cols)` cells.
    #[must_use]
    pub fn negative_diagonal(&self) -> Vec<Position> {
        let len = self.rows.min(self.cols);
        self.collect_inside((0..len).map(|i| Position::new(i, i)))
    }

    /// Returns the edge-adjacent inside cells of `pos`.
    #[must_use]
    pub fn orthogonal_neighbors(&self, pos: Position) -> Vec<Position> {
        self.collect_inside(Direction::ORTHOGONAL.into_iter().map(|d| pos.step(d)))
    }

    /// Returns the corner-adjacent inside cells of `pos`.
    #[must_use]
    pub fn diagonal_neighbors(&self, pos: Position) -> Vec<Position> {
        self.collect_inside(Direction::DIAGONAL.into_iter().map(|d| pos.step(d)))
    }

    /// Returns the inside cells a chess king could reach from `pos`.
    #[must_use]
    pub fn king_neighbors(&self, pos: Position) -> Vec<Position> {
        self.collect_inside(Direction::ALL.into_iter().map(|d| pos.step(d)))
    }

    /// Returns the inside cells a chess knight could reach from `pos`.
    #[must_use]
    pub fn knight_moves(&self, pos: Position) -> Vec<Position> {
        self.collect_inside(
            KNIGHT_OFFSETS
                .into_iter()
                .map(|(d_row, d_col)| pos.offset(d_row, d_col)),
        )
    }

    /// Returns the inside cells from `pos` (exclusive) to the border (inclusive).
    ///
    /// Cells are ordered by increasing distance. `pos` may lie off the matrix,
    /// as outside clues do; the ray then starts where it enters the matrix. A
    /// ray that never enters the matrix, or starts at the border heading out, is
    /// empty.
    #[must_use]
    pub fn ray(&self, pos: Position, direction: Direction) -> Vec<Position> {
        let max_steps = self.rows + self.cols + 2;
        let mut entered = false;
        let mut result = Vec::new();
        let mut current = pos;
        for _ in 0..max_steps {
            current = current.step(direction);
            if self.contains(current) {
                entered = true;
                if self.is_inside(current) {
                    result.push(current);
                }
            } else if entered {
                break;
            }
        }
        result
    }

    /// Returns every unordered pair of edge-adjacent inside cells.
    ///
    /// Pairs are ordered row-major by their first cell, with the right
    /// neighbor before the lower one.
    #[must_use]
    pub fn orthogonal_pairs(&self) -> Vec<(Position, Position)> {
        let mut pairs = Vec::new();
        for pos in self.inside_positions() {
            for direction in [Direction::Right, Direction::Down] {
                let other = pos.step(direction);
                if self.is_inside(other) {
                    pairs.push((pos, other));
                }
            }
        }
        pairs
    }

    /// Splits `path` into maximal runs of consecutive cells sharing a region.
    ///
    /// Missing cells end the current run and are dropped.
    #[must_use]
    pub fn split_by_region(&self, path: &[Position]) -> Vec<Vec<Position>> {
        let mut segments: Vec<Vec<Position>> = Vec::new();
        let mut current_region = None;
        for &pos in path {
            let Some(cell) = self.inside_cell(pos) else {
                current_region = None;
                continue;
            };
            match segments.last_mut() {
                Some(segment) if current_region == Some(cell.region) => segment.push(pos),
                _ => segments.push(vec![pos]),
            }
            current_region = Some(cell.region);
        }
        segments
    }

    /// Returns the `index`-th cell (row-major) of every region, by region id.
    ///
    /// With congruent regions this is the set of cells sharing one relative
    /// offset. Regions with fewer than `index + 1` cells contribute nothing, so
    /// irregular layouts yield partial groups.
    #[must_use]
    pub fn disjoint_group(&self, index: usize) -> Vec<Position> {
        self.used_region_ids()
            .into_iter()
            .filter_map(|id| self.region(id).get(index).copied())
            .collect()
    }

    /// Returns the number of disjoint groups (the size of the largest region).
    #[must_use]
    pub fn disjoint_group_count(&self) -> usize {
        self.used_region_ids()
            .into_iter()
            .map(|id| self.region(id).len())
            .max()
            .unwrap_or(0)
    }

    fn index_of(&self, pos: Position) -> Option<usize> {
        if !(0..self.rows).contains(&pos.row()) || !(0..self.cols).contains(&pos.col()) {
            return None;
        }
        usize::try_from(pos.row() * self.cols + pos.col()).ok()
    }

    fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index_of(pos).map(|i| &mut self.cells[i])
    }

    fn collect_inside(&self, positions: impl IntoIterator<Item = Position>) -> Vec<Position> {
        positions
            .into_iter()
            .filter(|&pos| self.is_inside(pos))
            .collect()
    }
}

fn to_i32(value: usize) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// Errors returned when parsing a [`Grid`] from its text layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridParseError {
    /// The layout contains no rows.
    #[display("grid layout is empty")]
    Empty,
    /// A character that is neither a digit, an empty marker, nor `#`.
    #[display("invalid character {ch:?} at row {row}, column {col}")]
    InvalidChar {
        /// Offending character.
        ch: char,
        /// Zero-based row.
        row: usize,
        /// Zero-based column.
        col: usize,
    },
    /// A row whose length differs from the first row.
    #[display("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        /// Zero-based row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of this row.
        found: usize,
    },
}

impl FromStr for Grid {
    type Err = GridParseError;

    /// Parses a grid layout.
    ///
    /// Each non-blank line is a row. Within a row whitespace is ignored;
    /// `1`-`9` and `A`-`Z` (10 and up) are givens, `.`, `_` and `0` are empty
    /// cells, and `#` marks an outside cell. No regions are assigned.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut rows: Vec<Vec<(Option<i64>, bool)>> = Vec::new();
        for (row, line) in s.lines().filter(|line| !line.trim().is_empty()).enumerate() {
            let mut cells = Vec::new();
            for (col, ch) in line.chars().filter(|ch| !ch.is_whitespace()).enumerate() {
                let cell = match ch {
                    '.' | '_' | '0' => (None, false),
                    '#' => (None, true),
                    '1'..='9' | 'A'..='Z' => (ch.to_digit(36).map(i64::from), false),
                    _ => return Err(GridParseError::InvalidChar { ch, row, col }),
                };
                cells.push(cell);
            }
            if let Some(first) = rows.first()
                && first.len() != cells.len()
            {
                return Err(GridParseError::RaggedRow {
                    row,
                    expected: first.len(),
                    found: cells.len(),
                });
            }
            rows.push(cells);
        }
        let Some(first) = rows.first() else {
            return Err(GridParseError::Empty);
        };

        let mut grid = Grid::new(rows.len(), first.len());
        for (row, cells) in (0..).zip(&rows) {
            for (col, &(given, outside)) in (0..).zip(cells) {
                let pos = Position::new(row, col);
                grid.set_given(pos, given);
                grid.set_outside(pos, outside);
            }
        }
        Ok(grid)
    }
}
