//! Declared puzzle data: the grid, the digit domain, and constraint elements.

use std::collections::BTreeSet;

use gridcsp_core::{Direction, Grid, Position};
use indexmap::IndexMap;

/// The discriminant of an [`InstanceGeometry`].
///
/// Every generator declares the shape it expects; the model assembler rejects
/// elements whose instances have a different shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum InstanceShape {
    /// An arbitrary set of cells.
    #[display("cage")]
    Cage,
    /// An ordered path of cells.
    #[display("line")]
    Line,
    /// A single cell.
    #[display("cell")]
    Cell,
    /// A single cell plus a direction.
    #[display("cell+direction")]
    CellDirection,
    /// The edge between two cells.
    #[display("edge")]
    Edge,
    /// The corner shared by up to four cells.
    #[display("corner")]
    Corner,
    /// Two equally sized cell lists.
    #[display("clone")]
    Clone,
}

/// The geometric footprint of a constraint instance.
///
/// Instances serialize with a `shape` tag:
///
/// ```json
/// { "shape": "cage", "cells": [[0, 0], [0, 1]], "value": "10" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum InstanceGeometry {
    /// Cells of a cage, in declaration order.
    Cage {
        /// Cage cells.
        cells: Vec<Position>,
    },
    /// A line; a closed loop repeats its first cell at the end.
    Line {
        /// Path cells.
        path: Vec<Position>,
    },
    /// A single cell.
    Cell {
        /// The cell.
        cell: Position,
    },
    /// A cell and a direction, as used by outside clues.
    CellDirection {
        /// The clue cell, possibly off the grid.
        cell: Position,
        /// Where the clue points.
        direction: Direction,
    },
    /// The edge between two cells.
    Edge {
        /// The two cells.
        cells: [Position; 2],
    },
    /// A corner clue touching up to four cells.
    Corner {
        /// The touched cells.
        cells: Vec<Position>,
    },
    /// A region and its clone.
    Clone {
        /// Original cells.
        cells: Vec<Position>,
        /// Clone cells, matched by index.
        clone_cells: Vec<Position>,
    },
}

impl InstanceGeometry {
    /// Returns the discriminant.
    #[must_use]
    pub const fn shape(&self) -> InstanceShape {
        match self {
            Self::Cage { .. } => InstanceShape::Cage,
            Self::Line { .. } => InstanceShape::Line,
            Self::Cell { .. } => InstanceShape::Cell,
            Self::CellDirection { .. } => InstanceShape::CellDirection,
            Self::Edge { .. } => InstanceShape::Edge,
            Self::Corner { .. } => InstanceShape::Corner,
            Self::Clone { .. } => InstanceShape::Clone,
        }
    }

    /// Returns every position the instance touches.
    #[must_use]
    pub fn positions(&self) -> Vec<Position> {
        match self {
            Self::Cage { cells } | Self::Corner { cells } => cells.clone(),
            Self::Line { path } => path.clone(),
            Self::Cell { cell } | Self::CellDirection { cell, .. } => vec![*cell],
            Self::Edge { cells } => cells.to_vec(),
            Self::Clone { cells, clone_cells } => {
                cells.iter().chain(clone_cells).copied().collect()
            }
        }
    }
}

/// One declared use of a tool.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConstraintInstance {
    /// Footprint of the instance.
    #[serde(flatten)]
    pub geometry: InstanceGeometry,
    /// Raw clue text, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl ConstraintInstance {
    /// Creates an instance without a value.
    #[must_use]
    pub const fn new(geometry: InstanceGeometry) -> Self {
        Self {
            geometry,
            value: None,
        }
    }

    /// A cage instance.
    #[must_use]
    pub fn cage(cells: impl IntoIterator<Item = Position>) -> Self {
        Self::new(InstanceGeometry::Cage {
            cells: cells.into_iter().collect(),
        })
    }

    /// A line instance.
    #[must_use]
    pub fn line(path: impl IntoIterator<Item = Position>) -> Self {
        Self::new(InstanceGeometry::Line {
            path: path.into_iter().collect(),
        })
    }

    /// A single-cell instance.
    #[must_use]
    pub const fn cell(cell: Position) -> Self {
        Self::new(InstanceGeometry::Cell { cell })
    }

    /// A cell-and-direction instance.
    #[must_use]
    pub const fn cell_direction(cell: Position, direction: Direction) -> Self {
        Self::new(InstanceGeometry::CellDirection { cell, direction })
    }

    /// An edge instance between `a` and `b`.
    #[must_use]
    pub const fn edge(a: Position, b: Position) -> Self {
        Self::new(InstanceGeometry::Edge { cells: [a, b] })
    }

    /// A corner instance.
    #[must_use]
    pub fn corner(cells: impl IntoIterator<Item = Position>) -> Self {
        Self::new(InstanceGeometry::Corner {
            cells: cells.into_iter().collect(),
        })
    }

    /// A clone instance.
    #[must_use]
    pub fn clone_of(
        cells: impl IntoIterator<Item = Position>,
        clone_cells: impl IntoIterator<Item = Position>,
    ) -> Self {
        Self::new(InstanceGeometry::Clone {
            cells: cells.into_iter().collect(),
            clone_cells: clone_cells.into_iter().collect(),
        })
    }

    /// Sets the clue text.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Returns the trimmed clue text, or `""` when absent.
    #[must_use]
    pub fn value_text(&self) -> &str {
        self.value.as_deref().map_or("", str::trim)
    }

    /// Returns the shape of the instance.
    #[must_use]
    pub const fn shape(&self) -> InstanceShape {
        self.geometry.shape()
    }
}

/// A tool's declared instances and selected sub-rule flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintsElement {
    tool_id: String,
    instances: IndexMap<String, ConstraintInstance>,
    flags: BTreeSet<String>,
}

impl ConstraintsElement {
    /// Creates an element with no instances or flags.
    #[must_use]
    pub fn new(tool_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            instances: IndexMap::new(),
            flags: BTreeSet::new(),
        }
    }

    /// Adds an instance, builder style.
    #[must_use]
    pub fn with_instance(mut self, id: impl Into<String>, instance: ConstraintInstance) -> Self {
        self.insert(id, instance);
        self
    }

    /// Selects a flag, builder style.
    #[must_use]
    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    /// Adds or replaces an instance. Replacing keeps the original position.
    pub fn insert(&mut self, id: impl Into<String>, instance: ConstraintInstance) {
        self.instances.insert(id.into(), instance);
    }

    /// Returns the tool id.
    #[must_use]
    pub fn tool_id(&self) -> &str {
        &self.tool_id
    }

    /// Returns the instances in declaration order.
    pub fn instances(&self) -> impl Iterator<Item = (&str, &ConstraintInstance)> {
        self.instances
            .iter()
            .map(|(id, instance)| (id.as_str(), instance))
    }

    /// Returns the number of instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Returns `true` if there are no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Returns `true` if `flag` is selected.
    #[must_use]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Returns the selected flags, sorted.
    pub fn flags(&self) -> impl Iterator<Item = &str> {
        self.flags.iter().map(String::as_str)
    }
}

/// A grid, its digit domain, and the declared elements keyed by tool id.
///
/// Element iteration follows insertion order; that order is part of the
/// puzzle's identity and decides the order of the compiled model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Puzzle {
    grid: Grid,
    digits: BTreeSet<i64>,
    elements: IndexMap<String, ConstraintsElement>,
}

impl Puzzle {
    /// Creates a puzzle whose digits are `1..=max(rows, cols)`.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        let size = i64::try_from(grid.rows().max(grid.cols())).unwrap_or(i64::MAX);
        Self {
            grid,
            digits: (1..=size).collect(),
            elements: IndexMap::new(),
        }
    }

    /// Replaces the digit domain, builder style.
    #[must_use]
    pub fn with_digits(mut self, digits: impl IntoIterator<Item = i64>) -> Self {
        self.digits = digits.into_iter().collect();
        self
    }

    /// Adds an element, builder style.
    #[must_use]
    pub fn with_element(mut self, element: ConstraintsElement) -> Self {
        self.add_element(element);
        self
    }

    /// Adds an element under its tool id, replacing any element with that id.
    pub fn add_element(&mut self, element: ConstraintsElement) {
        self.elements.insert(element.tool_id.clone(), element);
    }

    /// Returns the grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Returns the valid digits.
    #[must_use]
    pub fn digits(&self) -> &BTreeSet<i64> {
        &self.digits
    }

    /// Returns the element for `tool_id`.
    #[must_use]
    pub fn element(&self, tool_id: &str) -> Option<&ConstraintsElement> {
        self.elements.get(tool_id)
    }

    /// Returns the elements in declaration order.
    pub fn elements(&self) -> impl Iterator<Item = &ConstraintsElement> {
        self.elements.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_json_shape_tag() {
        let instance: ConstraintInstance = serde_json::from_str(
            r#"{ "shape": "cell_direction", "cell": [-1, 0], "direction": "down_right", "value": "15" }"#,
        )
        .unwrap();
        assert_eq!(instance.shape(), InstanceShape::CellDirection);
        assert_eq!(
            instance.geometry,
            InstanceGeometry::CellDirection {
                cell: Position::new(-1, 0),
                direction: Direction::DownRight,
            }
        );
        assert_eq!(instance.value_text(), "15");
    }

    #[test]
    fn test_element_keeps_declaration_order() {
        let element = ConstraintsElement::new("odd")
            .with_instance("b", ConstraintInstance::cell(Position::new(0, 0)))
            .with_instance("a", ConstraintInstance::cell(Position::new(1, 1)))
            .with_instance("b", ConstraintInstance::cell(Position::new(2, 2)));
        let ids: Vec<_> = element.instances().map(|(id, _)| id).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(element.len(), 2);
    }

    #[test]
    fn test_puzzle_default_digits() {
        let puzzle = Puzzle::new(Grid::standard(6));
        assert_eq!(puzzle.digits().iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6]);
        let puzzle = puzzle.with_digits(0..=15);
        assert_eq!(puzzle.digits().len(), 16);
    }
}
