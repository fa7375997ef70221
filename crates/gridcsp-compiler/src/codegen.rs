//! Building blocks shared by the tool generators.
//!
//! Most tools follow one of a few patterns: constrain the cells of each cage,
//! constrain adjacent pairs along a line, constrain the two cells of an edge,
//! or constrain the cells seen from an outside clue. The helpers here take
//! care of geometry lookups and skip bookkeeping so a generator only states
//! its rule.
//!
//! Inside an instance, resolve clue values last. A value resolved before a
//! geometry check fails would be cached without its declaration ever being
//! emitted.

use std::collections::HashSet;

use gridcsp_core::{Direction, Position};
use indexmap::IndexMap;

use crate::{
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintInstance, ConstraintsElement, InstanceGeometry},
};

/// Which per-cell variable a rule reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// The placed digit.
    Digits,
    /// The face value after doublers and negators.
    Values,
}

/// Returns the variables of all `cells`.
///
/// # Errors
///
/// Returns [`SkipReason::MissingCell`] if any cell is missing.
pub fn cell_refs(
    model: &mut PuzzleModel<'_>,
    cells: &[Position],
    reading: Reading,
) -> Result<Vec<Expr>, SkipReason> {
    let refs = match reading {
        Reading::Digits => model.digit_refs(cells),
        Reading::Values => model.value_refs(cells),
    };
    refs.ok_or(SkipReason::MissingCell)
}

/// Returns the variable of one cell.
///
/// # Errors
///
/// Returns [`SkipReason::MissingCell`] if the cell is missing.
pub fn cell_ref(
    model: &mut PuzzleModel<'_>,
    pos: Position,
    reading: Reading,
) -> Result<Expr, SkipReason> {
    let cell = match reading {
        Reading::Digits => model.digit_ref(pos),
        Reading::Values => model.value_ref(pos),
    };
    cell.ok_or(SkipReason::MissingCell)
}

/// Returns `"{prefix}_r{row}c{col}"` with one-based coordinates.
///
/// Negative coordinates (outside clues above or left of the grid) are written
/// with an `m` so the result stays a valid identifier.
#[must_use]
pub fn default_name(prefix: &str, pos: Position) -> String {
    let coordinate = |value: i32| {
        let value = i64::from(value) + 1;
        if value < 0 {
            format!("m{}", -value)
        } else {
            value.to_string()
        }
    };
    format!("{prefix}_r{}c{}", coordinate(pos.row()), coordinate(pos.col()))
}

/// Runs `emit` for every instance of `element` and joins the results.
///
/// `emit` writes into a scratch fragment. If it returns an error, the scratch
/// fragment is dropped and the instance is recorded as skipped.
pub fn for_each_instance<'a, F>(
    model: &mut PuzzleModel<'a>,
    element: &ConstraintsElement,
    mut emit: F,
) -> Fragment
where
    F: FnMut(&mut PuzzleModel<'a>, &ConstraintInstance, &mut Fragment) -> Result<(), SkipReason>,
{
    let mut fragment = Fragment::new();
    for (id, instance) in element.instances() {
        let mut scratch = Fragment::new();
        match emit(model, instance, &mut scratch) {
            Ok(()) => fragment.append(scratch),
            Err(reason) => model.skip(element.tool_id(), Some(id), reason),
        }
    }
    fragment
}

/// Returns the cells of a cage instance.
///
/// # Errors
///
/// Fails on an empty cage or a different shape.
pub fn cage_cells(instance: &ConstraintInstance) -> Result<&[Position], SkipReason> {
    match &instance.geometry {
        InstanceGeometry::Cage { cells } if cells.is_empty() => Err(SkipReason::EmptyFootprint),
        InstanceGeometry::Cage { cells } => Ok(cells),
        _ => Err(SkipReason::GeometryMismatch),
    }
}

/// Returns the path of a line instance.
///
/// # Errors
///
/// Fails on an empty path or a different shape.
pub fn line_path(instance: &ConstraintInstance) -> Result<LinePath, SkipReason> {
    match &instance.geometry {
        InstanceGeometry::Line { path } if path.is_empty() => Err(SkipReason::EmptyFootprint),
        InstanceGeometry::Line { path } => Ok(LinePath::new(path)),
        _ => Err(SkipReason::GeometryMismatch),
    }
}

/// Returns the cell of a single-cell instance.
///
/// # Errors
///
/// Fails on a different shape.
pub fn single_cell(instance: &ConstraintInstance) -> Result<Position, SkipReason> {
    match instance.geometry {
        InstanceGeometry::Cell { cell } => Ok(cell),
        _ => Err(SkipReason::GeometryMismatch),
    }
}

/// Returns the cell and direction of an outside clue.
///
/// # Errors
///
/// Fails on a different shape.
pub fn clue_direction(instance: &ConstraintInstance) -> Result<(Position, Direction), SkipReason> {
    match instance.geometry {
        InstanceGeometry::CellDirection { cell, direction } => Ok((cell, direction)),
        _ => Err(SkipReason::GeometryMismatch),
    }
}

/// Returns the two cells of an edge instance.
///
/// # Errors
///
/// Fails with [`SkipReason::GeometryMismatch`] unless the cells are
/// orthogonally adjacent.
pub fn edge_cells(instance: &ConstraintInstance) -> Result<(Position, Position), SkipReason> {
    match instance.geometry {
        InstanceGeometry::Edge { cells: [a, b] } if a.is_orthogonally_adjacent(b) => Ok((a, b)),
        _ => Err(SkipReason::GeometryMismatch),
    }
}

/// Returns the cells seen from an outside clue, nearest first.
///
/// # Errors
///
/// Fails on a different shape.
pub fn outside_cells(
    model: &PuzzleModel<'_>,
    instance: &ConstraintInstance,
) -> Result<(Vec<Position>, Direction), SkipReason> {
    let (cell, direction) = clue_direction(instance)?;
    Ok((model.grid().ray(cell, direction), direction))
}

/// A line path with its closed-loop flag.
///
/// A path whose last cell repeats its first, with more than two entries, is a
/// loop; the repeated cell is dropped and adjacency wraps around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePath {
    cells: Vec<Position>,
    circular: bool,
}

impl LinePath {
    /// Normalizes a raw path.
    #[must_use]
    pub fn new(path: &[Position]) -> Self {
        let circular = path.len() > 2 && path.first() == path.last();
        let cells = if circular {
            path[..path.len() - 1].to_vec()
        } else {
            path.to_vec()
        };
        Self { cells, circular }
    }

    /// Returns the distinct path cells in order.
    #[must_use]
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Returns `true` for closed loops.
    #[must_use]
    pub fn is_circular(&self) -> bool {
        self.circular
    }

    /// Returns the number of distinct cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the path has no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns consecutive index pairs, including last-to-first for loops.
    #[must_use]
    pub fn adjacent_pairs(&self) -> Vec<(usize, usize)> {
        let n = self.cells.len();
        let mut pairs: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
        if self.circular {
            pairs.push((n - 1, 0));
        }
        pairs
    }
}

/// Constrains the cells of every cage with `rule`.
pub fn simple_cage<F>(
    model: &mut PuzzleModel<'_>,
    element: &ConstraintsElement,
    reading: Reading,
    rule: F,
) -> Fragment
where
    F: Fn(Vec<Expr>) -> Expr,
{
    for_each_instance(model, element, |model, instance, fragment| {
        let cells = cage_cells(instance)?;
        fragment.constrain(rule(cell_refs(model, cells, reading)?));
        Ok(())
    })
}

/// Constrains every cell instance with the expressions `rule` returns.
///
/// `rule` receives the grid position and the cell's digit variable.
pub fn simple_cell<F>(
    model: &mut PuzzleModel<'_>,
    element: &ConstraintsElement,
    rule: F,
) -> Fragment
where
    F: Fn(&PuzzleModel<'_>, Position, Expr) -> Vec<Expr>,
{
    for_each_instance(model, element, |model, instance, fragment| {
        let pos = single_cell(instance)?;
        let cell = cell_ref(model, pos, Reading::Digits)?;
        for expr in rule(model, pos, cell) {
            fragment.constrain(expr);
        }
        Ok(())
    })
}

/// Constrains every pair of adjacent cells along each line with `rule`.
pub fn simple_line_pairs<F>(
    model: &mut PuzzleModel<'_>,
    element: &ConstraintsElement,
    reading: Reading,
    rule: F,
) -> Fragment
where
    F: Fn(Expr, Expr) -> Expr,
{
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let refs = cell_refs(model, path.cells(), reading)?;
        for (i, j) in path.adjacent_pairs() {
            fragment.constrain(rule(refs[i].clone(), refs[j].clone()));
        }
        Ok(())
    })
}

/// Constrains both cells of every edge with `rule`.
///
/// `rule` also receives the instance and the scratch fragment so it can
/// resolve the clue text. Returns the fragment and the pairs of every
/// declared edge (see [`covered_edges`]), including skipped ones.
pub fn simple_edge<'a, F>(
    model: &mut PuzzleModel<'a>,
    element: &ConstraintsElement,
    reading: Reading,
    mut rule: F,
) -> (Fragment, HashSet<(Position, Position)>)
where
    F: FnMut(
        &mut PuzzleModel<'a>,
        &ConstraintInstance,
        &mut Fragment,
        Expr,
        Expr,
    ) -> Result<Expr, SkipReason>,
{
    let fragment = for_each_instance(model, element, |model, instance, fragment| {
        let (a, b) = edge_cells(instance)?;
        let lhs = cell_ref(model, a, reading)?;
        let rhs = cell_ref(model, b, reading)?;
        let expr = rule(model, instance, fragment, lhs, rhs)?;
        fragment.constrain(expr);
        Ok(())
    });
    (fragment, covered_edges(Some(element)))
}

/// Returns the pairs of every edge `element` declares, whether or not the
/// instance compiled.
///
/// Tools with "all given" flags leave these pairs out of their negative
/// constraint, and also those of tools that exclude each other's dots.
#[must_use]
pub fn covered_edges(element: Option<&ConstraintsElement>) -> HashSet<(Position, Position)> {
    element
        .into_iter()
        .flat_map(ConstraintsElement::instances)
        .filter_map(|(_, instance)| edge_cells(instance).ok())
        .map(|(a, b)| edge_key(a, b))
        .collect()
}

/// Returns an edge's cells in row-major order.
#[must_use]
pub fn edge_key(a: Position, b: Position) -> (Position, Position) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Constrains every orthogonal pair not in `covered` with `rule`.
///
/// This is the negative constraint of "all dots are given" flags.
pub fn negative_edges<F>(
    model: &mut PuzzleModel<'_>,
    covered: &HashSet<(Position, Position)>,
    reading: Reading,
    rule: F,
) -> Fragment
where
    F: Fn(Expr, Expr) -> Vec<Expr>,
{
    let mut fragment = Fragment::new();
    for (a, b) in model.grid().orthogonal_pairs() {
        if covered.contains(&edge_key(a, b)) {
            continue;
        }
        // orthogonal pairs only hold inside cells
        if let (Ok(lhs), Ok(rhs)) = (cell_ref(model, a, reading), cell_ref(model, b, reading)) {
            for expr in rule(lhs, rhs) {
                fragment.constrain(expr);
            }
        }
    }
    fragment
}

/// Groups instances by trimmed clue text, keeping first-seen order.
///
/// Instances without text are left out.
#[must_use]
pub fn group_by_value(
    element: &ConstraintsElement,
) -> IndexMap<&str, Vec<(&str, &ConstraintInstance)>> {
    let mut groups: IndexMap<&str, Vec<_>> = IndexMap::new();
    for (id, instance) in element.instances() {
        let label = instance.value_text();
        if !label.is_empty() {
            groups.entry(label).or_default().push((id, instance));
        }
    }
    groups
}

/// Returns index pairs of cages that share an orthogonal edge.
#[must_use]
pub fn cage_adjacency(cages: &[Vec<Position>]) -> Vec<(usize, usize)> {
    let touches = |a: &[Position], b: &[Position]| {
        a.iter()
            .any(|&p| b.iter().any(|&q| p.is_orthogonally_adjacent(q)))
    };
    unordered_pairs(&(0..cages.len()).collect::<Vec<_>>())
        .into_iter()
        .filter(|&(i, j)| touches(&cages[i], &cages[j]))
        .collect()
}

/// Returns every unordered pair of `items`, in index order.
#[must_use]
pub fn unordered_pairs<T: Clone>(items: &[T]) -> Vec<(T, T)> {
    let mut pairs = Vec::new();
    for (i, a) in items.iter().enumerate() {
        for b in &items[i + 1..] {
            pairs.push((a.clone(), b.clone()));
        }
    }
    pairs
}

/// Returns each pair of positions related by `neighbors` once, smaller first.
#[must_use]
pub fn unique_neighbor_pairs<F>(model: &PuzzleModel<'_>, neighbors: F) -> Vec<(Position, Position)>
where
    F: Fn(Position) -> Vec<Position>,
{
    let mut pairs = Vec::new();
    for pos in model.grid().inside_positions() {
        for other in neighbors(pos) {
            if pos < other {
                pairs.push((pos, other));
            }
        }
    }
    pairs
}
