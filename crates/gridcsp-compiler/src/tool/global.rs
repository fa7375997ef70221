//! Global rules that apply to the whole grid.
//!
//! These tools ignore their instances: an element in the puzzle, even an
//! empty one, switches the rule on.

use gridcsp_core::{Grid, Position};

use crate::{
    codegen::{Reading, cell_refs, unique_neighbor_pairs},
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintsElement, InstanceShape},
    registry::FnCompiler,
};

/// Cells a chess knight's move apart hold different digits.
pub const ANTI_KNIGHT: &str = "anti_knight";
/// Cells a chess king's move apart hold different digits.
pub const ANTI_KING: &str = "anti_king";
/// The bottom-left to top-right diagonal holds different digits.
pub const POSITIVE_DIAGONAL: &str = "positive_diagonal";
/// The top-left to bottom-right diagonal holds different digits.
pub const NEGATIVE_DIAGONAL: &str = "negative_diagonal";
/// Cells in the same relative position of every region hold different digits.
pub const DISJOINT_GROUPS: &str = "disjoint_groups";
/// Edge-adjacent cells do not hold consecutive digits.
pub const NON_CONSECUTIVE: &str = "non_consecutive";

pub(super) const COMPILERS: &[FnCompiler] = &[
    FnCompiler::new(ANTI_KNIGHT, InstanceShape::Cell, anti_knight),
    FnCompiler::new(ANTI_KING, InstanceShape::Cell, anti_king),
    FnCompiler::new(POSITIVE_DIAGONAL, InstanceShape::Cell, positive_diagonal),
    FnCompiler::new(NEGATIVE_DIAGONAL, InstanceShape::Cell, negative_diagonal),
    FnCompiler::new(DISJOINT_GROUPS, InstanceShape::Cell, disjoint_groups),
    FnCompiler::new(NON_CONSECUTIVE, InstanceShape::Cell, non_consecutive),
];

fn pairwise(
    model: &PuzzleModel<'_>,
    pairs: Vec<(Position, Position)>,
    rule: fn(Expr, Expr) -> Expr,
) -> Fragment {
    let mut fragment = Fragment::new();
    for (a, b) in pairs {
        if let (Some(a), Some(b)) = (model.digit_ref(a), model.digit_ref(b)) {
            fragment.constrain(rule(a, b));
        }
    }
    fragment
}

fn all_different(model: &mut PuzzleModel<'_>, cells: &[Position]) -> Option<Expr> {
    if cells.len() < 2 {
        return None;
    }
    let refs = cell_refs(model, cells, Reading::Digits).ok()?;
    Some(Expr::call("all_different", vec![Expr::array(refs)]))
}

fn anti_knight(model: &mut PuzzleModel<'_>, _: &ConstraintsElement) -> Fragment {
    let grid = model.grid();
    let pairs = unique_neighbor_pairs(model, |pos| grid.knight_moves(pos));
    pairs_not_equal(model, pairs)
}

fn anti_king(model: &mut PuzzleModel<'_>, _: &ConstraintsElement) -> Fragment {
    let grid = model.grid();
    let pairs = unique_neighbor_pairs(model, |pos| grid.king_neighbors(pos));
    pairs_not_equal(model, pairs)
}

fn pairs_not_equal(model: &PuzzleModel<'_>, pairs: Vec<(Position, Position)>) -> Fragment {
    pairwise(model, pairs, Expr::not_equals)
}

fn diagonal(
    model: &mut PuzzleModel<'_>,
    element: &ConstraintsElement,
    cells: fn(&Grid) -> Vec<Position>,
) -> Fragment {
    let mut fragment = Fragment::new();
    if !model.grid().is_square() {
        model.skip(element.tool_id(), None, SkipReason::NonSquareGrid);
        return fragment;
    }
    let cells = cells(model.grid());
    if let Some(expr) = all_different(model, &cells) {
        fragment.constrain(expr);
    }
    fragment
}

fn positive_diagonal(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    diagonal(model, element, Grid::positive_diagonal)
}

fn negative_diagonal(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    diagonal(model, element, Grid::negative_diagonal)
}

fn disjoint_groups(model: &mut PuzzleModel<'_>, _: &ConstraintsElement) -> Fragment {
    let mut fragment = Fragment::new();
    let grid = model.grid();
    for index in 0..grid.disjoint_group_count() {
        if let Some(expr) = all_different(model, &grid.disjoint_group(index)) {
            fragment.constrain(expr);
        }
    }
    fragment
}

fn non_consecutive(model: &mut PuzzleModel<'_>, _: &ConstraintsElement) -> Fragment {
    let pairs = model.grid().orthogonal_pairs();
    pairwise(model, pairs, |a, b| (a - b).abs().not_equals(Expr::int(1)))
}
