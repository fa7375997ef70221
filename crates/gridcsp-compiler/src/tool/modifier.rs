//! Tools that change what a placed digit means.
//!
//! Doublers and negators turn the digit grid into a face-value grid that
//! arithmetic clues read instead (see [`PuzzleModel::value_ref`]). Indexer
//! cells tie a digit to the position of another digit in its row or column.
//!
//! None of these support grids with outside cells. The whole tool is skipped
//! in that case.

use gridcsp_core::Position;

use crate::{
    codegen::{Reading, cell_ref, clue_direction, for_each_instance, single_cell},
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintsElement, InstanceShape},
    registry::FnCompiler,
    shared::SharedGrid,
};

/// One cell per region doubles its value. Instances mark known doublers.
pub const DOUBLERS: &str = "doublers";
/// Marked cells count negatively.
pub const NEGATORS: &str = "negators";
/// The digit gives the position of this cell's coordinate in its row or column.
pub const INDEXER_CELLS: &str = "indexer_cells";

/// Negator flag: every region holds exactly one negator.
pub const ONE_NEGATOR_PER_REGION: &str = "ONE_NEGATOR_PER_REGION";

pub(super) const COMPILERS: &[FnCompiler] = &[
    FnCompiler::new(DOUBLERS, InstanceShape::Cell, doublers),
    FnCompiler::new(NEGATORS, InstanceShape::Cell, negators),
    FnCompiler::new(INDEXER_CELLS, InstanceShape::CellDirection, indexer_cells),
];

/// Records a whole-tool skip if outside cells are present.
fn rejects_outside_cells(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> bool {
    if model.grid().has_outside_cells() {
        model.skip(element.tool_id(), None, SkipReason::OutsideCellsPresent);
        return true;
    }
    false
}

fn one_per_region(model: &PuzzleModel<'_>, indicator: &str) -> Fragment {
    let grid = model.grid();
    let mut fragment = Fragment::new();
    for id in grid.used_region_ids() {
        let cells = grid.region(id).into_iter().map(|pos| Expr::cell(indicator, pos));
        fragment.constrain(Expr::sum(cells).equals(Expr::int(1)));
    }
    fragment
}

fn marked_cells(
    model: &mut PuzzleModel<'_>,
    element: &ConstraintsElement,
    indicator: &'static str,
) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let pos = single_cell(instance)?;
        if !model.grid().is_inside(pos) {
            return Err(SkipReason::MissingCell);
        }
        fragment.constrain(Expr::cell(indicator, pos).equals(Expr::int(1)));
        Ok(())
    })
}

fn doublers(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    if rejects_outside_cells(model, element) {
        return Fragment::new();
    }
    let indicator = model.ensure_shared_grid(SharedGrid::Doublers);
    model.ensure_shared_grid(SharedGrid::Values);

    let mut fragment = one_per_region(model, indicator);
    fragment.append(marked_cells(model, element, indicator));
    fragment
}

fn negators(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    if rejects_outside_cells(model, element) {
        return Fragment::new();
    }
    let indicator = model.ensure_shared_grid(SharedGrid::Negators);
    model.ensure_shared_grid(SharedGrid::Values);

    let mut fragment = marked_cells(model, element, indicator);
    if element.has_flag(ONE_NEGATOR_PER_REGION) {
        fragment.append(one_per_region(model, indicator));
    }
    fragment
}

fn indexer_cells(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    if rejects_outside_cells(model, element) {
        return Fragment::new();
    }
    for_each_instance(model, element, |model, instance, fragment| {
        let (pos, direction) = clue_direction(instance)?;
        if direction.is_diagonal() {
            return Err(SkipReason::UnsupportedDirection);
        }
        let digit = cell_ref(model, pos, Reading::Digits)?;
        let (row, col) = one_based(pos);
        let grid = SharedGrid::Digits.name();
        let expr = if direction.is_horizontal() {
            Expr::index(grid, vec![Expr::int(row), digit]).equals(Expr::int(col))
        } else {
            Expr::index(grid, vec![digit, Expr::int(col)]).equals(Expr::int(row))
        };
        fragment.constrain(expr);
        Ok(())
    })
}

fn one_based(pos: Position) -> (i64, i64) {
    (i64::from(pos.row()) + 1, i64::from(pos.col()) + 1)
}

#[cfg(test)]
mod tests {
    use gridcsp_core::Direction;

    use super::*;
    use crate::{puzzle::ConstraintInstance, testing::CompileTester};

    fn at(row: i32, col: i32) -> ConstraintInstance {
        ConstraintInstance::cell(Position::new(row, col))
    }

    fn pointer(row: i32, col: i32, direction: Direction) -> ConstraintInstance {
        ConstraintInstance::cell_direction(Position::new(row, col), direction)
    }

    #[test]
    fn test_doublers() {
        CompileTester::standard(4)
            .with_element(ConstraintsElement::new(DOUBLERS).with_instance("d", at(0, 0)))
            .compile()
            .assert_declared_once("doubler_grid")
            .assert_declared_once("value_grid")
            .assert_constraint("value_grid[1,1] = (grid[1,1] * (1 + doubler_grid[1,1]))")
            .assert_constraint(
                "sum([doubler_grid[1,1], doubler_grid[1,2], doubler_grid[2,1], doubler_grid[2,2]]) = 1",
            )
            .assert_constraint("doubler_grid[1,1] = 1")
            .assert_constraint_count(16 + 4 + 1);
    }

    #[test]
    fn test_negators_with_one_per_region() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(NEGATORS)
                    .with_instance("n", at(3, 3))
                    .with_flag(ONE_NEGATOR_PER_REGION),
            )
            .compile()
            .assert_constraint("value_grid[4,4] = (grid[4,4] * (1 - (2 * negator_grid[4,4])))")
            .assert_constraint("negator_grid[4,4] = 1")
            .assert_constraint_count(16 + 1 + 4);
    }

    #[test]
    fn test_killer_cage_reads_values_with_doublers() {
        CompileTester::standard(4)
            .with_element(ConstraintsElement::new(DOUBLERS))
            .with_element(ConstraintsElement::new(NEGATORS).with_instance("n", at(1, 1)))
            .with_element(
                ConstraintsElement::new(crate::tool::cage::KILLER_CAGE).with_instance(
                    "c",
                    ConstraintInstance::cage([Position::new(0, 0), Position::new(0, 1)])
                        .with_value("3"),
                ),
            )
            .compile()
            .assert_declared_once("doubler_grid")
            .assert_declared_once("negator_grid")
            .assert_declared_once("value_grid")
            .assert_constraint(
                "value_grid[1,1] = ((grid[1,1] * (1 + doubler_grid[1,1])) * (1 - (2 * negator_grid[1,1])))",
            )
            .assert_constraint("sum_cage_p([value_grid[1,1], value_grid[1,2]], 3)");
    }

    #[test]
    fn test_modifiers_reject_outside_cells() {
        let layout = "
            #___
            ____
            ____
            ____
        ";
        CompileTester::from_layout(layout)
            .with_element(ConstraintsElement::new(DOUBLERS).with_instance("d", at(1, 1)))
            .with_element(ConstraintsElement::new(NEGATORS).with_instance("n", at(1, 1)))
            .with_element(
                ConstraintsElement::new(INDEXER_CELLS)
                    .with_instance("i", pointer(1, 1, Direction::Right)),
            )
            .compile()
            .assert_empty()
            .assert_skipped(DOUBLERS, None, SkipReason::OutsideCellsPresent)
            .assert_skipped(NEGATORS, None, SkipReason::OutsideCellsPresent)
            .assert_skipped(INDEXER_CELLS, None, SkipReason::OutsideCellsPresent);
    }

    #[test]
    fn test_indexer_cells() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(INDEXER_CELLS)
                    .with_instance("row", pointer(0, 0, Direction::Right))
                    .with_instance("col", pointer(2, 4, Direction::Down))
                    .with_instance("diag", pointer(4, 4, Direction::DownRight)),
            )
            .compile()
            .assert_constraint("grid[1,grid[1,1]] = 1")
            .assert_constraint("grid[grid[3,5],5] = 3")
            .assert_constraint_count(2)
            .assert_skipped(INDEXER_CELLS, Some("diag"), SkipReason::UnsupportedDirection);
    }
}
