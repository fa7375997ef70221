//! Outside clues: a cell plus a direction pointing into the grid.
//!
//! The clue cell usually lies off the grid. The constrained cells are the
//! ray from that cell in the clue's direction, nearest first.

use crate::{
    codegen::{Reading, cell_refs, clue_direction, default_name, for_each_instance, outside_cells},
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintInstance, ConstraintsElement, InstanceShape},
    registry::FnCompiler,
    value::ParseOptions,
};

/// Cells along the diagonal sum to the clue.
pub const LITTLE_KILLER_SUM: &str = "little_killer_sum";
/// Digits between the smallest and largest digit of the row or column sum to the clue.
pub const SANDWICH_SUM: &str = "sandwich_sum";
/// The first X cells sum to the clue, where X is the first digit.
pub const X_SUM: &str = "x_sum";
/// The clue counts the digits visible from outside, taller digits hiding shorter ones.
pub const SKYSCRAPER: &str = "skyscraper";

pub(super) const COMPILERS: &[FnCompiler] = &[
    FnCompiler::new(LITTLE_KILLER_SUM, InstanceShape::CellDirection, little_killer_sum),
    FnCompiler::new(SANDWICH_SUM, InstanceShape::CellDirection, sandwich_sum),
    FnCompiler::new(X_SUM, InstanceShape::CellDirection, x_sum),
    FnCompiler::new(SKYSCRAPER, InstanceShape::CellDirection, skyscraper),
];

/// Resolves the clue after its cells, using `prefix` for the default name.
fn resolve_clue(
    model: &mut PuzzleModel<'_>,
    fragment: &mut Fragment,
    instance: &ConstraintInstance,
    prefix: &str,
) -> Result<Expr, SkipReason> {
    let (cell, _) = clue_direction(instance)?;
    model
        .resolve_into(
            fragment,
            instance.value_text(),
            &default_name(prefix, cell),
            ParseOptions::ALL,
        )
        .ok_or(SkipReason::UnparseableValue)
}

fn little_killer_sum(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let (cells, direction) = outside_cells(model, instance)?;
        if !direction.is_diagonal() {
            return Err(SkipReason::UnsupportedDirection);
        }
        if cells.is_empty() {
            return Err(SkipReason::EmptyFootprint);
        }
        let refs = cell_refs(model, &cells, Reading::Values)?;
        let total = resolve_clue(model, fragment, instance, "little_killer")?;
        fragment.constrain(Expr::sum(refs).equals(total));
        Ok(())
    })
}

fn sandwich_sum(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    orthogonal_clue(model, element, "sandwich", |model, cells, clue| {
        Expr::call(
            "sandwich_p",
            vec![
                Expr::array(cells),
                clue,
                Expr::int(model.min_digit()),
                Expr::int(model.max_digit()),
            ],
        )
    })
}

fn x_sum(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    orthogonal_clue(model, element, "x_sum", |_, cells, clue| {
        Expr::call("x_sum_p", vec![Expr::array(cells), clue])
    })
}

fn skyscraper(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    orthogonal_clue(model, element, "skyscraper", |_, cells, clue| {
        Expr::call("skyscraper_p", vec![Expr::array(cells), clue])
    })
}

/// Shared shape of clues that read a whole row or column.
fn orthogonal_clue<F>(
    model: &mut PuzzleModel<'_>,
    element: &ConstraintsElement,
    prefix: &str,
    rule: F,
) -> Fragment
where
    F: Fn(&PuzzleModel<'_>, Vec<Expr>, Expr) -> Expr,
{
    for_each_instance(model, element, |model, instance, fragment| {
        let (cells, direction) = outside_cells(model, instance)?;
        if direction.is_diagonal() {
            return Err(SkipReason::UnsupportedDirection);
        }
        if cells.is_empty() {
            return Err(SkipReason::EmptyFootprint);
        }
        let refs = cell_refs(model, &cells, Reading::Digits)?;
        let clue = resolve_clue(model, fragment, instance, prefix)?;
        fragment.constrain(rule(model, refs, clue));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use gridcsp_core::{Direction, Position};

    use super::*;
    use crate::testing::CompileTester;

    fn clue(row: i32, col: i32, direction: Direction) -> ConstraintInstance {
        ConstraintInstance::cell_direction(Position::new(row, col), direction)
    }

    #[test]
    fn test_little_killer_from_outside() {
        CompileTester::standard(4)
            .with_element(ConstraintsElement::new(LITTLE_KILLER_SUM).with_instance(
                "lk",
                clue(-1, 0, Direction::DownRight).with_value("10"),
            ))
            .compile()
            .assert_constraint("sum([grid[1,2], grid[2,3], grid[3,4]]) = 10")
            .assert_constraint_count(1);
    }

    #[test]
    fn test_little_killer_off_grid_corner_is_empty() {
        CompileTester::standard(9)
            .with_element(ConstraintsElement::new(LITTLE_KILLER_SUM).with_instance(
                "lk",
                clue(0, 8, Direction::UpRight).with_value("5"),
            ))
            .compile()
            .assert_empty()
            .assert_skipped(LITTLE_KILLER_SUM, Some("lk"), SkipReason::EmptyFootprint);
    }

    #[test]
    fn test_little_killer_rejects_orthogonal() {
        CompileTester::standard(4)
            .with_element(ConstraintsElement::new(LITTLE_KILLER_SUM).with_instance(
                "lk",
                clue(-1, 0, Direction::Down).with_value("10"),
            ))
            .compile()
            .assert_empty()
            .assert_skipped(LITTLE_KILLER_SUM, Some("lk"), SkipReason::UnsupportedDirection);
    }

    #[test]
    fn test_sandwich_uses_digit_bounds() {
        CompileTester::standard(4)
            .with_element(ConstraintsElement::new(SANDWICH_SUM).with_instance(
                "s",
                clue(0, -1, Direction::Right).with_value("3"),
            ))
            .compile()
            .assert_constraint("sandwich_p([grid[1,1], grid[1,2], grid[1,3], grid[1,4]], 3, 1, 4)");
    }

    #[test]
    fn test_x_sum_and_skyscraper_default_names() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(X_SUM).with_instance("x", clue(4, 1, Direction::Up)),
            )
            .with_element(
                ConstraintsElement::new(SKYSCRAPER)
                    .with_instance("s", clue(-1, 3, Direction::Down).with_value("2")),
            )
            .compile()
            .assert_line("var int: x_sum_r5c2;")
            .assert_constraint("x_sum_p([grid[4,2], grid[3,2], grid[2,2], grid[1,2]], x_sum_r5c2)")
            .assert_constraint("skyscraper_p([grid[1,4], grid[2,4], grid[3,4], grid[4,4]], 2)");
    }
}
