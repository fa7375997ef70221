//! Single-cell markers.

use crate::{
    codegen::{Reading, cell_ref, for_each_instance, simple_cell, single_cell},
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintsElement, InstanceShape},
    registry::FnCompiler,
    value::ParseOptions,
};

/// The digit is odd.
pub const ODD: &str = "odd";
/// The digit is even.
pub const EVEN: &str = "even";
/// The digit is smaller than every orthogonal neighbor.
pub const MINIMUM: &str = "minimum";
/// The digit is larger than every orthogonal neighbor.
pub const MAXIMUM: &str = "maximum";
/// The digit equals the clue.
pub const GIVEN: &str = "given";

pub(super) const COMPILERS: &[FnCompiler] = &[
    FnCompiler::new(ODD, InstanceShape::Cell, odd),
    FnCompiler::new(EVEN, InstanceShape::Cell, even),
    FnCompiler::new(MINIMUM, InstanceShape::Cell, minimum),
    FnCompiler::new(MAXIMUM, InstanceShape::Cell, maximum),
    FnCompiler::new(GIVEN, InstanceShape::Cell, given),
];

fn odd(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_cell(model, element, |_, _, cell| {
        vec![cell.modulo(Expr::int(2)).equals(Expr::int(1))]
    })
}

fn even(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_cell(model, element, |_, _, cell| {
        vec![cell.modulo(Expr::int(2)).equals(Expr::int(0))]
    })
}

fn minimum(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_cell(model, element, |model, pos, cell| {
        model
            .grid()
            .orthogonal_neighbors(pos)
            .into_iter()
            .filter_map(|neighbor| model.digit_ref(neighbor))
            .map(|neighbor| cell.clone().less_than(neighbor))
            .collect()
    })
}

fn maximum(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_cell(model, element, |model, pos, cell| {
        model
            .grid()
            .orthogonal_neighbors(pos)
            .into_iter()
            .filter_map(|neighbor| model.digit_ref(neighbor))
            .map(|neighbor| cell.clone().greater_than(neighbor))
            .collect()
    })
}

fn given(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let cell = cell_ref(model, single_cell(instance)?, Reading::Digits)?;
        let text = instance.value_text();
        if text.is_empty() {
            return Err(SkipReason::MissingValue);
        }
        let value = model
            .resolve_into(fragment, text, "", ParseOptions::VARIABLE)
            .ok_or(SkipReason::UnparseableValue)?;
        fragment.constrain(cell.equals(value));
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use gridcsp_core::Position;

    use super::*;
    use crate::{puzzle::ConstraintInstance, testing::CompileTester};

    fn at(row: i32, col: i32) -> ConstraintInstance {
        ConstraintInstance::cell(Position::new(row, col))
    }

    #[test]
    fn test_parity_markers() {
        CompileTester::standard(9)
            .with_element(ConstraintsElement::new(ODD).with_instance("o", at(0, 0)))
            .with_element(ConstraintsElement::new(EVEN).with_instance("e", at(8, 8)))
            .compile()
            .assert_constraint("(grid[1,1] mod 2) = 1")
            .assert_constraint("(grid[9,9] mod 2) = 0")
            .assert_constraint_count(2);
    }

    #[test]
    fn test_minimum_in_corner_and_center() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(MINIMUM)
                    .with_instance("corner", at(0, 0))
                    .with_instance("center", at(4, 4)),
            )
            .compile()
            .assert_constraint("grid[1,1] < grid[1,2]")
            .assert_constraint("grid[1,1] < grid[2,1]")
            .assert_constraint("grid[5,5] < grid[4,5]")
            .assert_constraint_count(2 + 4);
    }

    #[test]
    fn test_maximum_skips_outside_neighbors() {
        let tester = CompileTester::from_layout(
            "
            #___
            ____
            ____
            ____
            ",
        );
        tester
            .with_element(ConstraintsElement::new(MAXIMUM).with_instance("m", at(0, 1)))
            .compile()
            .assert_constraint("grid[1,2] > grid[1,3]")
            .assert_constraint("grid[1,2] > grid[2,2]")
            .assert_constraint_count(2);
    }

    #[test]
    fn test_given_needs_a_value() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(GIVEN)
                    .with_instance("a", at(2, 2).with_value("7"))
                    .with_instance("b", at(3, 3))
                    .with_instance("c", at(4, 4).with_value("1-3")),
            )
            .compile()
            .assert_constraint("grid[3,3] = 7")
            .assert_constraint_count(1)
            .assert_skipped(GIVEN, Some("b"), SkipReason::MissingValue)
            .assert_skipped(GIVEN, Some("c"), SkipReason::UnparseableValue);
    }
}
