//! Edge clues between two orthogonally adjacent cells.
//!
//! Kropki dots and XV clues have a negative sub-rule: when every clue is
//! given, pairs without a clue must not satisfy the clue's relation.

use crate::{
    codegen::{Reading, covered_edges, negative_edges, simple_edge},
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintInstance, ConstraintsElement, InstanceShape},
    registry::FnCompiler,
    value::ParseOptions,
};

/// White dot: the digits differ by one (or by the clue).
pub const KROPKI_WHITE: &str = "kropki_white";
/// Black dot: one digit is double the other (or the clue times the other).
pub const KROPKI_BLACK: &str = "kropki_black";
/// X and V: the face values sum to 10 or 5.
pub const XV: &str = "xv";
/// The first cell is greater than the second.
pub const GREATER_THAN: &str = "greater_than";

/// White dot flag: every consecutive pair is marked.
pub const ALL_WHITE_DOTS_GIVEN: &str = "ALL_WHITE_DOTS_GIVEN";
/// Black dot flag: every double pair is marked.
pub const ALL_BLACK_DOTS_GIVEN: &str = "ALL_BLACK_DOTS_GIVEN";
/// XV flag: every pair summing to 5 or 10 is marked.
pub const ALL_XV_GIVEN: &str = "ALL_XV_GIVEN";

pub(super) const COMPILERS: &[FnCompiler] = &[
    FnCompiler::new(KROPKI_WHITE, InstanceShape::Edge, kropki_white),
    FnCompiler::new(KROPKI_BLACK, InstanceShape::Edge, kropki_black),
    FnCompiler::new(XV, InstanceShape::Edge, xv),
    FnCompiler::new(GREATER_THAN, InstanceShape::Edge, greater_than),
];

fn resolve_or(
    model: &mut PuzzleModel<'_>,
    fragment: &mut Fragment,
    instance: &ConstraintInstance,
    default: &str,
) -> Result<Expr, SkipReason> {
    model
        .resolve_into(fragment, instance.value_text(), default, ParseOptions::VARIABLE)
        .ok_or(SkipReason::UnparseableValue)
}

fn double(a: Expr, b: Expr, ratio: Expr) -> Expr {
    a.clone()
        .equals(ratio.clone() * b.clone())
        .or(b.equals(ratio * a))
}

fn kropki_white(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    let (mut fragment, mut covered) =
        simple_edge(model, element, Reading::Digits, |model, instance, fragment, a, b| {
            let gap = resolve_or(model, fragment, instance, "1")?;
            Ok((a - b).abs().equals(gap))
        });
    if element.has_flag(ALL_WHITE_DOTS_GIVEN) {
        covered.extend(covered_edges(model.puzzle().element(KROPKI_BLACK)));
        fragment.append(negative_edges(model, &covered, Reading::Digits, |a, b| {
            vec![(a - b).abs().not_equals(Expr::int(1))]
        }));
    }
    fragment
}

fn kropki_black(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    let (mut fragment, mut covered) =
        simple_edge(model, element, Reading::Digits, |model, instance, fragment, a, b| {
            let ratio = resolve_or(model, fragment, instance, "2")?;
            Ok(double(a, b, ratio))
        });
    if element.has_flag(ALL_BLACK_DOTS_GIVEN) {
        covered.extend(covered_edges(model.puzzle().element(KROPKI_WHITE)));
        fragment.append(negative_edges(model, &covered, Reading::Digits, |a, b| {
            vec![
                a.clone().not_equals(Expr::int(2) * b.clone()),
                b.not_equals(Expr::int(2) * a),
            ]
        }));
    }
    fragment
}

fn xv(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    let (mut fragment, covered) =
        simple_edge(model, element, Reading::Values, |model, instance, fragment, a, b| {
            let total = match instance.value_text() {
                "" => return Err(SkipReason::MissingValue),
                "X" | "x" => Expr::int(10),
                "V" | "v" => Expr::int(5),
                _ => resolve_or(model, fragment, instance, "")?,
            };
            Ok((a + b).equals(total))
        });
    if element.has_flag(ALL_XV_GIVEN) {
        fragment.append(negative_edges(model, &covered, Reading::Values, |a, b| {
            let sum = a + b;
            vec![
                sum.clone().not_equals(Expr::int(5)),
                sum.not_equals(Expr::int(10)),
            ]
        }));
    }
    fragment
}

fn greater_than(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    let (fragment, _) = simple_edge(model, element, Reading::Digits, |_, _, _, a, b| {
        Ok(a.greater_than(b))
    });
    fragment
}

#[cfg(test)]
mod tests {
    use gridcsp_core::Position;

    use super::*;
    use crate::testing::CompileTester;

    fn edge(a: (i32, i32), b: (i32, i32)) -> ConstraintInstance {
        ConstraintInstance::edge(Position::new(a.0, a.1), Position::new(b.0, b.1))
    }

    #[test]
    fn test_kropki_dots() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(KROPKI_WHITE).with_instance("w", edge((0, 0), (0, 1))),
            )
            .with_element(
                ConstraintsElement::new(KROPKI_BLACK).with_instance("b", edge((1, 0), (2, 0))),
            )
            .compile()
            .assert_constraint("abs(grid[1,1] - grid[1,2]) = 1")
            .assert_constraint("(grid[2,1] = (2 * grid[3,1])) \\/ (grid[3,1] = (2 * grid[2,1]))")
            .assert_constraint_count(2);
    }

    #[test]
    fn test_all_white_dots_given_excludes_black_dots() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(KROPKI_WHITE)
                    .with_instance("w", edge((0, 0), (0, 1)))
                    .with_flag(ALL_WHITE_DOTS_GIVEN),
            )
            .with_element(
                ConstraintsElement::new(KROPKI_BLACK).with_instance("b", edge((1, 1), (0, 1))),
            )
            .compile()
            .assert_constraint("abs(grid[1,2] - grid[1,3]) != 1")
            .assert_no_constraint_containing("abs(grid[1,2] - grid[2,2]) != 1")
            .assert_no_constraint_containing("abs(grid[1,1] - grid[1,2]) != 1")
            // 24 pairs, two covered, plus the two dots
            .assert_constraint_count(22 + 2);
    }

    #[test]
    fn test_all_black_dots_given() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(KROPKI_BLACK)
                    .with_instance("b", edge((0, 0), (0, 1)))
                    .with_flag(ALL_BLACK_DOTS_GIVEN),
            )
            .compile()
            .assert_constraint("grid[1,2] != (2 * grid[1,3])")
            .assert_constraint("grid[1,3] != (2 * grid[1,2])")
            .assert_constraint_count(1 + 23 * 2);
    }

    #[test]
    fn test_xv() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(XV)
                    .with_instance("x", edge((0, 0), (0, 1)).with_value("X"))
                    .with_instance("v", edge((1, 0), (1, 1)).with_value("v"))
                    .with_instance("n", edge((2, 0), (2, 1)).with_value("7"))
                    .with_instance("missing", edge((3, 0), (3, 1)))
                    .with_flag(ALL_XV_GIVEN),
            )
            .compile()
            .assert_constraint("(grid[1,1] + grid[1,2]) = 10")
            .assert_constraint("(grid[2,1] + grid[2,2]) = 5")
            .assert_constraint("(grid[3,1] + grid[3,2]) = 7")
            .assert_constraint("(grid[4,2] + grid[4,3]) != 5")
            .assert_no_constraint_containing("(grid[4,1] + grid[4,2]) != ")
            .assert_skipped(XV, Some("missing"), SkipReason::MissingValue)
            .assert_constraint_count(3 + 20 * 2);
    }

    #[test]
    fn test_skipped_dots_stay_out_of_negative_constraints() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(KROPKI_WHITE)
                    .with_instance("w", edge((0, 0), (0, 1)).with_value("q-"))
                    .with_flag(ALL_WHITE_DOTS_GIVEN),
            )
            .compile()
            .assert_skipped(KROPKI_WHITE, Some("w"), SkipReason::UnparseableValue)
            .assert_no_constraint_containing("abs(grid[1,1] - grid[1,2])")
            .assert_constraint_count(23);

        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(KROPKI_BLACK)
                    .with_instance("b", edge((3, 3), (2, 3)).with_value("1..."))
                    .with_flag(ALL_BLACK_DOTS_GIVEN),
            )
            .compile()
            .assert_skipped(KROPKI_BLACK, Some("b"), SkipReason::UnparseableValue)
            .assert_no_constraint_containing("grid[3,4] != (2 * grid[4,4])")
            .assert_no_constraint_containing("grid[4,4] != (2 * grid[3,4])")
            .assert_constraint_count(23 * 2);

        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(XV)
                    .with_instance("x", edge((1, 1), (1, 2)).with_value("?"))
                    .with_flag(ALL_XV_GIVEN),
            )
            .compile()
            .assert_skipped(XV, Some("x"), SkipReason::UnparseableValue)
            .assert_no_constraint_containing("(grid[2,2] + grid[2,3])")
            .assert_constraint_count(23 * 2);
    }

    #[test]
    fn test_greater_than_and_non_adjacent_edge() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(GREATER_THAN)
                    .with_instance("g", edge((0, 0), (1, 0)))
                    .with_instance("far", edge((0, 0), (2, 0))),
            )
            .compile()
            .assert_constraint("grid[1,1] > grid[2,1]")
            .assert_constraint_count(1)
            .assert_skipped(GREATER_THAN, Some("far"), SkipReason::GeometryMismatch);
    }
}
