//! Cage tools: rules over an arbitrary set of cells.

use gridcsp_core::Position;

use crate::{
    codegen::{
        Reading, cage_adjacency, cage_cells, cell_refs, default_name, for_each_instance,
        group_by_value, simple_cage,
    },
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintsElement, InstanceGeometry, InstanceShape},
    registry::FnCompiler,
    value::ParseOptions,
};

/// Killer cage: digits differ and sum to the clue.
pub const KILLER_CAGE: &str = "killer_cage";
/// Product cage: digits differ and multiply to the clue.
pub const PRODUCT_CAGE: &str = "product_cage";
/// Cage whose digits differ, without a total.
pub const UNIQUE_CAGE: &str = "unique_cage";
/// An additional region whose digits differ.
pub const EXTRA_REGION: &str = "extra_region";
/// Two cell lists holding the same digits in the same order.
pub const CLONE: &str = "clone";
/// Cages with the same label hold the same multiset of digits.
pub const SAME_MULTISET_CAGES: &str = "same_multiset_cages";

/// Killer flag: no two cages have the same total.
pub const ALL_CAGE_TOTALS_ARE_DIFFERENT: &str = "ALL_CAGE_TOTALS_ARE_DIFFERENT";
/// Killer flag: cages sharing an edge have different totals.
pub const ADJACENT_CAGE_TOTALS_DIFFER: &str = "ADJACENT_CAGE_TOTALS_DIFFER";

pub(super) const COMPILERS: &[FnCompiler] = &[
    FnCompiler::new(KILLER_CAGE, InstanceShape::Cage, killer_cage),
    FnCompiler::new(PRODUCT_CAGE, InstanceShape::Cage, product_cage),
    FnCompiler::new(UNIQUE_CAGE, InstanceShape::Cage, unique_cage),
    FnCompiler::new(EXTRA_REGION, InstanceShape::Cage, unique_cage),
    FnCompiler::new(CLONE, InstanceShape::Clone, clone),
    FnCompiler::new(SAME_MULTISET_CAGES, InstanceShape::Cage, same_multiset_cages),
];

fn killer_cage(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    let mut cages: Vec<(Vec<Position>, Expr)> = Vec::new();
    let mut fragment = for_each_instance(model, element, |model, instance, fragment| {
        let cells = cage_cells(instance)?;
        let refs = cell_refs(model, cells, Reading::Values)?;
        let total = model
            .resolve_into(
                fragment,
                instance.value_text(),
                &default_name("killer_total", cells[0]),
                ParseOptions::ALL,
            )
            .ok_or(SkipReason::UnparseableValue)?;
        fragment.constrain(Expr::call("sum_cage_p", vec![Expr::array(refs), total.clone()]));
        cages.push((cells.to_vec(), total));
        Ok(())
    });

    if element.has_flag(ALL_CAGE_TOTALS_ARE_DIFFERENT) && cages.len() > 1 {
        let totals = cages.iter().map(|(_, total)| total.clone());
        fragment.constrain(Expr::call("all_different", vec![Expr::array(totals)]));
    }
    if element.has_flag(ADJACENT_CAGE_TOTALS_DIFFER) {
        let cells: Vec<_> = cages.iter().map(|(cells, _)| cells.clone()).collect();
        for (i, j) in cage_adjacency(&cells) {
            fragment.constrain(cages[i].1.clone().not_equals(cages[j].1.clone()));
        }
    }
    fragment
}

fn product_cage(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let cells = cage_cells(instance)?;
        let refs = cell_refs(model, cells, Reading::Values)?;
        let total = model
            .resolve_into(
                fragment,
                instance.value_text(),
                &default_name("product_total", cells[0]),
                ParseOptions::ALL,
            )
            .ok_or(SkipReason::UnparseableValue)?;
        fragment.constrain(Expr::call("product_cage_p", vec![Expr::array(refs), total]));
        Ok(())
    })
}

fn unique_cage(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_cage(model, element, Reading::Digits, |cells| {
        Expr::call("all_different", vec![Expr::array(cells)])
    })
}

fn clone(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let InstanceGeometry::Clone { cells, clone_cells } = &instance.geometry else {
            return Err(SkipReason::GeometryMismatch);
        };
        if cells.len() != clone_cells.len() {
            return Err(SkipReason::GeometryMismatch);
        }
        if cells.is_empty() {
            return Err(SkipReason::EmptyFootprint);
        }
        let original = cell_refs(model, cells, Reading::Digits)?;
        let copy = cell_refs(model, clone_cells, Reading::Digits)?;
        fragment.constrain(Expr::array(original).equals(Expr::array(copy)));
        Ok(())
    })
}

fn same_multiset_cages(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    let mut fragment = Fragment::new();
    for (label, members) in group_by_value(element) {
        let mut first: Option<(usize, Expr)> = None;
        for (id, instance) in members {
            let refs = cage_cells(instance)
                .and_then(|cells| cell_refs(model, cells, Reading::Digits));
            let refs = match refs {
                Ok(refs) => refs,
                Err(reason) => {
                    model.skip(element.tool_id(), Some(id), reason);
                    continue;
                }
            };
            let len = refs.len();
            let sorted = Expr::call("sort", vec![Expr::array(refs)]);
            let Some((first_len, first_sorted)) = &first else {
                first = Some((len, sorted));
                continue;
            };
            if *first_len != len {
                log::debug!("{label}: cage {id} has {len} cells, expected {first_len}");
                model.skip(element.tool_id(), Some(id), SkipReason::GeometryMismatch);
                continue;
            }
            fragment.constrain(first_sorted.clone().equals(sorted));
        }
    }
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{puzzle::ConstraintInstance, testing::CompileTester};

    fn pos(row: i32, col: i32) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_killer_cage_literal_total() {
        CompileTester::standard(9)
            .with_element(ConstraintsElement::new(KILLER_CAGE).with_instance(
                "c1",
                ConstraintInstance::cage([pos(0, 0), pos(0, 1)]).with_value("10"),
            ))
            .compile()
            .assert_constraint("sum_cage_p([grid[1,1], grid[1,2]], 10)")
            .assert_constraint_count(1)
            .assert_no_skips();
    }

    #[test]
    fn test_killer_cage_interval_total() {
        CompileTester::standard(9)
            .with_element(ConstraintsElement::new(KILLER_CAGE).with_instance(
                "c1",
                ConstraintInstance::cage([pos(4, 4)]).with_value("3-5"),
            ))
            .compile()
            .assert_line("var 3..5: killer_total_r5c5;")
            .assert_constraint("sum_cage_p([grid[5,5]], killer_total_r5c5)");
    }

    #[test]
    fn test_all_cage_totals_are_different() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(KILLER_CAGE)
                    .with_instance("a", ConstraintInstance::cage([pos(0, 0), pos(0, 1)]))
                    .with_instance("b", ConstraintInstance::cage([pos(5, 5), pos(5, 6)]))
                    .with_flag(ALL_CAGE_TOTALS_ARE_DIFFERENT),
            )
            .compile()
            .assert_declared_once("killer_total_r1c1")
            .assert_declared_once("killer_total_r6c6")
            .assert_constraint("all_different([killer_total_r1c1, killer_total_r6c6])");
    }

    #[test]
    fn test_adjacent_cage_totals_differ() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(KILLER_CAGE)
                    .with_instance("a", ConstraintInstance::cage([pos(0, 0)]).with_value("x"))
                    .with_instance("b", ConstraintInstance::cage([pos(0, 1)]).with_value("y"))
                    .with_instance("c", ConstraintInstance::cage([pos(8, 8)]).with_value("x"))
                    .with_flag(ADJACENT_CAGE_TOTALS_DIFFER),
            )
            .compile()
            .assert_declared_once("x")
            .assert_declared_once("y")
            .assert_constraint("x != y")
            .assert_constraint_count(4);
    }

    #[test]
    fn test_killer_cage_missing_cell_is_skipped() {
        CompileTester::standard(4)
            .with_element(ConstraintsElement::new(KILLER_CAGE).with_instance(
                "c1",
                ConstraintInstance::cage([pos(0, 0), pos(4, 0)]).with_value("7"),
            ))
            .compile()
            .assert_empty()
            .assert_skipped(KILLER_CAGE, Some("c1"), SkipReason::MissingCell);
    }

    #[test]
    fn test_product_and_unique_cages() {
        CompileTester::standard(9)
            .with_element(ConstraintsElement::new(PRODUCT_CAGE).with_instance(
                "p",
                ConstraintInstance::cage([pos(0, 0), pos(1, 0)]).with_value("12"),
            ))
            .with_element(ConstraintsElement::new(EXTRA_REGION).with_instance(
                "r",
                ConstraintInstance::cage([pos(2, 2), pos(3, 3), pos(4, 4)]),
            ))
            .compile()
            .assert_constraint("product_cage_p([grid[1,1], grid[2,1]], 12)")
            .assert_constraint("all_different([grid[3,3], grid[4,4], grid[5,5]])");
    }

    #[test]
    fn test_clone() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(CLONE)
                    .with_instance(
                        "ok",
                        ConstraintInstance::clone_of(
                            [pos(0, 0), pos(0, 1)],
                            [pos(4, 4), pos(4, 5)],
                        ),
                    )
                    .with_instance(
                        "bad",
                        ConstraintInstance::clone_of([pos(0, 0)], [pos(4, 4), pos(4, 5)]),
                    ),
            )
            .compile()
            .assert_constraint("[grid[1,1], grid[1,2]] = [grid[5,5], grid[5,6]]")
            .assert_constraint_count(1)
            .assert_skipped(CLONE, Some("bad"), SkipReason::GeometryMismatch);
    }

    fn labeled(cells: &[Position], label: &str) -> ConstraintInstance {
        ConstraintInstance::cage(cells.iter().copied()).with_value(label)
    }

    #[test]
    fn test_same_multiset_cages() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(SAME_MULTISET_CAGES)
                    .with_instance("a", labeled(&[pos(0, 0), pos(0, 1)], "A"))
                    .with_instance("b", labeled(&[pos(8, 7), pos(8, 8)], "A"))
                    .with_instance("c", labeled(&[pos(4, 4)], "B"))
                    .with_instance("d", labeled(&[pos(5, 5)], "A")),
            )
            .compile()
            .assert_constraint("sort([grid[1,1], grid[1,2]]) = sort([grid[9,8], grid[9,9]])")
            .assert_constraint_count(1)
            .assert_skipped(SAME_MULTISET_CAGES, Some("d"), SkipReason::GeometryMismatch);
    }
}
