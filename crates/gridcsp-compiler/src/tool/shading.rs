//! Shading puzzles layered on top of the digit grid.

use crate::{
    codegen::{for_each_instance, single_cell},
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintsElement, InstanceShape},
    registry::FnCompiler,
    shared::SharedGrid,
};

/// Every cell is shaded or unshaded, each color forms one orthogonally
/// connected group, and no 2×2 window is a single color.
///
/// Instances are given cells whose value is the shade, `0` or `1`.
pub const YIN_YANG: &str = "yin_yang";

pub(super) const COMPILERS: &[FnCompiler] =
    &[FnCompiler::new(YIN_YANG, InstanceShape::Cell, yin_yang)];

fn yin_yang(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    let shading = model.ensure_shared_grid(SharedGrid::YinYang);
    let grid = model.grid();

    let mut fragment = Fragment::new();
    for pos in grid.inside_positions() {
        let window = [pos, pos.offset(0, 1), pos.offset(1, 0), pos.offset(1, 1)];
        if window.iter().all(|&p| grid.is_inside(p)) {
            let cells = window.into_iter().map(|p| Expr::cell(shading, p));
            fragment.constrain(Expr::sum(cells).within(Expr::Range(1, 3)));
        }
    }
    fragment.constrain(Expr::call("yin_yang_connected_p", vec![Expr::name(shading)]));

    fragment.append(for_each_instance(model, element, |model, instance, fragment| {
        let pos = single_cell(instance)?;
        if !model.grid().is_inside(pos) {
            return Err(SkipReason::MissingCell);
        }
        let shade = match instance.value_text() {
            "" => return Err(SkipReason::MissingValue),
            "0" => 0,
            "1" => 1,
            _ => return Err(SkipReason::UnparseableValue),
        };
        fragment.constrain(Expr::cell(shading, pos).equals(Expr::int(shade)));
        Ok(())
    }));
    fragment
}

#[cfg(test)]
mod tests {
    use gridcsp_core::Position;

    use super::*;
    use crate::{puzzle::ConstraintInstance, testing::CompileTester};

    #[test]
    fn test_yin_yang_without_clues() {
        CompileTester::standard(4)
            .with_element(ConstraintsElement::new(YIN_YANG))
            .compile()
            .assert_line("array[1..4, 1..4] of var 0..1: yin_yang_shading;")
            .assert_constraint(
                "sum([yin_yang_shading[1,1], yin_yang_shading[1,2], \
                 yin_yang_shading[2,1], yin_yang_shading[2,2]]) in 1..3",
            )
            .assert_constraint("yin_yang_connected_p(yin_yang_shading)")
            .assert_constraint_count(9 + 1);
    }

    fn clue(row: i32, col: i32, value: &str) -> ConstraintInstance {
        ConstraintInstance::cell(Position::new(row, col)).with_value(value)
    }

    #[test]
    fn test_yin_yang_clues() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(YIN_YANG)
                    .with_instance("black", clue(0, 0, "1"))
                    .with_instance("white", clue(3, 3, "0"))
                    .with_instance("grey", clue(1, 1, "2"))
                    .with_instance("off", clue(4, 0, "1")),
            )
            .compile()
            .assert_declared_once("yin_yang_shading")
            .assert_constraint("yin_yang_shading[1,1] = 1")
            .assert_constraint("yin_yang_shading[4,4] = 0")
            .assert_constraint_count(9 + 1 + 2)
            .assert_skipped(YIN_YANG, Some("grey"), SkipReason::UnparseableValue)
            .assert_skipped(YIN_YANG, Some("off"), SkipReason::MissingCell);
    }

    #[test]
    fn test_windows_skip_outside_cells() {
        CompileTester::from_layout(
            "
            #__
            ___
            ___
            ",
        )
        .with_element(ConstraintsElement::new(YIN_YANG))
        .compile()
        .assert_constraint_count(3 + 1);
    }
}
