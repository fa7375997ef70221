//! Line tools: rules along an ordered path of cells.
//!
//! A path whose last cell repeats its first is a loop (see
//! [`LinePath`](crate::codegen::LinePath)); rules over adjacent cells then
//! also relate the last cell to the first.

use crate::{
    codegen::{
        Reading, cell_refs, for_each_instance, line_path, simple_line_pairs, unordered_pairs,
    },
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintsElement, InstanceShape},
    registry::FnCompiler,
    value::ParseOptions,
};

/// Digits strictly increase from the bulb.
pub const THERMOMETER: &str = "thermometer";
/// Digits never decrease from the bulb.
pub const SLOW_THERMOMETER: &str = "slow_thermometer";
/// Shaft digits sum to the bulb (the first cell).
pub const ARROW: &str = "arrow";
/// The line reads the same in both directions.
pub const PALINDROME: &str = "palindrome";
/// A set of distinct consecutive digits in any order.
pub const RENBAN: &str = "renban";
/// Adjacent digits differ by at least 5, or by the clue.
pub const GERMAN_WHISPERS: &str = "german_whispers";
/// Adjacent digits differ by at least 4, or by the clue.
pub const DUTCH_WHISPERS: &str = "dutch_whispers";
/// No two digits on the line are equal or consecutive.
pub const NABNER: &str = "nabner";
/// Adjacent digits have different parity.
pub const PARITY_LINE: &str = "parity_line";
/// Digits strictly between the two end digits.
pub const BETWEEN_LINE: &str = "between_line";
/// Each region the line passes through holds the same sum on the line.
pub const REGION_SUM_LINE: &str = "region_sum_line";
/// Cells equally far from the center sum to the center.
pub const ZIPPER_LINE: &str = "zipper_line";

pub(super) const COMPILERS: &[FnCompiler] = &[
    FnCompiler::new(THERMOMETER, InstanceShape::Line, thermometer),
    FnCompiler::new(SLOW_THERMOMETER, InstanceShape::Line, slow_thermometer),
    FnCompiler::new(ARROW, InstanceShape::Line, arrow),
    FnCompiler::new(PALINDROME, InstanceShape::Line, palindrome),
    FnCompiler::new(RENBAN, InstanceShape::Line, renban),
    FnCompiler::new(GERMAN_WHISPERS, InstanceShape::Line, german_whispers),
    FnCompiler::new(DUTCH_WHISPERS, InstanceShape::Line, dutch_whispers),
    FnCompiler::new(NABNER, InstanceShape::Line, nabner),
    FnCompiler::new(PARITY_LINE, InstanceShape::Line, parity_line),
    FnCompiler::new(BETWEEN_LINE, InstanceShape::Line, between_line),
    FnCompiler::new(REGION_SUM_LINE, InstanceShape::Line, region_sum_line),
    FnCompiler::new(ZIPPER_LINE, InstanceShape::Line, zipper_line),
];

fn thermometer(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_line_pairs(model, element, Reading::Digits, Expr::less_than)
}

fn slow_thermometer(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_line_pairs(model, element, Reading::Digits, Expr::at_most)
}

fn arrow(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let mut refs = cell_refs(model, path.cells(), Reading::Values)?;
        if refs.len() < 2 {
            return Err(SkipReason::GeometryMismatch);
        }
        let bulb = refs.remove(0);
        fragment.constrain(Expr::sum(refs).equals(bulb));
        Ok(())
    })
}

fn palindrome(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let refs = cell_refs(model, path.cells(), Reading::Digits)?;
        for (a, b) in mirrored_pairs(&refs) {
            fragment.constrain(a.equals(b));
        }
        Ok(())
    })
}

fn renban(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let refs = cell_refs(model, path.cells(), Reading::Digits)?;
        let span = i64::try_from(refs.len()).map_err(|_| SkipReason::GeometryMismatch)? - 1;
        let cells = Expr::array(refs);
        fragment.constrain(Expr::call("all_different", vec![cells.clone()]));
        fragment.constrain(
            (Expr::call("max", vec![cells.clone()]) - Expr::call("min", vec![cells]))
                .equals(Expr::int(span)),
        );
        Ok(())
    })
}

fn german_whispers(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    whispers(model, element, "5")
}

fn dutch_whispers(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    whispers(model, element, "4")
}

fn whispers(
    model: &mut PuzzleModel<'_>,
    element: &ConstraintsElement,
    default_gap: &str,
) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let refs = cell_refs(model, path.cells(), Reading::Digits)?;
        let gap = model
            .resolve_into(fragment, instance.value_text(), default_gap, ParseOptions::VARIABLE)
            .ok_or(SkipReason::UnparseableValue)?;
        for (i, j) in path.adjacent_pairs() {
            fragment.constrain((refs[i].clone() - refs[j].clone()).abs().at_least(gap.clone()));
        }
        Ok(())
    })
}

fn nabner(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let refs = cell_refs(model, path.cells(), Reading::Digits)?;
        for (a, b) in unordered_pairs(&refs) {
            fragment.constrain((a - b).abs().greater_than(Expr::int(1)));
        }
        Ok(())
    })
}

fn parity_line(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    simple_line_pairs(model, element, Reading::Digits, |a, b| {
        (a + b).modulo(Expr::int(2)).equals(Expr::int(1))
    })
}

fn between_line(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let refs = cell_refs(model, path.cells(), Reading::Digits)?;
        let [first, middle @ .., last] = refs.as_slice() else {
            return Err(SkipReason::GeometryMismatch);
        };
        let low = Expr::call("min", vec![first.clone(), last.clone()]);
        let high = Expr::call("max", vec![first.clone(), last.clone()]);
        for cell in middle {
            fragment.constrain(
                cell.clone()
                    .greater_than(low.clone())
                    .and(cell.clone().less_than(high.clone())),
            );
        }
        Ok(())
    })
}

fn region_sum_line(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        // every cell must exist before splitting, which drops missing cells
        cell_refs(model, path.cells(), Reading::Values)?;
        let grid = model.grid();
        let mut segments = grid.split_by_region(path.cells());
        if path.is_circular() && segments.len() > 1 {
            let first_region = segments.first().and_then(|s| s.first()).map(|&p| grid.region_of(p));
            let last_region = segments.last().and_then(|s| s.first()).map(|&p| grid.region_of(p));
            if first_region == last_region
                && let Some(mut tail) = segments.pop()
                && let Some(head) = segments.first_mut()
            {
                tail.append(head);
                *head = tail;
            }
        }
        if segments.len() < 2 {
            return Ok(());
        }
        let mut sums = Vec::with_capacity(segments.len());
        for segment in &segments {
            sums.push(Expr::sum(cell_refs(model, segment, Reading::Values)?));
        }
        let (head, rest) = sums.split_at(1);
        for sum in rest {
            fragment.constrain(head[0].clone().equals(sum.clone()));
        }
        Ok(())
    })
}

fn zipper_line(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let path = line_path(instance)?;
        let refs = cell_refs(model, path.cells(), Reading::Values)?;
        if refs.len() < 2 {
            return Err(SkipReason::GeometryMismatch);
        }
        let sums: Vec<_> = mirrored_pairs(&refs).map(|(a, b)| a + b).collect();
        let target = if refs.len() % 2 == 1 {
            refs[refs.len() / 2].clone()
        } else {
            sums[0].clone()
        };
        let skip = usize::from(refs.len() % 2 == 0);
        for sum in sums.into_iter().skip(skip) {
            fragment.constrain(sum.equals(target.clone()));
        }
        Ok(())
    })
}

/// Pairs the `i`-th cell from the start with the `i`-th from the end.
fn mirrored_pairs(refs: &[Expr]) -> impl Iterator<Item = (Expr, Expr)> + '_ {
    let n = refs.len();
    (0..n / 2).map(move |i| (refs[i].clone(), refs[n - 1 - i].clone()))
}
