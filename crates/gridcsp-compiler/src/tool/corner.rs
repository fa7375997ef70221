//! Clues placed on the corner where up to four cells meet.

use std::collections::BTreeMap;

use crate::{
    codegen::{Reading, cell_refs, for_each_instance},
    ir::{Expr, Fragment},
    model::{PuzzleModel, SkipReason},
    puzzle::{ConstraintsElement, InstanceGeometry, InstanceShape},
    registry::FnCompiler,
};

/// Each listed digit appears in the cells around the corner, repeats included.
pub const QUADRUPLE: &str = "quadruple";

pub(super) const COMPILERS: &[FnCompiler] =
    &[FnCompiler::new(QUADRUPLE, InstanceShape::Corner, quadruple)];

/// Parses `"1,2,2"`, `"1 2 2"` or `"122"` into digits with their counts.
fn parse_digits(text: &str) -> Option<BTreeMap<i64, usize>> {
    let digits: Option<Vec<i64>> = if text.contains([',', ' ']) {
        text.split([',', ' '])
            .filter(|token| !token.is_empty())
            .map(|token| token.parse().ok())
            .collect()
    } else {
        text.chars()
            .map(|c| c.to_digit(10).map(i64::from))
            .collect()
    };
    let mut counts = BTreeMap::new();
    for digit in digits? {
        *counts.entry(digit).or_default() += 1;
    }
    (!counts.is_empty()).then_some(counts)
}

fn quadruple(model: &mut PuzzleModel<'_>, element: &ConstraintsElement) -> Fragment {
    for_each_instance(model, element, |model, instance, fragment| {
        let InstanceGeometry::Corner { cells } = &instance.geometry else {
            return Err(SkipReason::GeometryMismatch);
        };
        let grid = model.grid();
        let inside: Vec<_> = cells.iter().copied().filter(|&p| grid.is_inside(p)).collect();
        if inside.is_empty() {
            return Err(SkipReason::EmptyFootprint);
        }
        let text = instance.value_text();
        if text.is_empty() {
            return Err(SkipReason::MissingValue);
        }
        let counts = parse_digits(text).ok_or(SkipReason::UnparseableValue)?;
        let refs = cell_refs(model, &inside, Reading::Digits)?;
        for (digit, count) in counts {
            let hits = refs.iter().map(|cell| cell.clone().equals(Expr::int(digit)).to_int());
            let count = i64::try_from(count).unwrap_or(i64::MAX);
            fragment.constrain(Expr::sum(hits).at_least(Expr::int(count)));
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use gridcsp_core::Position;

    use super::*;
    use crate::{puzzle::ConstraintInstance, testing::CompileTester};

    fn corner(row: i32, col: i32) -> ConstraintInstance {
        ConstraintInstance::corner([
            Position::new(row, col),
            Position::new(row, col + 1),
            Position::new(row + 1, col),
            Position::new(row + 1, col + 1),
        ])
    }

    #[test]
    fn test_parse_digits() {
        assert_eq!(parse_digits("122"), Some(BTreeMap::from([(1, 1), (2, 2)])));
        assert_eq!(parse_digits("3, 4"), Some(BTreeMap::from([(3, 1), (4, 1)])));
        assert_eq!(parse_digits("1 1"), Some(BTreeMap::from([(1, 2)])));
        assert_eq!(parse_digits("1a"), None);
        assert_eq!(parse_digits(","), None);
    }

    #[test]
    fn test_quadruple() {
        CompileTester::standard(9)
            .with_element(
                ConstraintsElement::new(QUADRUPLE)
                    .with_instance("q", corner(0, 0).with_value("33")),
            )
            .compile()
            .assert_constraint(
                "sum([bool2int(grid[1,1] = 3), bool2int(grid[1,2] = 3), \
                 bool2int(grid[2,1] = 3), bool2int(grid[2,2] = 3)]) >= 2",
            )
            .assert_constraint_count(1);
    }

    #[test]
    fn test_quadruple_on_the_border_uses_inside_cells() {
        CompileTester::standard(4)
            .with_element(
                ConstraintsElement::new(QUADRUPLE)
                    .with_instance("edge", corner(-1, 0).with_value("1,2"))
                    .with_instance("off", corner(-3, -3).with_value("1"))
                    .with_instance("blank", corner(1, 1))
                    .with_instance("junk", corner(2, 2).with_value("x")),
            )
            .compile()
            .assert_constraint("sum([bool2int(grid[1,1] = 1), bool2int(grid[1,2] = 1)]) >= 1")
            .assert_constraint("sum([bool2int(grid[1,1] = 2), bool2int(grid[1,2] = 2)]) >= 1")
            .assert_constraint_count(2)
            .assert_skipped(QUADRUPLE, Some("off"), SkipReason::EmptyFootprint)
            .assert_skipped(QUADRUPLE, Some("blank"), SkipReason::MissingValue)
            .assert_skipped(QUADRUPLE, Some("junk"), SkipReason::UnparseableValue);
    }
}
