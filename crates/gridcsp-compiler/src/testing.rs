//! Test utilities for tool generators.
//!
//! [`CompileTester`] builds a puzzle, compiles it with every registered tool
//! and default settings, and checks the emitted statements:
//!
//! ```ignore
//! CompileTester::standard(9)
//!     .with_element(ConstraintsElement::new(ODD).with_instance("o", cell))
//!     .compile()
//!     .assert_constraint("(grid[1,1] mod 2) = 1")
//!     .assert_constraint_count(1);
//! ```

use std::str::FromStr as _;

use gridcsp_core::Grid;

use crate::{
    assembler::{CompiledModel, ModelAssembler},
    ir::Statement,
    model::{SkipDiagnostic, SkipReason},
    puzzle::{ConstraintsElement, Puzzle},
    registry::CompilerRegistry,
};

/// A test harness for compiling a puzzle and asserting on the model text.
///
/// # Method Chaining
///
/// All methods return `self`, enabling fluent method chaining for readable tests.
///
/// # Panics
///
/// All assertion methods panic with detailed messages on failure, using
/// `#[track_caller]` to report the correct source location.
#[derive(Debug)]
pub struct CompileTester {
    puzzle: Puzzle,
}

impl CompileTester {
    /// Creates a tester for a puzzle on `grid`.
    pub fn new(grid: Grid) -> Self {
        Self {
            puzzle: Puzzle::new(grid),
        }
    }

    /// Creates a tester for a `size`×`size` grid with standard boxes.
    pub fn standard(size: usize) -> Self {
        Self::new(Grid::standard(size))
    }

    /// Creates a tester from a layout string (see [`Grid::from_str`]).
    ///
    /// # Panics
    ///
    /// Panics if the layout cannot be parsed.
    #[track_caller]
    pub fn from_layout(s: &str) -> Self {
        Self::new(Grid::from_str(s).unwrap())
    }

    /// Adds a constraints element.
    #[must_use]
    pub fn with_element(mut self, element: ConstraintsElement) -> Self {
        self.puzzle.add_element(element);
        self
    }

    /// Compiles the puzzle with all tools registered.
    ///
    /// # Panics
    ///
    /// Panics if compilation fails.
    #[track_caller]
    pub fn compile(self) -> CompiledTester {
        let registry = CompilerRegistry::with_all_tools();
        let model = ModelAssembler::new(&registry).compile(&self.puzzle).unwrap();
        CompiledTester { model }
    }
}

/// The result of [`CompileTester::compile`].
#[derive(Debug)]
pub struct CompiledTester {
    model: CompiledModel,
}

impl CompiledTester {
    fn constraints(&self) -> impl Iterator<Item = String> + '_ {
        self.model
            .statements()
            .iter()
            .filter_map(|statement| match statement {
                Statement::Constrain(expr) => Some(expr.to_string()),
                _ => None,
            })
    }

    /// Asserts that `constraint {expr};` was emitted.
    #[track_caller]
    pub fn assert_constraint(self, expr: &str) -> Self {
        assert!(
            self.constraints().any(|c| c == expr),
            "missing constraint `{expr}` in:\n{}",
            self.model
        );
        self
    }

    /// Asserts that no constraint contains `fragment`.
    #[track_caller]
    pub fn assert_no_constraint_containing(self, fragment: &str) -> Self {
        let found: Vec<_> = self.constraints().filter(|c| c.contains(fragment)).collect();
        assert!(found.is_empty(), "unexpected `{fragment}` in {found:?}");
        self
    }

    /// Asserts the number of constraint lines.
    #[track_caller]
    pub fn assert_constraint_count(self, expected: usize) -> Self {
        let count = self.constraints().count();
        assert_eq!(count, expected, "constraint count mismatch in:\n{}", self.model);
        self
    }

    /// Asserts that the text contains `line` as a whole line.
    #[track_caller]
    pub fn assert_line(self, line: &str) -> Self {
        let text = self.model.text();
        assert!(text.lines().any(|l| l == line), "missing line `{line}` in:\n{text}");
        self
    }

    /// Asserts that exactly one declaration introduces `name`.
    #[track_caller]
    pub fn assert_declared_once(self, name: &str) -> Self {
        let count = self
            .model
            .statements()
            .iter()
            .filter(|statement| matches!(statement, Statement::Declare(d) if d.name() == name))
            .count();
        assert_eq!(count, 1, "`{name}` declared {count} times in:\n{}", self.model);
        self
    }

    /// Asserts that nothing was emitted.
    #[track_caller]
    pub fn assert_empty(self) -> Self {
        assert!(self.model.is_empty(), "expected no output, got:\n{}", self.model);
        self
    }

    /// Asserts that no rule was skipped.
    #[track_caller]
    pub fn assert_no_skips(self) -> Self {
        assert!(
            self.model.diagnostics().is_empty(),
            "unexpected skips: {:?}",
            self.model.diagnostics()
        );
        self
    }

    /// Asserts that a skip with the given tool, instance and reason was recorded.
    #[track_caller]
    pub fn assert_skipped(
        self,
        tool_id: &str,
        instance_id: Option<&str>,
        reason: SkipReason,
    ) -> Self {
        let expected = SkipDiagnostic {
            tool_id: tool_id.to_owned(),
            instance_id: instance_id.map(str::to_owned),
            reason,
        };
        assert!(
            self.model.diagnostics().contains(&expected),
            "missing skip `{expected}` in {:?}",
            self.model.diagnostics()
        );
        self
    }
}
