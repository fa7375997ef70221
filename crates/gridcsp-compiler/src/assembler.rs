//! The compilation driver.
//!
//! [`ModelAssembler`] walks a puzzle's elements in declaration order, hands
//! each to its generator, and concatenates the fragments. Shared grids a
//! generator requested are emitted right before that generator's fragment, so
//! every name is declared before the first constraint that reads it.

use std::fmt::{self, Display};

use crate::{
    ir::{Expr, Statement},
    model::{PuzzleModel, SkipDiagnostic},
    puzzle::{InstanceShape, Puzzle},
    registry::CompilerRegistry,
    shared::SharedGrid,
};

/// Output settings for [`ModelAssembler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssemblerSettings {
    /// Emit a `% <tool id>` comment ahead of each non-empty fragment.
    pub tool_comments: bool,
    /// Emit `grid[r,c] = v` for the grid's given digits ahead of the
    /// elements. Off by default; the `given` tool covers givens placed as
    /// elements.
    pub givens: bool,
}

impl Default for AssemblerSettings {
    fn default() -> Self {
        Self {
            tool_comments: true,
            givens: false,
        }
    }
}

/// Errors that abort a compilation.
///
/// Everything else a generator cannot handle is reported as a
/// [`SkipDiagnostic`] instead.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum CompileError {
    /// An instance's shape differs from the shape its generator expects.
    #[display("instance {instance_id:?} of {tool_id} is a {found}, expected a {expected}")]
    ShapeMismatch {
        /// Tool id of the element.
        tool_id: String,
        /// Offending instance.
        instance_id: String,
        /// Shape the generator expects.
        expected: InstanceShape,
        /// Shape the instance has.
        found: InstanceShape,
    },
}

/// Compiles puzzles with the generators of a [`CompilerRegistry`].
///
/// # Examples
///
/// ```
/// use gridcsp_compiler::{
///     assembler::ModelAssembler,
///     puzzle::{ConstraintInstance, ConstraintsElement, Puzzle},
///     registry::CompilerRegistry,
/// };
/// use gridcsp_core::{Grid, Position};
///
/// let registry = CompilerRegistry::with_all_tools();
/// let puzzle = Puzzle::new(Grid::standard(9)).with_element(
///     ConstraintsElement::new("killer_cage").with_instance(
///         "c1",
///         ConstraintInstance::cage([Position::new(0, 0), Position::new(0, 1)]).with_value("10"),
///     ),
/// );
///
/// let model = ModelAssembler::new(&registry).compile(&puzzle)?;
/// assert_eq!(
///     model.text(),
///     "% killer_cage\nconstraint sum_cage_p([grid[1,1], grid[1,2]], 10);\n"
/// );
/// # Ok::<(), gridcsp_compiler::assembler::CompileError>(())
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ModelAssembler<'r> {
    registry: &'r CompilerRegistry,
    settings: AssemblerSettings,
}

impl<'r> ModelAssembler<'r> {
    /// Creates an assembler with default settings.
    #[must_use]
    pub fn new(registry: &'r CompilerRegistry) -> Self {
        Self {
            registry,
            settings: AssemblerSettings::default(),
        }
    }

    /// Replaces the settings.
    #[must_use]
    pub fn with_settings(mut self, settings: AssemblerSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the settings.
    #[must_use]
    pub fn settings(&self) -> AssemblerSettings {
        self.settings
    }

    /// Compiles `puzzle` into model text.
    ///
    /// A fresh [`PuzzleModel`] is created for every call, so shared variables
    /// never leak between compilations.
    ///
    /// # Errors
    ///
    /// Returns [`CompileError::ShapeMismatch`] if an instance does not have the
    /// shape its generator expects. Nothing is compiled in that case.
    pub fn compile(&self, puzzle: &Puzzle) -> Result<CompiledModel, CompileError> {
        self.check_shapes(puzzle)?;

        let mut model = PuzzleModel::new(puzzle);
        let mut statements = Vec::new();
        if self.settings.givens {
            let givens = given_statements(puzzle);
            if !givens.is_empty() {
                if self.settings.tool_comments {
                    statements.push(Statement::Comment("givens".to_owned()));
                }
                statements.extend(givens);
            }
        }

        for element in puzzle.elements() {
            let tool_id = element.tool_id();
            let Some(compiler) = self.registry.get(tool_id) else {
                log::debug!("no generator for {tool_id}, skipping");
                continue;
            };
            let fragment = compiler.compile(&mut model, element);
            let pending = model.take_pending();
            if fragment.is_empty() && pending.is_empty() {
                continue;
            }
            log::trace!(
                "{tool_id}: {} statements, {} shared",
                fragment.statements().len(),
                pending.len()
            );
            if self.settings.tool_comments && !fragment.starts_with_comment() {
                statements.push(Statement::Comment(tool_id.to_owned()));
            }
            statements.extend(pending);
            statements.extend(
                fragment
                    .into_statements()
                    .into_iter()
                    .filter(|statement| self.settings.tool_comments || !statement.is_comment()),
            );
        }

        Ok(CompiledModel {
            statements,
            diagnostics: model.into_diagnostics(),
        })
    }

    fn check_shapes(&self, puzzle: &Puzzle) -> Result<(), CompileError> {
        for element in puzzle.elements() {
            let Some(compiler) = self.registry.get(element.tool_id()) else {
                continue;
            };
            let expected = compiler.shape();
            for (id, instance) in element.instances() {
                let found = instance.shape();
                if found != expected {
                    return Err(CompileError::ShapeMismatch {
                        tool_id: element.tool_id().to_owned(),
                        instance_id: id.to_owned(),
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

fn given_statements(puzzle: &Puzzle) -> Vec<Statement> {
    puzzle
        .grid()
        .cells()
        .filter(|cell| cell.is_inside())
        .filter_map(|cell| {
            let value = cell.given?;
            Some(Statement::Constrain(
                Expr::cell(SharedGrid::Digits.name(), cell.position).equals(Expr::int(value)),
            ))
        })
        .collect()
}

/// The result of a compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledModel {
    statements: Vec<Statement>,
    diagnostics: Vec<SkipDiagnostic>,
}

impl CompiledModel {
    /// Returns the statements in emission order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the rules that could not be applied.
    #[must_use]
    pub fn diagnostics(&self) -> &[SkipDiagnostic] {
        &self.diagnostics
    }

    /// Returns `true` if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Renders the model text, one statement per line.
    #[must_use]
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl Display for CompiledModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}
