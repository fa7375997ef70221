//! The per-compilation context handed to every generator.

use std::fmt::{self, Display};

use gridcsp_core::{Grid, Position};

use crate::{
    ir::{Declaration, Expr, Fragment, Statement},
    puzzle::Puzzle,
    shared::{SharedGrid, SharedVariables},
    tool::modifier::{DOUBLERS, NEGATORS},
    value::{ParseOptions, ParsedValue},
};

/// Why a generator dropped an instance or a whole tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum SkipReason {
    /// The footprint references a cell that does not exist or lies outside.
    #[display("references a cell that is not part of the grid")]
    MissingCell,
    /// The tool needs a value and none was given.
    #[display("value is required")]
    MissingValue,
    /// The value text could not be parsed in the forms the tool accepts.
    #[display("value could not be parsed")]
    UnparseableValue,
    /// The footprint is not usable for the tool (wrong length, non-adjacent cells, ...).
    #[display("footprint does not fit the rule")]
    GeometryMismatch,
    /// The footprint covers no cells.
    #[display("footprint covers no cells")]
    EmptyFootprint,
    /// The tool does not support grids with outside cells.
    #[display("grids with outside cells are not supported")]
    OutsideCellsPresent,
    /// The tool needs a square grid.
    #[display("grid is not square")]
    NonSquareGrid,
    /// The direction is not supported by the tool.
    #[display("direction is not supported")]
    UnsupportedDirection,
}

/// A structured record of a rule that could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkipDiagnostic {
    /// Tool whose rule was skipped.
    pub tool_id: String,
    /// Skipped instance, or `None` when the whole tool was skipped.
    pub instance_id: Option<String>,
    /// Why it was skipped.
    pub reason: SkipReason,
}

impl Display for SkipDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tool_id)?;
        if let Some(id) = &self.instance_id {
            write!(f, "[{id}]")?;
        }
        write!(f, ": {}", self.reason)
    }
}

/// A single-use compilation context.
///
/// Wraps the puzzle with a fresh [`SharedVariables`] registry. Shared-grid
/// declarations requested by generators are queued and handed to the
/// assembler, which emits them ahead of the requesting generator's fragment.
#[derive(Debug)]
pub struct PuzzleModel<'a> {
    puzzle: &'a Puzzle,
    shared: SharedVariables,
    pending: Vec<Statement>,
    diagnostics: Vec<SkipDiagnostic>,
}

impl<'a> PuzzleModel<'a> {
    /// Creates a context with an empty registry.
    #[must_use]
    pub fn new(puzzle: &'a Puzzle) -> Self {
        Self {
            puzzle,
            shared: SharedVariables::new(),
            pending: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Returns the puzzle.
    #[must_use]
    pub fn puzzle(&self) -> &'a Puzzle {
        self.puzzle
    }

    /// Returns the grid.
    #[must_use]
    pub fn grid(&self) -> &'a Grid {
        self.puzzle.grid()
    }

    /// Returns the smallest valid digit, or 0 for an empty domain.
    #[must_use]
    pub fn min_digit(&self) -> i64 {
        self.puzzle.digits().first().copied().unwrap_or_default()
    }

    /// Returns the largest valid digit, or 0 for an empty domain.
    #[must_use]
    pub fn max_digit(&self) -> i64 {
        self.puzzle.digits().last().copied().unwrap_or_default()
    }

    /// Returns `true` if arithmetic clues read face values instead of digits.
    ///
    /// A doublers or negators element switches this on even without
    /// instances, since their per-region rules still place modifiers.
    #[must_use]
    pub fn value_modifiers_apply(&self) -> bool {
        (self.uses_modifier(DOUBLERS) || self.uses_modifier(NEGATORS))
            && !self.grid().has_outside_cells()
    }

    fn uses_modifier(&self, tool_id: &str) -> bool {
        self.puzzle.element(tool_id).is_some()
    }

    /// Returns the digit variable of `pos`, or `None` if the cell is missing.
    #[must_use]
    pub fn digit_ref(&self, pos: Position) -> Option<Expr> {
        self.grid()
            .is_inside(pos)
            .then(|| Expr::cell(SharedGrid::Digits.name(), pos))
    }

    /// Returns the face value of `pos`, or `None` if the cell is missing.
    ///
    /// This is the digit itself unless doublers or negators are in play, in
    /// which case the shared value grid is declared on first use.
    pub fn value_ref(&mut self, pos: Position) -> Option<Expr> {
        if !self.grid().is_inside(pos) {
            return None;
        }
        if self.value_modifiers_apply() {
            let name = self.ensure_shared_grid(SharedGrid::Values);
            return Some(Expr::cell(name, pos));
        }
        self.digit_ref(pos)
    }

    /// Returns the digit variables of all `cells`, or `None` if any is missing.
    #[must_use]
    pub fn digit_refs(&self, cells: &[Position]) -> Option<Vec<Expr>> {
        cells.iter().map(|&pos| self.digit_ref(pos)).collect()
    }

    /// Returns the face values of all `cells`, or `None` if any is missing.
    pub fn value_refs(&mut self, cells: &[Position]) -> Option<Vec<Expr>> {
        cells.iter().map(|&pos| self.value_ref(pos)).collect()
    }

    /// Resolves clue text through the shared registry.
    pub fn resolve(
        &mut self,
        text: &str,
        default: &str,
        options: ParseOptions,
    ) -> Option<ParsedValue> {
        self.shared.resolve(text, default, options)
    }

    /// Resolves clue text, appends its declarations to `fragment`, and returns the reference.
    pub fn resolve_into(
        &mut self,
        fragment: &mut Fragment,
        text: &str,
        default: &str,
        options: ParseOptions,
    ) -> Option<Expr> {
        let parsed = self.resolve(text, default, options)?;
        fragment.extend(parsed.statements);
        Some(parsed.reference)
    }

    /// Declares `grid` on first request and returns its canonical name.
    pub fn ensure_shared_grid(&mut self, grid: SharedGrid) -> &'static str {
        let name = grid.name();
        let Some(domain) = grid.domain() else {
            return name;
        };
        if !self.shared.ensure_grid(grid) {
            return name;
        }

        if grid == SharedGrid::Values {
            // the modifier grids must exist before the value definition reads them
            let doublers = self
                .uses_modifier(DOUBLERS)
                .then(|| self.ensure_shared_grid(SharedGrid::Doublers));
            let negators = self
                .uses_modifier(NEGATORS)
                .then(|| self.ensure_shared_grid(SharedGrid::Negators));
            let board = self.grid();
            self.pending.push(Statement::Declare(Declaration::grid(
                name,
                board.rows(),
                board.cols(),
                domain,
            )));
            for pos in board.inside_positions() {
                let mut value = Expr::cell(SharedGrid::Digits.name(), pos);
                if let Some(doublers) = doublers {
                    value = value * (Expr::int(1) + Expr::cell(doublers, pos));
                }
                if let Some(negators) = negators {
                    value = value * (Expr::int(1) - Expr::int(2) * Expr::cell(negators, pos));
                }
                self.pending
                    .push(Statement::Constrain(Expr::cell(name, pos).equals(value)));
            }
            return name;
        }

        let board = self.grid();
        self.pending.push(Statement::Declare(Declaration::grid(
            name,
            board.rows(),
            board.cols(),
            domain,
        )));
        name
    }

    /// Drains the queued shared-grid statements.
    pub fn take_pending(&mut self) -> Vec<Statement> {
        std::mem::take(&mut self.pending)
    }

    /// Records that a rule was skipped and logs it.
    pub fn skip(&mut self, tool_id: &str, instance_id: Option<&str>, reason: SkipReason) {
        let diagnostic = SkipDiagnostic {
            tool_id: tool_id.to_owned(),
            instance_id: instance_id.map(str::to_owned),
            reason,
        };
        log::warn!("skipping {diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    /// Returns the diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[SkipDiagnostic] {
        &self.diagnostics
    }

    /// Consumes the context and returns its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<SkipDiagnostic> {
        self.diagnostics
    }
}
