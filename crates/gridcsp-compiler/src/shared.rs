//! Per-compilation shared variable registry.
//!
//! Many tools reference the same auxiliary quantity: a cage total that an
//! "all totals differ" rule also mentions, a clue variable reused across
//! cages, a shading grid read by several generators. Textual constraint
//! languages reject duplicate declarations, so every such quantity is routed
//! through [`SharedVariables`], which declares it at most once per
//! compilation and always hands back the same name afterwards.
//!
//! # Canonical names
//!
//! Shared grids use fixed names ([`SharedGrid::name`]). Solution rendering maps
//! solved arrays back onto the board through these names, so generators must
//! request the grid rather than declaring their own:
//!
//! | grid                     | name               | domain |
//! |--------------------------|--------------------|--------|
//! | [`SharedGrid::Digits`]   | `grid`             | digits (declared by the model template) |
//! | [`SharedGrid::Values`]   | `value_grid`       | face values after doublers and negators |
//! | [`SharedGrid::Doublers`] | `doubler_grid`     | `0..1` |
//! | [`SharedGrid::Negators`] | `negator_grid`     | `0..1` |
//! | [`SharedGrid::YinYang`]  | `yin_yang_shading` | `0..1` |

use std::collections::{BTreeSet, HashMap};

use crate::{
    ir::{Declaration, Domain, Statement},
    value::{ParseOptions, ParsedValue, ValueExpr, is_identifier},
};

/// Grids shared between generators under a canonical name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SharedGrid {
    /// The digit grid.
    Digits,
    /// Face values after value modifiers are applied.
    Values,
    /// Doubler indicator grid.
    Doublers,
    /// Negator indicator grid.
    Negators,
    /// Yin-yang shading grid.
    YinYang,
}

impl SharedGrid {
    /// All shared grids.
    pub const ALL: [Self; 5] = [
        Self::Digits,
        Self::Values,
        Self::Doublers,
        Self::Negators,
        Self::YinYang,
    ];

    /// Returns the canonical array name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Digits => "grid",
            Self::Values => "value_grid",
            Self::Doublers => "doubler_grid",
            Self::Negators => "negator_grid",
            Self::YinYang => "yin_yang_shading",
        }
    }

    /// Returns the element domain, or `None` for the template-declared digit grid.
    #[must_use]
    pub const fn domain(self) -> Option<Domain> {
        match self {
            Self::Digits => None,
            Self::Values => Some(Domain::Int),
            Self::Doublers | Self::Negators | Self::YinYang => Some(Domain::Range(0, 1)),
        }
    }
}

/// Memoized auxiliary variable declarations for one compilation.
///
/// # Examples
///
/// ```
/// use gridcsp_compiler::{shared::SharedVariables, value::ParseOptions};
///
/// let mut shared = SharedVariables::new();
/// let first = shared.resolve("3-7", "total_r1c1", ParseOptions::ALL).unwrap();
/// let second = shared.resolve("3-7", "total_r1c1", ParseOptions::ALL).unwrap();
///
/// assert_eq!(first.statements.len(), 1);
/// assert!(second.statements.is_empty());
/// assert_eq!(first.reference, second.reference);
/// ```
#[derive(Debug, Default)]
pub struct SharedVariables {
    values: HashMap<(String, String), Option<ParsedValue>>,
    declared_names: BTreeSet<String>,
    grids: BTreeSet<SharedGrid>,
    next_aux: usize,
}

impl SharedVariables {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves clue text to a reference, declaring it on first use.
    ///
    /// The cache key is `(text, default)`. The first call returns the
    /// declarations needed for the value; later calls with an equal key return
    /// the same reference with no statements. Variable references that are not
    /// names this registry or a shared grid already owns are declared as
    /// `var int` the first time any key mentions them.
    ///
    /// Returns `None` if the text cannot be parsed under `options`; the failure
    /// is cached as well.
    pub fn resolve(
        &mut self,
        text: &str,
        default: &str,
        options: ParseOptions,
    ) -> Option<ParsedValue> {
        let key = (text.trim().to_owned(), default.trim().to_owned());
        if let Some(cached) = self.values.get(&key) {
            log::trace!("shared value hit: {key:?}");
            return cached.clone().map(|parsed| ParsedValue::reference(parsed.reference));
        }

        let parsed = self.lower(&key.0, &key.1, options);
        self.values.insert(key, parsed.clone());
        parsed
    }

    /// Marks `grid` as declared. Returns `true` only on the first request.
    pub fn ensure_grid(&mut self, grid: SharedGrid) -> bool {
        self.grids.insert(grid)
    }

    /// Returns `true` if `name` was declared through this registry.
    #[must_use]
    pub fn is_declared(&self, name: &str) -> bool {
        self.declared_names.contains(name)
    }

    /// Records `name` as declared. Returns `true` if it was new.
    pub fn claim_name(&mut self, name: &str) -> bool {
        self.declared_names.insert(name.to_owned())
    }

    fn lower(&mut self, text: &str, default: &str, options: ParseOptions) -> Option<ParsedValue> {
        let expr = text.parse::<ValueExpr>().ok()?;
        let fresh = if expr.needs_fresh_name() {
            if is_identifier(default) && !self.declared_names.contains(default) {
                default.to_owned()
            } else {
                self.next_aux_name()
            }
        } else {
            default.to_owned()
        };

        let mut parsed = expr.lower(default, options, &fresh)?;

        // Drop declarations of names another key already introduced.
        parsed.statements.retain(|statement| match statement {
            Statement::Declare(declaration) => !self.declared_names.contains(declaration.name()),
            _ => true,
        });
        for statement in &parsed.statements {
            if let Statement::Declare(declaration) = statement {
                self.declared_names.insert(declaration.name().to_owned());
            }
        }

        let mut symbol_declarations = Vec::new();
        for symbol in expr.symbols() {
            let owned_by_grid = SharedGrid::ALL.iter().any(|grid| grid.name() == symbol);
            if !owned_by_grid && self.declared_names.insert(symbol.to_owned()) {
                symbol_declarations.push(Statement::Declare(Declaration::var(symbol, Domain::Int)));
            }
        }
        symbol_declarations.append(&mut parsed.statements);
        parsed.statements = symbol_declarations;
        Some(parsed)
    }

    fn next_aux_name(&mut self) -> String {
        loop {
            let name = format!("aux_{}", self.next_aux);
            self.next_aux += 1;
            if !self.declared_names.contains(&name) {
                return name;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn lines(parsed: &ParsedValue) -> Vec<String> {
        parsed.statements.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_cache_hit_has_no_declaration() {
        let mut shared = SharedVariables::new();
        let first = shared.resolve("", "total_r1c1", ParseOptions::ALL).unwrap();
        assert_eq!(lines(&first), ["var int: total_r1c1;"]);
        let second = shared.resolve("", "total_r1c1", ParseOptions::ALL).unwrap();
        assert!(second.statements.is_empty());
        assert_eq!(second.reference, first.reference);
    }

    #[test]
    fn test_symbols_are_declared_once() {
        let mut shared = SharedVariables::new();
        let a = shared.resolve("x", "total_r1c1", ParseOptions::ALL).unwrap();
        let b = shared.resolve("x", "total_r5c5", ParseOptions::ALL).unwrap();
        assert_eq!(lines(&a), ["var int: x;"]);
        assert!(b.statements.is_empty());
        assert_eq!(a.reference, b.reference);
    }

    #[test]
    fn test_references_to_owned_names_are_not_redeclared() {
        let mut shared = SharedVariables::new();
        shared.resolve("", "total_r1c1", ParseOptions::ALL).unwrap();
        let reused = shared.resolve("total_r1c1", "total_r2c2", ParseOptions::ALL).unwrap();
        assert!(reused.statements.is_empty());

        let grid = shared.resolve("yin_yang_shading", "d", ParseOptions::ALL).unwrap();
        assert!(grid.statements.is_empty());
    }

    #[test]
    fn test_fresh_names_do_not_collide() {
        let mut shared = SharedVariables::new();
        let a = shared.resolve("1-3", "t", ParseOptions::ALL).unwrap();
        let b = shared.resolve("2-4", "t", ParseOptions::ALL).unwrap();
        let c = shared.resolve("<9", "0", ParseOptions::ALL).unwrap();
        assert_eq!(lines(&a), ["var 1..3: t;"]);
        assert_eq!(lines(&b), ["var 2..4: aux_0;"]);
        assert_eq!(lines(&c), ["var int: aux_1;", "constraint aux_1 <= 8;"]);
    }

    #[test]
    fn test_failures_are_cached() {
        let mut shared = SharedVariables::new();
        assert!(shared.resolve("?", "t", ParseOptions::ALL).is_none());
        assert!(shared.resolve("?", "t", ParseOptions::ALL).is_none());
        assert!(shared.resolve("a", "t", ParseOptions::LITERAL).is_none());
    }

    #[test]
    fn test_ensure_grid_once() {
        let mut shared = SharedVariables::new();
        assert!(shared.ensure_grid(SharedGrid::YinYang));
        assert!(!shared.ensure_grid(SharedGrid::YinYang));
        assert!(shared.ensure_grid(SharedGrid::Values));
    }

    proptest! {
        #[test]
        fn prop_resolve_is_idempotent(
            text in prop_oneof![
                Just(String::new()),
                (-20_i64..20).prop_map(|v| v.to_string()),
                "[a-z][a-z0-9_]{0,4}",
                (0_i64..9, 0_i64..9).prop_map(|(a, b)| format!("{}-{}", a.min(b), a.max(b))),
                (0_i64..9).prop_map(|v| format!("<{v}")),
                (0_i64..9, 0_i64..9).prop_map(|(a, b)| format!("{a},{b}")),
            ],
            default in "[a-z]{1,3}_r[1-9]c[1-9]",
        ) {
            let mut shared = SharedVariables::new();
            let first = shared.resolve(&text, &default, ParseOptions::ALL);
            let second = shared.resolve(&text, &default, ParseOptions::ALL);
            prop_assert_eq!(first.is_some(), second.is_some());
            if let (Some(first), Some(second)) = (first, second) {
                prop_assert_eq!(first.reference, second.reference);
                prop_assert!(second.statements.is_empty());
            }
        }
    }
}
