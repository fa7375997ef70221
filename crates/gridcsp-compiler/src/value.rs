//! Clue value expressions.
//!
//! A clue's raw text is parsed into a [`ValueExpr`] and then lowered into a
//! [`ParsedValue`]: the statements that declare any auxiliary variable plus the
//! expression to reference in constraint text.
//!
//! Accepted forms (surrounding whitespace is ignored):
//!
//! | text            | form                         | needs                  |
//! |-----------------|------------------------------|------------------------|
//! | ``              | the caller's default         |                        |
//! | `12`, `-3`      | integer literal              |                        |
//! | `a`, `total_2`  | reference to a solver name   | `allow_variable`       |
//! | `3-7`, `3..7`   | closed interval              | `allow_interval`       |
//! | `<5`, `>=2`     | half-open interval           | `allow_interval`       |
//! | `1,3,a`         | one of the listed values     | `allow_list`           |
//!
//! Anything else, or a form the options do not allow, lowers to `None`.
//! Callers treat `None` as "skip this instance".

use std::str::FromStr;

use crate::ir::{Declaration, Domain, Expr, Statement};

/// Which value forms a caller accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ParseOptions {
    /// Accept references to solver variables.
    pub allow_variable: bool,
    /// Accept intervals and inequalities.
    pub allow_interval: bool,
    /// Accept comma-separated value lists.
    pub allow_list: bool,
}

impl ParseOptions {
    /// Integer literals only.
    pub const LITERAL: Self = Self {
        allow_variable: false,
        allow_interval: false,
        allow_list: false,
    };

    /// Literals and variable references.
    pub const VARIABLE: Self = Self {
        allow_variable: true,
        allow_interval: false,
        allow_list: false,
    };

    /// Every form.
    pub const ALL: Self = Self {
        allow_variable: true,
        allow_interval: true,
        allow_list: true,
    };
}

/// One element of a value list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ListItem {
    /// Integer literal.
    Literal(i64),
    /// Variable reference.
    Symbol(String),
}

impl ListItem {
    fn to_expr(&self) -> Expr {
        match self {
            Self::Literal(value) => Expr::Int(*value),
            Self::Symbol(name) => Expr::name(name.as_str()),
        }
    }
}

/// A parsed clue value, before lowering.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueExpr {
    /// No text.
    Empty,
    /// Integer literal.
    Literal(i64),
    /// Variable reference.
    Symbol(String),
    /// Inclusive interval; a missing bound is unbounded.
    Interval {
        /// Lower bound.
        lo: Option<i64>,
        /// Upper bound.
        hi: Option<i64>,
    },
    /// Comma-separated values.
    List(Vec<ListItem>),
}

/// Errors produced while parsing clue text.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum ValueParseError {
    /// The text matches no accepted form.
    #[display("unrecognized value expression: {_0:?}")]
    Unrecognized(#[error(not(source))] String),
    /// A closed interval whose lower bound exceeds its upper bound.
    #[display("empty interval {lo}..{hi}")]
    EmptyInterval {
        /// Lower bound.
        lo: i64,
        /// Upper bound.
        hi: i64,
    },
    /// A bound that does not fit after adjusting a strict inequality.
    #[display("interval bound out of range")]
    Overflow,
}

impl FromStr for ValueExpr {
    type Err = ValueParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Ok(Self::Empty);
        }
        if let Ok(value) = text.parse::<i64>() {
            return Ok(Self::Literal(value));
        }
        if is_identifier(text) {
            return Ok(Self::Symbol(text.to_owned()));
        }
        if let Some(interval) = parse_inequality(text)? {
            return Ok(interval);
        }
        if let Some((lo, hi)) = split_closed_interval(text) {
            if lo > hi {
                return Err(ValueParseError::EmptyInterval { lo, hi });
            }
            return Ok(Self::Interval {
                lo: Some(lo),
                hi: Some(hi),
            });
        }
        if text.contains(',') {
            let items = text
                .split(',')
                .map(|item| {
                    let item = item.trim();
                    if let Ok(value) = item.parse::<i64>() {
                        Some(ListItem::Literal(value))
                    } else if is_identifier(item) {
                        Some(ListItem::Symbol(item.to_owned()))
                    } else {
                        None
                    }
                })
                .collect::<Option<Vec<_>>>();
            if let Some(items) = items {
                return Ok(Self::List(items));
            }
        }
        Err(ValueParseError::Unrecognized(text.to_owned()))
    }
}

impl ValueExpr {
    /// Returns `true` if lowering this value declares a fresh variable.
    #[must_use]
    pub fn needs_fresh_name(&self) -> bool {
        matches!(self, Self::Interval { .. } | Self::List(_))
    }

    /// Returns the variable names this value references.
    #[must_use]
    pub fn symbols(&self) -> Vec<&str> {
        match self {
            Self::Symbol(name) => vec![name.as_str()],
            Self::List(items) => items
                .iter()
                .filter_map(|item| match item {
                    ListItem::Symbol(name) => Some(name.as_str()),
                    ListItem::Literal(_) => None,
                })
                .collect(),
            Self::Empty | Self::Literal(_) | Self::Interval { .. } => vec![],
        }
    }

    /// Lowers the value into declarations and a reference.
    ///
    /// `default` stands in for empty text: an integer default is a literal, an
    /// identifier default is declared as a fresh `var int`. `fresh` names the
    /// variable introduced by intervals and lists.
    #[must_use]
    pub fn lower(&self, default: &str, options: ParseOptions, fresh: &str) -> Option<ParsedValue> {
        match self {
            Self::Empty => lower_default(default),
            Self::Literal(value) => Some(ParsedValue::literal(*value)),
            Self::Symbol(name) => options
                .allow_variable
                .then(|| ParsedValue::reference(Expr::name(name.as_str()))),
            Self::Interval { lo, hi } => {
                if !options.allow_interval {
                    return None;
                }
                let name = Expr::name(fresh);
                let statements = match (lo, hi) {
                    (Some(lo), Some(hi)) => vec![Statement::Declare(Declaration::var(
                        fresh,
                        Domain::Range(*lo, *hi),
                    ))],
                    (Some(lo), None) => vec![
                        Statement::Declare(Declaration::var(fresh, Domain::Int)),
                        Statement::Constrain(name.clone().at_least(Expr::Int(*lo))),
                    ],
                    (None, Some(hi)) => vec![
                        Statement::Declare(Declaration::var(fresh, Domain::Int)),
                        Statement::Constrain(name.clone().at_most(Expr::Int(*hi))),
                    ],
                    (None, None) => vec![Statement::Declare(Declaration::var(fresh, Domain::Int))],
                };
                Some(ParsedValue {
                    statements,
                    reference: name,
                })
            }
            Self::List(items) => {
                if !options.allow_list || (!options.allow_variable && !self.symbols().is_empty()) {
                    return None;
                }
                let options_name = format!("{fresh}_options");
                let has_symbols = !self.symbols().is_empty();
                let name = Expr::name(fresh);
                let statements = vec![
                    Statement::Declare(Declaration::list(
                        options_name.as_str(),
                        Domain::Int,
                        has_symbols,
                        items.iter().map(ListItem::to_expr).collect(),
                    )),
                    Statement::Declare(Declaration::var(fresh, Domain::Int)),
                    Statement::Constrain(Expr::call(
                        "member",
                        vec![Expr::name(options_name), name.clone()],
                    )),
                ];
                Some(ParsedValue {
                    statements,
                    reference: name,
                })
            }
        }
    }
}

/// A lowered clue value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedValue {
    /// Declarations and domain constraints for any auxiliary variable.
    pub statements: Vec<Statement>,
    /// Expression to use in constraint text.
    pub reference: Expr,
}

impl ParsedValue {
    /// A literal that needs no declaration.
    #[must_use]
    pub fn literal(value: i64) -> Self {
        Self::reference(Expr::Int(value))
    }

    /// A reference that needs no declaration.
    #[must_use]
    pub fn reference(reference: Expr) -> Self {
        Self {
            statements: Vec::new(),
            reference,
        }
    }

    /// Returns the literal value, if the reference is one.
    #[must_use]
    pub fn as_literal(&self) -> Option<i64> {
        match self.reference {
            Expr::Int(value) => Some(value),
            _ => None,
        }
    }
}

/// Parses and lowers `text` in one step.
///
/// Returns `None` when the text is unparseable or uses a form `options`
/// rejects.
///
/// # Examples
///
/// ```
/// use gridcsp_compiler::value::{ParseOptions, parse_value};
///
/// let parsed = parse_value("12", "total", ParseOptions::LITERAL, "total").unwrap();
/// assert!(parsed.statements.is_empty());
/// assert_eq!(parsed.reference.to_string(), "12");
///
/// let parsed = parse_value("3-7", "total", ParseOptions::ALL, "total").unwrap();
/// assert_eq!(parsed.statements[0].to_string(), "var 3..7: total;");
///
/// assert!(parse_value("3-7", "total", ParseOptions::LITERAL, "total").is_none());
/// assert!(parse_value("3?", "total", ParseOptions::ALL, "total").is_none());
/// ```
#[must_use]
pub fn parse_value(
    text: &str,
    default: &str,
    options: ParseOptions,
    fresh: &str,
) -> Option<ParsedValue> {
    text.parse::<ValueExpr>()
        .ok()?
        .lower(default, options, fresh)
}

/// Returns `true` for `[A-Za-z_][A-Za-z0-9_]*`.
#[must_use]
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|ch| ch.is_ascii_alphabetic() || ch == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

fn lower_default(default: &str) -> Option<ParsedValue> {
    let default = default.trim();
    if let Ok(value) = default.parse::<i64>() {
        return Some(ParsedValue::literal(value));
    }
    if !is_identifier(default) {
        return None;
    }
    Some(ParsedValue {
        statements: vec![Statement::Declare(Declaration::var(default, Domain::Int))],
        reference: Expr::name(default),
    })
}

fn parse_inequality(text: &str) -> Result<Option<ValueExpr>, ValueParseError> {
    let parse_bound = |rest: &str| rest.trim().parse::<i64>().ok();
    let interval = if let Some(rest) = text.strip_prefix("<=") {
        parse_bound(rest).map(|hi| (None, Some(hi)))
    } else if let Some(rest) = text.strip_prefix(">=") {
        parse_bound(rest).map(|lo| (Some(lo), None))
    } else if let Some(rest) = text.strip_prefix('<') {
        match parse_bound(rest) {
            Some(hi) => Some((None, Some(hi.checked_sub(1).ok_or(ValueParseError::Overflow)?))),
            None => None,
        }
    } else if let Some(rest) = text.strip_prefix('>') {
        match parse_bound(rest) {
            Some(lo) => Some((Some(lo.checked_add(1).ok_or(ValueParseError::Overflow)?), None)),
            None => None,
        }
    } else {
        None
    };
    Ok(interval.map(|(lo, hi)| ValueExpr::Interval { lo, hi }))
}

fn split_closed_interval(text: &str) -> Option<(i64, i64)> {
    if let Some((lo, hi)) = text.split_once("..") {
        return Some((lo.trim().parse().ok()?, hi.trim().parse().ok()?));
    }
    // the first character may be the sign of the lower bound
    text.char_indices()
        .skip(1)
        .filter(|&(_, ch)| ch == '-')
        .find_map(|(i, _)| {
            let lo = text[..i].trim().parse().ok()?;
            let hi = text[i + 1..].trim().parse().ok()?;
            Some((lo, hi))
        })
}
