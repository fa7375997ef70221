//! Intermediate representation of model text.
//!
//! Generators build [`Statement`]s out of structured [`Expr`]essions and
//! [`Declaration`]s. Text is only produced by the [`Display`] impls, one line
//! per statement:
//!
//! ```text
//! % killer_cage
//! var int: killer_total_r1c1;
//! array[1..9, 1..9] of var 0..1: yin_yang_shading;
//! constraint sum_cage_p([grid[1,1], grid[1,2]], 10);
//! ```
//!
//! Binary expressions nested inside other operators are parenthesized, so the
//! rendered text never depends on operator precedence.

use std::{
    fmt::{self, Display, Write as _},
    ops::{Add, Mul, Neg, Not, Sub},
};

use gridcsp_core::Position;

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinOp {
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `*`
    Mul,
    /// `div`
    Div,
    /// `mod`
    Mod,
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `/\`
    And,
    /// `\/`
    Or,
    /// `->`
    Implies,
    /// `in`
    In,
}

impl BinOp {
    const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "div",
            Self::Mod => "mod",
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::And => "/\\",
            Self::Or => "\\/",
            Self::Implies => "->",
            Self::In => "in",
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnOp {
    /// Arithmetic negation.
    Neg,
    /// Boolean negation.
    Not,
}

/// An expression in model text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Integer literal.
    Int(i64),
    /// Boolean literal.
    Bool(bool),
    /// Variable or parameter name.
    Name(String),
    /// Array access, `array[i, j]`.
    Index {
        /// Array name.
        array: String,
        /// Index expressions.
        indices: Vec<Expr>,
    },
    /// Array literal, `[a, b, c]`.
    Array(Vec<Expr>),
    /// Integer range, `lo..hi`.
    Range(i64, i64),
    /// Function or predicate call.
    Call {
        /// Function name.
        function: String,
        /// Arguments.
        args: Vec<Expr>,
    },
    /// Binary operation.
    Binary {
        /// Operator.
        op: BinOp,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
    },
    /// Unary operation.
    Unary {
        /// Operator.
        op: UnOp,
        /// Operand.
        operand: Box<Expr>,
    },
    /// Conditional expression.
    IfThenElse {
        /// Condition.
        condition: Box<Expr>,
        /// Value when the condition holds.
        then: Box<Expr>,
        /// Value otherwise.
        otherwise: Box<Expr>,
    },
}

impl Expr {
    /// Integer literal.
    #[must_use]
    pub const fn int(value: i64) -> Self {
        Self::Int(value)
    }

    /// Name reference.
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// One-based reference to `pos` in a two-dimensional array named `array`.
    #[must_use]
    pub fn cell(array: &str, pos: Position) -> Self {
        Self::Index {
            array: array.to_owned(),
            indices: vec![
                Self::Int(i64::from(pos.row()) + 1),
                Self::Int(i64::from(pos.col()) + 1),
            ],
        }
    }

    /// Array access with arbitrary index expressions.
    #[must_use]
    pub fn index(array: &str, indices: Vec<Expr>) -> Self {
        Self::Index {
            array: array.to_owned(),
            indices,
        }
    }

    /// Array literal.
    #[must_use]
    pub fn array(items: impl IntoIterator<Item = Expr>) -> Self {
        Self::Array(items.into_iter().collect())
    }

    /// Function or predicate call.
    #[must_use]
    pub fn call(function: &str, args: Vec<Expr>) -> Self {
        Self::Call {
            function: function.to_owned(),
            args,
        }
    }

    /// `sum([items])`
    #[must_use]
    pub fn sum(items: impl IntoIterator<Item = Expr>) -> Self {
        Self::call("sum", vec![Self::array(items)])
    }

    /// `abs(self)`
    #[must_use]
    pub fn abs(self) -> Self {
        Self::call("abs", vec![self])
    }

    /// `bool2int(self)`
    #[must_use]
    pub fn to_int(self) -> Self {
        Self::call("bool2int", vec![self])
    }

    /// `if condition then self else otherwise endif`
    #[must_use]
    pub fn when(self, condition: Expr, otherwise: Expr) -> Self {
        Self::IfThenElse {
            condition: Box::new(condition),
            then: Box::new(self),
            otherwise: Box::new(otherwise),
        }
    }

    /// Binary operation.
    #[must_use]
    pub fn binary(self, op: BinOp, rhs: Expr) -> Self {
        Self::Binary {
            op,
            lhs: Box::new(self),
            rhs: Box::new(rhs),
        }
    }

    /// `self = rhs`
    #[must_use]
    pub fn equals(self, rhs: Expr) -> Self {
        self.binary(BinOp::Eq, rhs)
    }

    /// `self != rhs`
    #[must_use]
    pub fn not_equals(self, rhs: Expr) -> Self {
        self.binary(BinOp::Ne, rhs)
    }

    /// `self < rhs`
    #[must_use]
    pub fn less_than(self, rhs: Expr) -> Self {
        self.binary(BinOp::Lt, rhs)
    }

    /// `self <= rhs`
    #[must_use]
    pub fn at_most(self, rhs: Expr) -> Self {
        self.binary(BinOp::Le, rhs)
    }

    /// `self > rhs`
    #[must_use]
    pub fn greater_than(self, rhs: Expr) -> Self {
        self.binary(BinOp::Gt, rhs)
    }

    /// `self >= rhs`
    #[must_use]
    pub fn at_least(self, rhs: Expr) -> Self {
        self.binary(BinOp::Ge, rhs)
    }

    /// `self mod rhs`
    #[must_use]
    pub fn modulo(self, rhs: Expr) -> Self {
        self.binary(BinOp::Mod, rhs)
    }

    /// `self /\ rhs`
    #[must_use]
    pub fn and(self, rhs: Expr) -> Self {
        self.binary(BinOp::And, rhs)
    }

    /// `self \/ rhs`
    #[must_use]
    pub fn or(self, rhs: Expr) -> Self {
        self.binary(BinOp::Or, rhs)
    }

    /// `self -> rhs`
    #[must_use]
    pub fn implies(self, rhs: Expr) -> Self {
        self.binary(BinOp::Implies, rhs)
    }

    /// `self in rhs`
    #[must_use]
    pub fn within(self, rhs: Expr) -> Self {
        self.binary(BinOp::In, rhs)
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>, nested: bool) -> fmt::Result {
        match self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Name(name) => f.write_str(name),
            Self::Index { array, indices } => {
                write!(f, "{array}[")?;
                write_list(f, indices, ",")?;
                f.write_char(']')
            }
            Self::Array(items) => {
                f.write_char('[')?;
                write_list(f, items, ", ")?;
                f.write_char(']')
            }
            Self::Range(lo, hi) => write!(f, "{lo}..{hi}"),
            Self::Call { function, args } => {
                write!(f, "{function}(")?;
                write_list(f, args, ", ")?;
                f.write_char(')')
            }
            Self::Binary { op, lhs, rhs } => {
                if nested {
                    f.write_char('(')?;
                }
                lhs.fmt_nested(f, true)?;
                write!(f, " {} ", op.symbol())?;
                rhs.fmt_nested(f, true)?;
                if nested {
                    f.write_char(')')?;
                }
                Ok(())
            }
            Self::Unary { op, operand } => {
                match op {
                    UnOp::Neg => f.write_char('-')?,
                    UnOp::Not => f.write_str("not ")?,
                }
                operand.fmt_nested(f, true)
            }
            Self::IfThenElse {
                condition,
                then,
                otherwise,
            } => {
                if nested {
                    f.write_char('(')?;
                }
                write!(f, "if {condition} then {then} else {otherwise} endif")?;
                if nested {
                    f.write_char(')')?;
                }
                Ok(())
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr], separator: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        item.fmt_nested(f, false)?;
    }
    Ok(())
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_nested(f, false)
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl Add for Expr {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.binary(BinOp::Add, rhs)
    }
}

impl Sub for Expr {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.binary(BinOp::Sub, rhs)
    }
}

impl Mul for Expr {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        self.binary(BinOp::Mul, rhs)
    }
}

impl Neg for Expr {
    type Output = Self;

    fn neg(self) -> Self {
        Self::Unary {
            op: UnOp::Neg,
            operand: Box::new(self),
        }
    }
}

impl Not for Expr {
    type Output = Self;

    fn not(self) -> Self {
        Self::Unary {
            op: UnOp::Not,
            operand: Box::new(self),
        }
    }
}

/// Domain of a declared variable or array element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Any integer.
    Int,
    /// Boolean.
    Bool,
    /// Inclusive integer range.
    Range(i64, i64),
    /// Explicit set of integers.
    Set(Vec<i64>),
}

impl Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Bool => f.write_str("bool"),
            Self::Range(lo, hi) => write!(f, "{lo}..{hi}"),
            Self::Set(values) => {
                f.write_char('{')?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_char('}')
            }
        }
    }
}

/// A variable or array declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Declaration {
    /// `var <domain>: <name>;`
    Var {
        /// Variable name.
        name: String,
        /// Variable domain.
        domain: Domain,
    },
    /// `array[<dims>] of [var] <domain>: <name> [= <init>];`
    Array {
        /// Array name.
        name: String,
        /// Inclusive index ranges, one per dimension.
        dims: Vec<(i64, i64)>,
        /// Element domain.
        domain: Domain,
        /// `true` for decision variables, `false` for parameters.
        var: bool,
        /// Optional initializer (one-dimensional arrays only).
        init: Option<Vec<Expr>>,
    },
}

impl Declaration {
    /// Integer decision variable.
    #[must_use]
    pub fn var(name: impl Into<String>, domain: Domain) -> Self {
        Self::Var {
            name: name.into(),
            domain,
        }
    }

    /// Two-dimensional decision variable array covering a `rows`×`cols` grid.
    #[must_use]
    pub fn grid(name: impl Into<String>, rows: usize, cols: usize, domain: Domain) -> Self {
        Self::Array {
            name: name.into(),
            dims: vec![(1, to_i64(rows)), (1, to_i64(cols))],
            domain,
            var: true,
            init: None,
        }
    }

    /// One-dimensional array initialized with `items`.
    #[must_use]
    pub fn list(name: impl Into<String>, domain: Domain, var: bool, items: Vec<Expr>) -> Self {
        Self::Array {
            name: name.into(),
            dims: vec![(1, to_i64(items.len()))],
            domain,
            var,
            init: Some(items),
        }
    }

    /// Returns the declared name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Var { name, .. } | Self::Array { name, .. } => name,
        }
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

impl Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var { name, domain } => write!(f, "var {domain}: {name};"),
            Self::Array {
                name,
                dims,
                domain,
                var,
                init,
            } => {
                f.write_str("array[")?;
                for (i, (lo, hi)) in dims.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{lo}..{hi}")?;
                }
                f.write_str("] of ")?;
                if *var {
                    f.write_str("var ")?;
                }
                write!(f, "{domain}: {name}")?;
                if let Some(items) = init {
                    f.write_str(" = [")?;
                    write_list(f, items, ", ")?;
                    f.write_char(']')?;
                }
                f.write_char(';')
            }
        }
    }
}

/// One line of model text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::IsVariant)]
pub enum Statement {
    /// `% <text>`
    Comment(String),
    /// A declaration line.
    Declare(Declaration),
    /// `constraint <expr>;`
    Constrain(Expr),
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comment(text) => write!(f, "% {text}"),
            Self::Declare(declaration) => Display::fmt(declaration, f),
            Self::Constrain(expr) => write!(f, "constraint {expr};"),
        }
    }
}

/// The ordered statements produced by one generator invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    statements: Vec<Statement>,
}

impl Fragment {
    /// Creates an empty fragment.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            statements: Vec::new(),
        }
    }

    /// Appends a comment line.
    pub fn comment(&mut self, text: impl Into<String>) {
        self.statements.push(Statement::Comment(text.into()));
    }

    /// Appends a declaration.
    pub fn declare(&mut self, declaration: Declaration) {
        self.statements.push(Statement::Declare(declaration));
    }

    /// Appends a constraint.
    pub fn constrain(&mut self, expr: Expr) {
        self.statements.push(Statement::Constrain(expr));
    }

    /// Appends a statement.
    pub fn push(&mut self, statement: Statement) {
        self.statements.push(statement);
    }

    /// Appends the statements of `other`.
    pub fn append(&mut self, other: Fragment) {
        self.statements.extend(other.statements);
    }

    /// Returns `true` if the fragment holds no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Returns `true` if the first statement is a comment.
    #[must_use]
    pub fn starts_with_comment(&self) -> bool {
        self.statements.first().is_some_and(Statement::is_comment)
    }

    /// Returns the statements in order.
    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Returns the constraint expressions in order.
    pub fn constraints(&self) -> impl Iterator<Item = &Expr> {
        self.statements.iter().filter_map(|statement| match statement {
            Statement::Constrain(expr) => Some(expr),
            _ => None,
        })
    }

    /// Consumes the fragment and returns its statements.
    #[must_use]
    pub fn into_statements(self) -> Vec<Statement> {
        self.statements
    }
}

impl Extend<Statement> for Fragment {
    fn extend<T: IntoIterator<Item = Statement>>(&mut self, iter: T) {
        self.statements.extend(iter);
    }
}

impl Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            writeln!(f, "{statement}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_cell_and_call() {
        let cells = [Position::new(0, 0), Position::new(0, 1)]
            .into_iter()
            .map(|pos| Expr::cell("grid", pos));
        let expr = Expr::call("sum_cage_p", vec![Expr::array(cells), Expr::int(10)]);
        assert_eq!(expr.to_string(), "sum_cage_p([grid[1,1], grid[1,2]], 10)");
    }

    #[test]
    fn test_nested_binary_is_parenthesized() {
        let a = Expr::name("a");
        let b = Expr::name("b");
        let expr = (a.clone() - b.clone()).abs().at_least(Expr::int(5));
        assert_eq!(expr.to_string(), "abs(a - b) >= 5");

        let expr = a.clone().equals(Expr::int(2) * b.clone()).or(b.equals(Expr::int(2) * a));
        assert_eq!(expr.to_string(), "(a = (2 * b)) \\/ (b = (2 * a))");
    }

    #[test]
    fn test_unary_and_conditional() {
        let expr = (-Expr::name("x")).equals((!Expr::name("y")).to_int());
        assert_eq!(expr.to_string(), "-x = bool2int(not y)");

        let expr = Expr::int(1).when(Expr::name("c"), Expr::int(0)) + Expr::int(1);
        assert_eq!(expr.to_string(), "(if c then 1 else 0 endif) + 1");
    }

    #[test]
    fn test_render_declarations() {
        assert_eq!(
            Declaration::var("t", Domain::Range(3, 7)).to_string(),
            "var 3..7: t;"
        );
        assert_eq!(
            Declaration::grid("s", 9, 9, Domain::Range(0, 1)).to_string(),
            "array[1..9, 1..9] of var 0..1: s;"
        );
        assert_eq!(
            Declaration::list("o", Domain::Int, false, vec![Expr::int(1), Expr::int(3)])
                .to_string(),
            "array[1..2] of int: o = [1, 3];"
        );
        assert_eq!(
            Declaration::var("p", Domain::Set(vec![1, 4])).to_string(),
            "var {1, 4}: p;"
        );
    }

    #[test]
    fn test_fragment_render() {
        let mut fragment = Fragment::new();
        fragment.comment("tool");
        fragment.declare(Declaration::var("x", Domain::Int));
        fragment.constrain(Expr::name("x").within(Expr::Range(1, 3)));
        assert!(fragment.starts_with_comment());
        assert_eq!(fragment.constraints().count(), 1);
        assert_eq!(
            fragment.to_string(),
            "% tool\nvar int: x;\nconstraint x in 1..3;\n"
        );
    }
}
