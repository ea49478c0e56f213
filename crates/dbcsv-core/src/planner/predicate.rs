//! Filter predicates compiled from WHERE expressions.

use core::cmp::Ordering;

use regex::Regex;

use super::resolve_column;
use crate::ast::{ComparisonOp, Expr, Operand};
use crate::catalog::TableMeta;
use crate::error::PlanError;
use crate::types::Value;

/// An operand resolved against table metadata.
#[derive(Debug, Clone)]
enum Bound {
    Column(usize),
    Literal(Value),
}

impl Bound {
    fn compile(operand: &Operand, table: &TableMeta) -> Result<Self, PlanError> {
        Ok(match operand {
            Operand::Column { name, .. } => Self::Column(resolve_column(table, name)?),
            Operand::Integer(n) => Self::Literal(Value::Integer(*n)),
            Operand::Float(x) => Self::Literal(Value::Float(*x)),
            Operand::String(s) => Self::Literal(Value::Text(s.clone())),
            Operand::Null => Self::Literal(Value::Null),
        })
    }

    fn resolve<'r>(&'r self, row: &'r [Value]) -> &'r Value {
        match self {
            Self::Column(i) => &row[*i],
            Self::Literal(value) => value,
        }
    }
}

/// The right-hand side of a LIKE.
#[derive(Debug, Clone)]
enum LikePattern {
    /// A literal pattern, compiled once.
    Compiled(Regex),
    /// A pattern read from a column, compiled per row.
    Column(usize),
    /// A NULL literal: never matches.
    Null,
}

/// A compiled WHERE clause evaluated against full typed rows.
#[derive(Debug, Clone)]
pub struct Predicate(Node);

#[derive(Debug, Clone)]
enum Node {
    Compare {
        left: Bound,
        op: ComparisonOp,
        right: Bound,
    },
    Like {
        left: Bound,
        pattern: LikePattern,
    },
    IsNull(Bound),
    IsNotNull(Bound),
    And(Box<Node>, Box<Node>),
    Or(Box<Node>, Box<Node>),
}

impl Predicate {
    /// Compiles an expression, resolving every column it references.
    ///
    /// # Errors
    ///
    /// Returns a `PlanError` for the first unknown column, or if a literal
    /// LIKE pattern fails to compile.
    pub fn compile(expr: &Expr, table: &TableMeta) -> Result<Self, PlanError> {
        Node::compile(expr, table).map(Self)
    }

    /// Evaluates the predicate against a row in declared column order.
    #[must_use]
    pub fn evaluate(&self, row: &[Value]) -> bool {
        self.0.evaluate(row)
    }
}

impl Node {
    fn compile(expr: &Expr, table: &TableMeta) -> Result<Self, PlanError> {
        Ok(match expr {
            Expr::Comparison { left, op, right } => Self::Compare {
                left: Bound::compile(left, table)?,
                op: *op,
                right: Bound::compile(right, table)?,
            },
            Expr::Like { left, pattern } => {
                let left = Bound::compile(left, table)?;
                let pattern = match Bound::compile(pattern, table)? {
                    Bound::Column(i) => LikePattern::Column(i),
                    Bound::Literal(Value::Null) => LikePattern::Null,
                    Bound::Literal(value) => {
                        let text = value.to_string();
                        let regex = Regex::new(&like_to_regex(&text)).map_err(|source| {
                            PlanError::Pattern {
                                pattern: text,
                                source,
                            }
                        })?;
                        LikePattern::Compiled(regex)
                    }
                };
                Self::Like { left, pattern }
            }
            Expr::IsNull { operand } => Self::IsNull(Bound::compile(operand, table)?),
            Expr::IsNotNull { operand } => Self::IsNotNull(Bound::compile(operand, table)?),
            Expr::And { left, right } => Self::And(
                Box::new(Self::compile(left, table)?),
                Box::new(Self::compile(right, table)?),
            ),
            Expr::Or { left, right } => Self::Or(
                Box::new(Self::compile(left, table)?),
                Box::new(Self::compile(right, table)?),
            ),
            Expr::Group(inner) => Self::compile(inner, table)?,
        })
    }

    fn evaluate(&self, row: &[Value]) -> bool {
        match self {
            Self::Compare { left, op, right } => {
                let ordering = left.resolve(row).compare(right.resolve(row));
                ordering.is_some_and(|ordering| matches_op(*op, ordering))
            }
            Self::Like { left, pattern } => {
                let value = left.resolve(row);
                if value.is_null() {
                    return false;
                }
                let text = value.to_string();
                match pattern {
                    LikePattern::Compiled(regex) => regex.is_match(&text),
                    LikePattern::Column(i) => match &row[*i] {
                        Value::Null => false,
                        other => Regex::new(&like_to_regex(&other.to_string()))
                            .is_ok_and(|regex| regex.is_match(&text)),
                    },
                    LikePattern::Null => false,
                }
            }
            Self::IsNull(operand) => operand.resolve(row).is_null(),
            Self::IsNotNull(operand) => !operand.resolve(row).is_null(),
            Self::And(left, right) => left.evaluate(row) && right.evaluate(row),
            Self::Or(left, right) => left.evaluate(row) || right.evaluate(row),
        }
    }
}

const fn matches_op(op: ComparisonOp, ordering: Ordering) -> bool {
    match op {
        ComparisonOp::Eq => matches!(ordering, Ordering::Equal),
        ComparisonOp::NotEq => !matches!(ordering, Ordering::Equal),
        ComparisonOp::Lt => matches!(ordering, Ordering::Less),
        ComparisonOp::LtEq => !matches!(ordering, Ordering::Greater),
        ComparisonOp::Gt => matches!(ordering, Ordering::Greater),
        ComparisonOp::GtEq => !matches!(ordering, Ordering::Less),
    }
}

/// Translates a SQL LIKE pattern to an anchored regular expression.
///
/// `%` matches any run of characters, `_` exactly one. Everything else is
/// literal.
#[must_use]
pub fn like_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    out.push_str("(?s)^");
    let mut buf = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            c => out.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    out.push('$');
    out
}
