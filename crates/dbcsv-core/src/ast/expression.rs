//! Filter expression AST types.

use core::fmt;

use crate::lexer::Span;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    /// `!=` or `<>`
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// A leaf value in a filter: a column reference or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A column reference, resolved against table metadata at plan time.
    Column {
        /// Column name, case preserved.
        name: String,
        /// Source span.
        span: Span,
    },
    /// Integer literal.
    Integer(i64),
    /// Float literal.
    Float(f64),
    /// String literal with its quotes stripped.
    String(String),
    /// NULL literal.
    Null,
}

impl Operand {
    /// Creates a column reference with an empty span.
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self::Column {
            name: name.into(),
            span: Span::default(),
        }
    }

    /// Returns the column name if this operand references a column.
    #[must_use]
    pub fn as_column(&self) -> Option<&str> {
        match self {
            Self::Column { name, .. } => Some(name),
            _ => None,
        }
    }
}

/// A filter expression from a WHERE clause.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `left <op> right`
    Comparison {
        left: Operand,
        op: ComparisonOp,
        right: Operand,
    },
    /// `left LIKE pattern`
    Like { left: Operand, pattern: Operand },
    /// `operand IS NULL`
    IsNull { operand: Operand },
    /// `operand IS NOT NULL`
    IsNotNull { operand: Operand },
    /// `left AND right`
    And { left: Box<Expr>, right: Box<Expr> },
    /// `left OR right`
    Or { left: Box<Expr>, right: Box<Expr> },
    /// A parenthesized expression. Only affects evaluation order.
    Group(Box<Expr>),
}

impl Expr {
    /// Visits every operand in the tree, left to right.
    pub fn for_each_operand<'a>(&'a self, f: &mut impl FnMut(&'a Operand)) {
        match self {
            Self::Comparison { left, right, .. } => {
                f(left);
                f(right);
            }
            Self::Like { left, pattern } => {
                f(left);
                f(pattern);
            }
            Self::IsNull { operand } | Self::IsNotNull { operand } => f(operand),
            Self::And { left, right } | Self::Or { left, right } => {
                left.for_each_operand(f);
                right.for_each_operand(f);
            }
            Self::Group(inner) => inner.for_each_operand(f),
        }
    }

    /// Strips any number of enclosing groups.
    #[must_use]
    pub fn ungrouped(&self) -> &Self {
        match self {
            Self::Group(inner) => inner.ungrouped(),
            other => other,
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column { name, .. } => f.write_str(name),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x:?}"),
            Self::String(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Self::Null => f.write_str("NULL"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comparison { left, op, right } => write!(f, "{left} {} {right}", op.as_str()),
            Self::Like { left, pattern } => write!(f, "{left} LIKE {pattern}"),
            Self::IsNull { operand } => write!(f, "{operand} IS NULL"),
            Self::IsNotNull { operand } => write!(f, "{operand} IS NOT NULL"),
            Self::And { left, right } => write!(f, "{left} AND {right}"),
            Self::Or { left, right } => write!(f, "{left} OR {right}"),
            Self::Group(inner) => write!(f, "({inner})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_keeps_grouping() {
        let expr = Expr::And {
            left: Box::new(Expr::Group(Box::new(Expr::Or {
                left: Box::new(Expr::IsNull {
                    operand: Operand::column("email"),
                }),
                right: Box::new(Expr::Comparison {
                    left: Operand::column("age"),
                    op: ComparisonOp::Gt,
                    right: Operand::Integer(30),
                }),
            }))),
            right: Box::new(Expr::Like {
                left: Operand::column("name"),
                pattern: Operand::String(String::from("J%")),
            }),
        };
        assert_eq!(
            expr.to_string(),
            "(email IS NULL OR age > 30) AND name LIKE 'J%'"
        );
    }

    #[test]
    fn test_for_each_operand_visits_in_order() {
        let expr = Expr::Or {
            left: Box::new(Expr::IsNotNull {
                operand: Operand::column("a"),
            }),
            right: Box::new(Expr::Comparison {
                left: Operand::column("b"),
                op: ComparisonOp::Eq,
                right: Operand::column("c"),
            }),
        };
        let mut seen = Vec::new();
        expr.for_each_operand(&mut |op| {
            if let Some(name) = op.as_column() {
                seen.push(name.to_string());
            }
        });
        assert_eq!(seen, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ungrouped() {
        let inner = Expr::IsNull {
            operand: Operand::column("x"),
        };
        let grouped = Expr::Group(Box::new(Expr::Group(Box::new(inner.clone()))));
        assert_eq!(grouped.ungrouped(), &inner);
    }
}
