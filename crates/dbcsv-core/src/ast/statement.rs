//! SELECT statement AST.

use core::fmt;

use super::expression::Expr;

/// The column list of a SELECT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*`: every column in declared order.
    Wildcard,
    /// An explicit, ordered list of column names.
    Columns(Vec<String>),
}

/// A parsed `SELECT columns FROM table [WHERE filter]` statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Requested columns.
    pub columns: Projection,
    /// Source table name, case preserved.
    pub table: String,
    /// Optional WHERE clause.
    pub filter: Option<Expr>,
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SELECT ")?;
        match &self.columns {
            Projection::Wildcard => f.write_str("*")?,
            Projection::Columns(names) => f.write_str(&names.join(", "))?,
        }
        write!(f, " FROM {}", self.table)?;
        if let Some(filter) = &self.filter {
            write!(f, " WHERE {filter}")?;
        }
        Ok(())
    }
}
