//! SQL Parser
//!
//! A hand-written recursive descent parser with Pratt parsing for the
//! AND/OR layer of WHERE clauses.

mod error;
mod parser;
mod pratt;

pub use error::ParseError;
pub use parser::Parser;

use crate::ast::Statement;

/// Parses a complete SELECT statement.
///
/// # Errors
///
/// Returns a `ParseError` if `sql` does not reduce to the grammar.
pub fn parse(sql: &str) -> Result<Statement, ParseError> {
    Parser::new(sql).parse_statement()
}
