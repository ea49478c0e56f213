#![allow(dead_code)]

use dbcsv_core::ast::{Expr, Statement};
use dbcsv_core::{ParseError, Parser};

pub fn parse(sql: &str) -> Statement {
    Parser::new(sql)
        .parse_statement()
        .unwrap_or_else(|e| panic!("Failed to parse: {sql}\nError: {e:?}"))
}

pub fn parse_err(sql: &str) -> ParseError {
    Parser::new(sql)
        .parse_statement()
        .expect_err(&format!("Expected parse error for: {sql}"))
}

pub fn parse_filter(sql: &str) -> Expr {
    parse(sql)
        .filter
        .unwrap_or_else(|| panic!("Expected a WHERE clause in: {sql}"))
}

/// Parses, renders, and parses the rendering again.
pub fn round_trip(sql: &str) {
    let rendered = parse(sql).to_string();
    let reparsed = parse(&rendered).to_string();
    assert_eq!(rendered, reparsed, "Round trip changed: {sql}");
}
