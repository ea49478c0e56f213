//! SQL Parser implementation.

use super::error::ParseError;
use super::pratt::{infix_binding_power, token_to_connective, Connective};
use crate::ast::{ComparisonOp, Expr, Operand, Projection, Statement};
use crate::lexer::{Keyword, Lexer, Token, TokenKind};

/// SQL Parser for the `SELECT ... FROM ... [WHERE ...]` dialect.
pub struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
}

impl<'a> Parser<'a> {
    /// Creates a new parser for the given input.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token();
        Self {
            input,
            lexer,
            current,
        }
    }

    /// Parses a single SELECT statement spanning the whole input.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the input is not a valid statement or if
    /// anything follows it.
    pub fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.expect_keyword(Keyword::Select)?;

        let columns = self.parse_projection()?;

        self.expect_keyword(Keyword::From)?;
        let table = self.expect_identifier("table name")?;

        let filter = if self.check_keyword(Keyword::Where) {
            self.advance();
            Some(self.parse_expression(0)?)
        } else {
            None
        };

        if !self.current.is_eof() {
            return Err(self.unexpected("end of input"));
        }

        Ok(Statement {
            columns,
            table,
            filter,
        })
    }

    /// Parses `*` or a comma separated list of column names.
    fn parse_projection(&mut self) -> Result<Projection, ParseError> {
        if self.check(&TokenKind::Star) {
            self.advance();
            return Ok(Projection::Wildcard);
        }

        let mut names = vec![self.expect_identifier("column name or `*`")?];
        while self.check(&TokenKind::Comma) {
            self.advance();
            names.push(self.expect_identifier("column name")?);
        }
        Ok(Projection::Columns(names))
    }

    /// Parses a boolean expression using Pratt parsing.
    #[allow(clippy::while_let_loop)]
    fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut lhs = self.parse_condition()?;

        loop {
            let (l_bp, r_bp) = match infix_binding_power(&self.current.kind) {
                Some(bp) => bp,
                None => break,
            };

            if l_bp < min_bp {
                break;
            }

            let Some(connective) = token_to_connective(&self.current.kind) else {
                break;
            };
            self.advance();
            let rhs = self.parse_expression(r_bp)?;
            lhs = match connective {
                Connective::And => Expr::And {
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                Connective::Or => Expr::Or {
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
            };
        }

        Ok(lhs)
    }

    /// Parses a parenthesized group or a single predicate.
    fn parse_condition(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::LeftParen) {
            self.advance();
            let inner = self.parse_expression(0)?;
            self.expect(&TokenKind::RightParen, "`)`")?;
            return Ok(Expr::Group(Box::new(inner)));
        }

        let left = self.parse_operand()?;

        if let Some(op) = comparison_op(&self.current.kind) {
            self.advance();
            let right = self.parse_operand()?;
            return Ok(Expr::Comparison { left, op, right });
        }

        match &self.current.kind {
            TokenKind::Keyword(Keyword::Like) => {
                self.advance();
                let pattern = self.parse_operand()?;
                Ok(Expr::Like { left, pattern })
            }
            TokenKind::Keyword(Keyword::Is) => {
                self.advance();
                let negated = if self.check_keyword(Keyword::Not) {
                    self.advance();
                    true
                } else {
                    false
                };
                if !self.check_keyword(Keyword::Null) {
                    return Err(self.unexpected("NULL"));
                }
                self.advance();
                Ok(if negated {
                    Expr::IsNotNull { operand: left }
                } else {
                    Expr::IsNull { operand: left }
                })
            }
            _ => Err(self.unexpected("comparison operator, LIKE or IS")),
        }
    }

    /// Parses a column reference or a literal.
    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let operand = match &self.current.kind {
            TokenKind::Identifier(name) => Operand::Column {
                name: name.clone(),
                span: self.current.span,
            },
            TokenKind::Integer(n) => Operand::Integer(*n),
            TokenKind::Float(x) => Operand::Float(*x),
            TokenKind::String(s) => Operand::String(s.clone()),
            TokenKind::Keyword(Keyword::Null) => Operand::Null,
            _ => return Err(self.unexpected("column name or literal")),
        };
        self.advance();
        Ok(operand)
    }

    // --- Helper methods ---

    /// Advances to the next token.
    fn advance(&mut self) {
        self.current = self.lexer.next_token();
    }

    /// Checks if the current token matches the given kind.
    fn check(&self, kind: &TokenKind) -> bool {
        core::mem::discriminant(&self.current.kind) == core::mem::discriminant(kind)
    }

    /// Checks if the current token is the given keyword.
    fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.current.kind, TokenKind::Keyword(kw) if *kw == keyword)
    }

    /// Expects the current token to be the given kind.
    fn expect(&mut self, kind: &TokenKind, description: &str) -> Result<(), ParseError> {
        if self.check(kind) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(description))
        }
    }

    /// Expects the current token to be the given keyword.
    fn expect_keyword(&mut self, keyword: Keyword) -> Result<(), ParseError> {
        if self.check_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword.as_str()))
        }
    }

    /// Expects and returns an identifier.
    fn expect_identifier(&mut self, description: &str) -> Result<String, ParseError> {
        match &self.current.kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected(description)),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::unexpected(expected, &self.current, self.input)
    }
}

const fn comparison_op(kind: &TokenKind) -> Option<ComparisonOp> {
    match kind {
        TokenKind::Eq => Some(ComparisonOp::Eq),
        TokenKind::NotEq => Some(ComparisonOp::NotEq),
        TokenKind::Lt => Some(ComparisonOp::Lt),
        TokenKind::LtEq => Some(ComparisonOp::LtEq),
        TokenKind::Gt => Some(ComparisonOp::Gt),
        TokenKind::GtEq => Some(ComparisonOp::GtEq),
        _ => None,
    }
}
