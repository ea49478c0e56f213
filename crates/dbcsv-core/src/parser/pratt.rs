//! Pratt binding powers for the boolean connectives.

use crate::lexer::{Keyword, TokenKind};

/// The two boolean connectives of a WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

/// Returns the infix binding power for a token.
///
/// Returns `(left_bp, right_bp)` where a higher binding power binds tighter
/// and `left_bp < right_bp` makes the operator left associative.
///
/// Returns `None` if the token is not a connective.
#[must_use]
pub const fn infix_binding_power(kind: &TokenKind) -> Option<(u8, u8)> {
    match kind {
        TokenKind::Keyword(Keyword::Or) => Some((1, 2)),
        TokenKind::Keyword(Keyword::And) => Some((3, 4)),
        _ => None,
    }
}

/// Converts a token to a connective.
#[must_use]
pub const fn token_to_connective(kind: &TokenKind) -> Option<Connective> {
    match kind {
        TokenKind::Keyword(Keyword::And) => Some(Connective::And),
        TokenKind::Keyword(Keyword::Or) => Some(Connective::Or),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and_binds_tighter_than_or() {
        let and_bp = infix_binding_power(&TokenKind::Keyword(Keyword::And)).unwrap();
        let or_bp = infix_binding_power(&TokenKind::Keyword(Keyword::Or)).unwrap();
        assert!(and_bp.0 > or_bp.0);
    }

    #[test]
    fn test_left_associativity() {
        for kw in [Keyword::And, Keyword::Or] {
            let (left, right) = infix_binding_power(&TokenKind::Keyword(kw)).unwrap();
            assert!(left < right);
        }
    }

    #[test]
    fn test_non_connectives() {
        assert_eq!(infix_binding_power(&TokenKind::Eq), None);
        assert_eq!(token_to_connective(&TokenKind::Keyword(Keyword::Like)), None);
        assert_eq!(
            token_to_connective(&TokenKind::Keyword(Keyword::Or)),
            Some(Connective::Or)
        );
    }
}
