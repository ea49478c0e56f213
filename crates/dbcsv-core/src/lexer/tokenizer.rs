//! SQL Tokenizer implementation.

use super::{Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// The byte position of the start of the current token.
    start: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            start: 0,
        }
    }

    /// Returns the current character without advancing.
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    /// Returns the next character without advancing.
    fn peek_next(&self) -> Option<char> {
        let mut chars = self.input[self.pos..].chars();
        chars.next();
        chars.next()
    }

    /// Advances to the next character and returns it.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.advance();
        }
    }

    /// Creates a token spanning from the token start to the current position.
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Scans an identifier or keyword.
    fn scan_identifier(&mut self) -> Token {
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.advance();
        }

        let text = &self.input[self.start..self.pos];

        if let Some(keyword) = Keyword::from_str(text) {
            self.make_token(TokenKind::Keyword(keyword))
        } else {
            self.make_token(TokenKind::Identifier(String::from(text)))
        }
    }

    /// Scans a number (integer or float), including an optional leading sign.
    fn scan_number(&mut self) -> Token {
        let mut is_float = false;

        if self.peek().is_some_and(|c| c == '+' || c == '-') {
            self.advance();
        }

        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.peek() == Some('.') {
            is_float = true;
            self.advance();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        // Exponent only when digits follow, so `1e` stays an error downstream.
        if self.peek().is_some_and(|c| c == 'e' || c == 'E') {
            let mut lookahead = self.input[self.pos..].chars().skip(1);
            let next = lookahead.next();
            let has_digits = match next {
                Some('+' | '-') => lookahead.next().is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if has_digits {
                is_float = true;
                self.advance();
                if self.peek().is_some_and(|c| c == '+' || c == '-') {
                    self.advance();
                }
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
            }
        }

        let text = &self.input[self.start..self.pos];
        // `+5` is accepted by the grammar but not by `str::parse`.
        let digits = text.strip_prefix('+').unwrap_or(text);

        if is_float {
            match digits.parse::<f64>() {
                Ok(f) => self.make_token(TokenKind::Float(f)),
                Err(e) => self.make_token(TokenKind::Error(format!("Invalid float {text}: {e}"))),
            }
        } else {
            // Past the i64 range a literal still compares as a float.
            match (digits.parse::<i64>(), digits.parse::<f64>()) {
                (Ok(i), _) => self.make_token(TokenKind::Integer(i)),
                (Err(_), Ok(f)) => self.make_token(TokenKind::Float(f)),
                (Err(e), Err(_)) => {
                    self.make_token(TokenKind::Error(format!("Invalid integer {text}: {e}")))
                }
            }
        }
    }

    /// Scans a string literal delimited by `quote`.
    ///
    /// A backslash escapes the quote character and itself; any other
    /// backslash sequence is kept verbatim.
    fn scan_string(&mut self, quote: char) -> Token {
        self.advance(); // consume opening quote
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('\\') => match self.peek() {
                    Some(c) if c == quote || c == '\\' => {
                        value.push(c);
                        self.advance();
                    }
                    _ => value.push('\\'),
                },
                Some(c) if c == quote => break,
                Some(c) => value.push(c),
                None => {
                    return self.make_token(TokenKind::Error(String::from(
                        "Unterminated string literal",
                    )));
                }
            }
        }

        self.make_token(TokenKind::String(value))
    }

    /// Returns true if the character after a sign starts a number.
    fn sign_starts_number(&self) -> bool {
        match self.peek() {
            Some(c) if c.is_ascii_digit() => true,
            Some('.') => self.peek_next().is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    }

    /// Scans the next token.
    #[must_use]
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        self.start = self.pos;

        let Some(c) = self.advance() else {
            return self.make_token(TokenKind::Eof);
        };

        match c {
            '(' => self.make_token(TokenKind::LeftParen),
            ')' => self.make_token(TokenKind::RightParen),
            ',' => self.make_token(TokenKind::Comma),
            '*' => self.make_token(TokenKind::Star),
            '=' => self.make_token(TokenKind::Eq),
            '<' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::LtEq)
                } else if self.peek() == Some('>') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Lt)
                }
            }
            '>' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::GtEq)
                } else {
                    self.make_token(TokenKind::Gt)
                }
            }
            '!' => {
                if self.peek() == Some('=') {
                    self.advance();
                    self.make_token(TokenKind::NotEq)
                } else {
                    self.make_token(TokenKind::Error(String::from("Unexpected character: !")))
                }
            }

            '\'' | '"' => {
                self.pos = self.start;
                self.scan_string(c)
            }

            '+' | '-' if self.sign_starts_number() => {
                self.pos = self.start;
                self.scan_number()
            }

            '.' if self.peek().is_some_and(|c| c.is_ascii_digit()) => {
                self.pos = self.start;
                self.scan_number()
            }

            c if c.is_ascii_digit() => {
                self.pos = self.start;
                self.scan_number()
            }

            c if c.is_ascii_alphabetic() || c == '_' => {
                self.pos = self.start;
                self.scan_identifier()
            }

            _ => self.make_token(TokenKind::Error(format!("Unexpected character: {c}"))),
        }
    }

    /// Tokenizes the entire input and returns all tokens.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(token_kinds(""), vec![TokenKind::Eof]);
        assert_eq!(token_kinds("   \n\t  "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            token_kinds("select FROM wHeRe"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_identifiers_keep_case() {
        assert_eq!(
            token_kinds("ID name _tmp col2"),
            vec![
                TokenKind::Identifier(String::from("ID")),
                TokenKind::Identifier(String::from("name")),
                TokenKind::Identifier(String::from("_tmp")),
                TokenKind::Identifier(String::from("col2")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_signed_numbers() {
        assert_eq!(
            token_kinds("42 -7 +3 2.5 -0.25 .5 1e3"),
            vec![
                TokenKind::Integer(42),
                TokenKind::Integer(-7),
                TokenKind::Integer(3),
                TokenKind::Float(2.5),
                TokenKind::Float(-0.25),
                TokenKind::Float(0.5),
                TokenKind::Float(1000.0),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_integer_beyond_i64_becomes_float() {
        assert_eq!(
            token_kinds("99999999999999999999 -99999999999999999999"),
            vec![
                TokenKind::Float(1e20),
                TokenKind::Float(-1e20),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            token_kinds("9223372036854775807"),
            vec![TokenKind::Integer(i64::MAX), TokenKind::Eof]
        );
    }

    #[test]
    fn test_lone_minus_is_error() {
        let kinds = token_kinds("age - 3");
        assert!(matches!(kinds[1], TokenKind::Error(_)));
    }

    #[test]
    fn test_strings_both_quotes() {
        assert_eq!(
            token_kinds(r#"'John Doe' "Engineering" 'it\'s'"#),
            vec![
                TokenKind::String(String::from("John Doe")),
                TokenKind::String(String::from("Engineering")),
                TokenKind::String(String::from("it's")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_string_preserves_whitespace() {
        assert_eq!(
            token_kinds("'  padded  '"),
            vec![TokenKind::String(String::from("  padded  ")), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let kinds = token_kinds("'abc");
        assert_eq!(
            kinds[0],
            TokenKind::Error(String::from("Unterminated string literal"))
        );
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("= != <> < <= > >="),
            vec![
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::LtEq,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_simple_select() {
        assert_eq!(
            token_kinds("SELECT id, name FROM users WHERE age>=30"),
            vec![
                TokenKind::Keyword(Keyword::Select),
                TokenKind::Identifier(String::from("id")),
                TokenKind::Comma,
                TokenKind::Identifier(String::from("name")),
                TokenKind::Keyword(Keyword::From),
                TokenKind::Identifier(String::from("users")),
                TokenKind::Keyword(Keyword::Where),
                TokenKind::Identifier(String::from("age")),
                TokenKind::GtEq,
                TokenKind::Integer(30),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_span_tracking() {
        let tokens = Lexer::new("SELECT id").tokenize();
        assert_eq!(tokens[0].span, Span::new(0, 6));
        assert_eq!(tokens[1].span, Span::new(7, 9));
    }
}
