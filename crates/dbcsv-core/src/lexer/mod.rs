//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer for the SELECT dialect understood by the engine.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
