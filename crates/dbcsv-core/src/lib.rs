//! # dbcsv-core
//!
//! A miniature SQL engine over column-typed CSV tables.
//!
//! SQL text is tokenized and parsed into a [`Statement`], bound to a
//! table's column metadata by the [`Plan`] compiler, and executed as a
//! lazy [`RowSequence`] that reads, coerces, filters and projects rows
//! only as they are pulled.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dbcsv_core::Engine;
//!
//! let engine = Engine::open("data").unwrap();
//! let execution = engine
//!     .execute("SELECT name FROM table1 WHERE age > 25", "schema1")
//!     .unwrap();
//! for row in execution.rows {
//!     println!("{row:?}");
//! }
//! ```
//!
//! ## Dialect
//!
//! ```text
//! SELECT ('*' | column (',' column)*) FROM table [WHERE expr]
//! ```
//!
//! Filters support `= != <> < <= > >=`, `LIKE`, `IS [NOT] NULL`, `AND`,
//! `OR` and parentheses. `AND` binds tighter than `OR`. Keywords are
//! case-insensitive; identifiers are not.

pub mod ast;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod planner;
pub mod protocol;
pub mod storage;
pub mod types;

pub use ast::{ComparisonOp, Expr, Operand, Projection, Statement};
pub use catalog::{Catalog, ColumnMeta, SchemaMeta, TableMeta};
pub use engine::{Engine, Execution};
pub use error::{CoercionError, EngineError, PlanError, Result, StorageError};
pub use lexer::{Keyword, Lexer, Span, Token, TokenKind};
pub use parser::{parse, ParseError, Parser};
pub use planner::{Plan, Predicate, RowSequence};
pub use storage::{RowOutcome, TableScan};
pub use types::{ColumnType, Value};
