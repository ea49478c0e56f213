//! Abstract Syntax Tree (AST) types for SELECT statements.

mod expression;
mod statement;

pub use expression::{ComparisonOp, Expr, Operand};
pub use statement::{Projection, Statement};
