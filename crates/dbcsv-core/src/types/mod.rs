//! Column types and typed values.

mod column;
mod value;

pub use column::ColumnType;
pub use value::Value;
