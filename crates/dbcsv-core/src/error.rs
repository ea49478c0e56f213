//! Error types for the query engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::parser::ParseError;
use crate::types::ColumnType;

/// A raw field that could not be converted to its declared column type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {target} value: '{raw}'")]
pub struct CoercionError {
    /// The raw field text.
    pub raw: String,
    /// The declared type it failed to convert to.
    pub target: ColumnType,
}

/// Errors raised while loading metadata or opening a table file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Data directory {path} is not readable: {source}")]
    DataDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid metadata in {path}: {source}")]
    Metadata {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Table {table} not found in schema {schema}.")]
    MissingTableFile { schema: String, table: String },

    #[error("Error loading table {schema}/{table}: {source}")]
    Csv {
        schema: String,
        table: String,
        source: csv::Error,
    },

    #[error("Header length ({found}) does not match column length ({expected}) in {schema}/{table}.")]
    HeaderLength {
        schema: String,
        table: String,
        expected: usize,
        found: usize,
    },

    #[error("Header names do not match column names in {schema}/{table}: expected {expected}, found {found}.")]
    HeaderName {
        schema: String,
        table: String,
        expected: String,
        found: String,
    },
}

/// Semantic errors raised while binding a statement to table metadata.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Table {table} not found in schema {schema}.")]
    TableNotFound { schema: String, table: String },

    #[error("Column {column} not found in table {table}.")]
    ColumnNotFound { table: String, column: String },

    #[error("Invalid LIKE pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Any failure surfaced by [`crate::Engine::execute`].
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Syntax error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Plan(#[from] PlanError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Schema {schema} not found. Available schemas: {}", available.join(", "))]
    SchemaNotFound {
        schema: String,
        available: Vec<String>,
    },
}

impl EngineError {
    /// Returns true if the failure names a schema that does not exist.
    #[must_use]
    pub const fn is_schema_not_found(&self) -> bool {
        matches!(self, Self::SchemaNotFound { .. })
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
