//! The query engine facade: SQL text and a schema name in, rows out.

use std::path::Path;

use tracing::debug;

use crate::catalog::{Catalog, ColumnMeta};
use crate::error::{EngineError, Result, StorageError};
use crate::parser::parse;
use crate::planner::{Plan, RowSequence};

/// A started query: its lazy rows and the projected columns.
#[derive(Debug)]
pub struct Execution {
    pub rows: RowSequence,
    pub description: Vec<ColumnMeta>,
}

/// Parses, plans and opens queries against a loaded catalog.
#[derive(Debug, Clone)]
pub struct Engine {
    catalog: Catalog,
}

impl Engine {
    /// Creates an engine over an already loaded catalog.
    #[must_use]
    pub const fn new(catalog: Catalog) -> Self {
        Self { catalog }
    }

    /// Loads every schema under `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the directory or a schema's metadata
    /// cannot be read.
    pub fn open(data_dir: impl AsRef<Path>) -> std::result::Result<Self, StorageError> {
        Catalog::load(data_dir.as_ref()).map(Self::new)
    }

    /// Returns the available schema names, sorted.
    #[must_use]
    pub fn schemas(&self) -> Vec<String> {
        self.catalog.schema_names()
    }

    /// Returns true if a schema with this exact name exists.
    #[must_use]
    pub fn has_schema(&self, schema: &str) -> bool {
        self.catalog.schema(schema).is_some()
    }

    /// Returns the underlying catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Parses and plans `sql` against `schema` and opens its row source.
    ///
    /// No data row is read before the returned sequence is pulled.
    ///
    /// # Errors
    ///
    /// Returns an `EngineError` for unknown schemas, syntax errors, unknown
    /// tables or columns, and misconfigured table files.
    pub fn execute(&self, sql: &str, schema: &str) -> Result<Execution> {
        let schema_meta =
            self.catalog
                .schema(schema)
                .ok_or_else(|| EngineError::SchemaNotFound {
                    schema: schema.to_string(),
                    available: self.schemas(),
                })?;

        let statement = parse(sql)?;
        debug!(%schema, %statement, "Parsed statement");

        let plan = Plan::compile(&statement, schema_meta)?;
        let description = plan.description();
        let rows = plan.open(schema_meta)?;

        Ok(Execution { rows, description })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::types::Value;

    fn data_dir() -> tempfile::TempDir {
        let root = tempfile::tempdir().unwrap();
        let schema = root.path().join("schema1");
        fs::create_dir_all(&schema).unwrap();
        fs::write(
            schema.join("metadata.json"),
            r#"{"tables": [{"name": "table2", "columns": [
                {"name": "id", "type": "int"},
                {"name": "department", "type": "varchar"},
                {"name": "salary", "type": "float"}
            ]}, {"name": "ghost", "columns": [{"name": "id", "type": "int"}]}]}"#,
        )
        .unwrap();
        fs::write(
            schema.join("table2.csv"),
            "id,department,salary\n1,Engineering,75000\n2,Marketing,68000\n3,Sales,50000\n",
        )
        .unwrap();
        root
    }

    #[test]
    fn test_execute() {
        let root = data_dir();
        let engine = Engine::open(root.path()).unwrap();
        assert_eq!(engine.schemas(), vec!["schema1"]);

        let execution = engine
            .execute(
                "SELECT department FROM table2 WHERE salary >= 68000",
                "schema1",
            )
            .unwrap();
        assert_eq!(execution.description.len(), 1);
        let rows: Vec<_> = execution.rows.collect();
        assert_eq!(
            rows,
            vec![
                vec![Value::from("Engineering")],
                vec![Value::from("Marketing")],
            ]
        );
    }

    #[test]
    fn test_error_kinds() {
        let root = data_dir();
        let engine = Engine::open(root.path()).unwrap();

        let err = engine.execute("SELECT * FROM table2", "nope").unwrap_err();
        assert!(err.is_schema_not_found());
        assert!(err.to_string().contains("schema1"));

        let err = engine.execute("SELECT id,, department FROM table2", "schema1").unwrap_err();
        assert!(matches!(err, EngineError::Parse(_)));

        let err = engine.execute("SELECT * FROM table3", "schema1").unwrap_err();
        assert!(matches!(err, EngineError::Plan(_)));

        let err = engine.execute("SELECT * FROM ghost", "schema1").unwrap_err();
        assert!(matches!(err, EngineError::Storage(StorageError::MissingTableFile { .. })));
    }
}
