//! Schema discovery and per-table column metadata.
//!
//! Every sub-directory of the data directory holding a `metadata.json`
//! is a schema:
//!
//! ```text
//! <data-dir>/<schema>/metadata.json
//! <data-dir>/<schema>/<table>.csv
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::types::ColumnType;

/// File name of the per-schema metadata document.
pub const METADATA_FILE: &str = "metadata.json";

#[derive(Debug, Deserialize)]
struct MetadataFile {
    tables: Vec<TableDecl>,
}

#[derive(Debug, Deserialize)]
struct TableDecl {
    name: String,
    columns: Vec<ColumnDecl>,
}

#[derive(Debug, Deserialize)]
struct ColumnDecl {
    name: String,
    #[serde(rename = "type")]
    declared_type: String,
}

/// A declared column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    /// Column name, case preserved.
    pub name: String,
    /// The type name as written in the metadata file.
    pub declared_type: String,
    /// The normalized type.
    pub column_type: ColumnType,
}

impl ColumnMeta {
    /// Creates a column, normalizing its declared type.
    #[must_use]
    pub fn new(name: impl Into<String>, declared_type: impl Into<String>) -> Self {
        let declared_type = declared_type.into();
        Self {
            name: name.into(),
            column_type: ColumnType::from_declared(&declared_type),
            declared_type,
        }
    }
}

/// Column metadata of one table, in declared order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub name: String,
    pub columns: Vec<ColumnMeta>,
}

impl TableMeta {
    /// Returns the position of a column, matching the name exactly.
    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns the normalized type of every column in declared order.
    #[must_use]
    pub fn column_types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.column_type).collect()
    }
}

/// One schema directory and its tables.
#[derive(Debug, Clone)]
pub struct SchemaMeta {
    pub name: String,
    pub dir: PathBuf,
    pub tables: Vec<TableMeta>,
}

impl SchemaMeta {
    /// Reads `metadata.json` from a schema directory.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the file cannot be read or decoded.
    pub fn load(name: impl Into<String>, dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        let path = dir.join(METADATA_FILE);
        let raw = fs::read_to_string(&path).map_err(|source| StorageError::DataDir {
            path: path.clone(),
            source,
        })?;
        let file: MetadataFile =
            serde_json::from_str(&raw).map_err(|source| StorageError::Metadata { path, source })?;

        let tables = file
            .tables
            .into_iter()
            .map(|t| TableMeta {
                name: t.name,
                columns: t
                    .columns
                    .into_iter()
                    .map(|c| ColumnMeta::new(c.name, c.declared_type))
                    .collect(),
            })
            .collect();

        Ok(Self {
            name: name.into(),
            dir,
            tables,
        })
    }

    /// Looks up a table by exact name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableMeta> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Returns the path of a table's CSV file.
    #[must_use]
    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.csv"))
    }
}

/// All schemas found under a data directory.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    schemas: BTreeMap<String, SchemaMeta>,
}

impl Catalog {
    /// Discovers every schema under `root`.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if `root` cannot be listed or a schema's
    /// metadata is invalid.
    pub fn load(root: &Path) -> Result<Self, StorageError> {
        let entries = fs::read_dir(root).map_err(|source| StorageError::DataDir {
            path: root.to_path_buf(),
            source,
        })?;

        let mut catalog = Self::default();
        for entry in entries {
            let entry = entry.map_err(|source| StorageError::DataDir {
                path: root.to_path_buf(),
                source,
            })?;
            let dir = entry.path();
            if !dir.join(METADATA_FILE).is_file() {
                debug!(path = %dir.display(), "Skipping entry without metadata");
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let schema = SchemaMeta::load(name.clone(), dir)?;
            debug!(schema = %name, tables = schema.tables.len(), "Loaded schema");
            catalog.schemas.insert(name, schema);
        }

        info!(root = %root.display(), schemas = catalog.schemas.len(), "Catalog loaded");
        Ok(catalog)
    }

    /// Adds or replaces a schema.
    pub fn insert(&mut self, schema: SchemaMeta) {
        self.schemas.insert(schema.name.clone(), schema);
    }

    /// Looks up a schema by exact name.
    #[must_use]
    pub fn schema(&self, name: &str) -> Option<&SchemaMeta> {
        self.schemas.get(name)
    }

    /// Returns the schema names, sorted.
    #[must_use]
    pub fn schema_names(&self) -> Vec<String> {
        self.schemas.keys().cloned().collect()
    }
}
