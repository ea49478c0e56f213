//! Plan compilation and lazy execution.
//!
//! A [`Plan`] binds a parsed [`Statement`] to a table's metadata: the
//! projection becomes a list of column positions and the filter becomes a
//! [`Predicate`] over the full typed row. Opening a plan yields a
//! [`RowSequence`] that reads nothing until pulled.

mod predicate;

pub use predicate::{like_to_regex, Predicate};

use core::iter::FusedIterator;

use tracing::warn;

use crate::ast::{Projection, Statement};
use crate::catalog::{ColumnMeta, SchemaMeta, TableMeta};
use crate::error::{PlanError, StorageError};
use crate::storage::{RowOutcome, TableScan};
use crate::types::Value;

/// A statement bound to concrete table metadata.
#[derive(Debug, Clone)]
pub struct Plan {
    table: TableMeta,
    projection: Vec<usize>,
    predicate: Option<Predicate>,
}

impl Plan {
    /// Compiles a statement against a schema.
    ///
    /// Resolution order: table, then projected columns, then every column
    /// the filter references. Names match exactly.
    ///
    /// # Errors
    ///
    /// Returns a `PlanError` naming the first table or column that does not
    /// resolve, or a LIKE pattern that does not compile.
    pub fn compile(statement: &Statement, schema: &SchemaMeta) -> Result<Self, PlanError> {
        let table = schema
            .table(&statement.table)
            .ok_or_else(|| PlanError::TableNotFound {
                schema: schema.name.clone(),
                table: statement.table.clone(),
            })?;

        let projection = match &statement.columns {
            Projection::Wildcard => (0..table.columns.len()).collect(),
            Projection::Columns(names) => names
                .iter()
                .map(|name| resolve_column(table, name))
                .collect::<Result<Vec<_>, _>>()?,
        };

        let predicate = statement
            .filter
            .as_ref()
            .map(|filter| Predicate::compile(filter, table))
            .transpose()?;

        Ok(Self {
            table: table.clone(),
            projection,
            predicate,
        })
    }

    /// Returns the bound table.
    #[must_use]
    pub const fn table(&self) -> &TableMeta {
        &self.table
    }

    /// Returns the projected columns in output order.
    #[must_use]
    pub fn description(&self) -> Vec<ColumnMeta> {
        self.projection
            .iter()
            .map(|&i| self.table.columns[i].clone())
            .collect()
    }

    /// Opens the table file and returns the lazy output sequence.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the table file is missing or its header
    /// does not match the metadata.
    pub fn open(self, schema: &SchemaMeta) -> Result<RowSequence, StorageError> {
        let scan = TableScan::open(schema, &self.table)?;
        Ok(self.bind(scan))
    }

    /// Binds the plan to an already opened scan.
    #[must_use]
    pub fn bind(self, scan: TableScan) -> RowSequence {
        RowSequence {
            scan,
            projection: self.projection,
            predicate: self.predicate,
        }
    }
}

pub(crate) fn resolve_column(table: &TableMeta, name: &str) -> Result<usize, PlanError> {
    table
        .column_index(name)
        .ok_or_else(|| PlanError::ColumnNotFound {
            table: table.name.clone(),
            column: name.to_string(),
        })
}

/// The lazy, forward-only output of a plan.
///
/// Filters and projects rows as they are pulled. The first malformed record
/// ends the sequence: rows read before it are kept and no error surfaces.
#[derive(Debug)]
pub struct RowSequence {
    scan: TableScan,
    projection: Vec<usize>,
    predicate: Option<Predicate>,
}

impl RowSequence {
    /// Releases the underlying file. Idempotent.
    pub fn close(&mut self) {
        self.scan.close();
    }

    /// Returns true once the sequence can yield no more rows.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.scan.is_closed()
    }

    fn project(&self, row: &[Value]) -> Vec<Value> {
        self.projection.iter().map(|&i| row[i].clone()).collect()
    }
}

impl Iterator for RowSequence {
    type Item = Vec<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.scan.next_outcome() {
                RowOutcome::Row(row) => {
                    let keep = self
                        .predicate
                        .as_ref()
                        .is_none_or(|predicate| predicate.evaluate(&row));
                    if keep {
                        return Some(self.project(&row));
                    }
                }
                RowOutcome::EndOfData => return None,
                RowOutcome::Malformed { line, reason } => {
                    warn!(
                        schema = %self.scan.schema(),
                        table = %self.scan.table(),
                        line,
                        %reason,
                        "Malformed record, truncating result"
                    );
                    self.scan.close();
                    return None;
                }
            }
        }
    }
}

impl FusedIterator for RowSequence {}
