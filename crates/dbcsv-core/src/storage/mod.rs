//! Lazy, forward-only scans over CSV table files.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use csv::{Position, Reader, ReaderBuilder, StringRecord, Terminator};
use tracing::debug;

use crate::catalog::{SchemaMeta, TableMeta};
use crate::error::StorageError;
use crate::types::{ColumnType, Value};

/// The result of pulling one record from a [`TableScan`].
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// A fully coerced row in declared column order.
    Row(Vec<Value>),
    /// No more records.
    EndOfData,
    /// A record that could not be read or coerced.
    Malformed {
        /// 1-based line of the record in the file.
        line: u64,
        reason: String,
    },
}

/// An open table file yielding typed rows one at a time.
pub struct TableScan {
    schema: String,
    table: String,
    types: Vec<ColumnType>,
    reader: Option<Reader<File>>,
    record: StringRecord,
    file_len: u64,
    ends_with_newline: bool,
}

impl TableScan {
    /// Opens a table file and validates its header against the metadata.
    ///
    /// Header names match case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns a `StorageError` if the file is missing or unreadable, or if
    /// the header does not line up with the declared columns.
    pub fn open(schema: &SchemaMeta, table: &TableMeta) -> Result<Self, StorageError> {
        let path = schema.table_path(&table.name);
        let csv_error = |source| StorageError::Csv {
            schema: schema.name.clone(),
            table: table.name.clone(),
            source,
        };

        if !path.is_file() {
            return Err(StorageError::MissingTableFile {
                schema: schema.name.clone(),
                table: table.name.clone(),
            });
        }

        // Only `\n` ends a record so that line counts stay exact; a `\r`
        // left on the last field is stripped below.
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .terminator(Terminator::Any(b'\n'))
            .from_path(&path)
            .map_err(csv_error)?;
        let (file_len, ends_with_newline) =
            file_tail(&path).map_err(|e| csv_error(csv::Error::from(e)))?;

        let header = reader.headers().map_err(csv_error)?;
        if header.len() != table.columns.len() {
            return Err(StorageError::HeaderLength {
                schema: schema.name.clone(),
                table: table.name.clone(),
                expected: table.columns.len(),
                found: header.len(),
            });
        }
        let names_match = table
            .columns
            .iter()
            .zip(header.iter())
            .all(|(column, found)| column.name.eq_ignore_ascii_case(strip_cr(found)));
        if !names_match {
            return Err(StorageError::HeaderName {
                schema: schema.name.clone(),
                table: table.name.clone(),
                expected: join_names(table.columns.iter().map(|c| c.name.as_str())),
                found: join_names(header.iter().map(strip_cr)),
            });
        }

        debug!(schema = %schema.name, table = %table.name, "Opened table scan");
        Ok(Self {
            schema: schema.name.clone(),
            table: table.name.clone(),
            types: table.column_types(),
            reader: Some(reader),
            record: StringRecord::new(),
            file_len,
            ends_with_newline,
        })
    }

    /// Reads and coerces the next record.
    ///
    /// Reaching the end of the file closes the scan. A malformed record is
    /// reported and leaves the decision to stop with the caller. A blank
    /// line counts as a malformed record.
    pub fn next_outcome(&mut self) -> RowOutcome {
        let Some(reader) = self.reader.as_mut() else {
            return RowOutcome::EndOfData;
        };

        let end = match reader.read_record(&mut self.record) {
            Ok(true) => reader.position().clone(),
            Ok(false) => {
                self.close();
                return RowOutcome::EndOfData;
            }
            Err(e) => {
                let line = e.position().map_or(0, csv::Position::line);
                return RowOutcome::Malformed {
                    line,
                    reason: e.to_string(),
                };
            }
        };

        if let Some(line) = self.blank_line_before(&end) {
            return RowOutcome::Malformed {
                line,
                reason: format!("Blank line in {}/{}", self.schema, self.table),
            };
        }

        let line = self.record.position().map_or(0, Position::line);
        if self.record.len() != self.types.len() {
            return RowOutcome::Malformed {
                line,
                reason: format!(
                    "Row length {} does not match column length {} in {}/{}",
                    self.record.len(),
                    self.types.len(),
                    self.schema,
                    self.table
                ),
            };
        }

        let last = self.types.len().saturating_sub(1);
        let row: Result<Vec<Value>, _> = self
            .record
            .iter()
            .zip(&self.types)
            .enumerate()
            .map(|(i, (raw, column_type))| {
                column_type.coerce(if i == last { strip_cr(raw) } else { raw })
            })
            .collect();

        match row {
            Ok(row) => RowOutcome::Row(row),
            Err(e) => RowOutcome::Malformed {
                line,
                reason: e.to_string(),
            },
        }
    }

    /// Finds a blank line skipped by the reader ahead of the current record.
    ///
    /// The record starts where the previous one ended, so every line it
    /// spans beyond its own embedded newlines and terminator was blank.
    /// A CRLF blank line survives the reader as a lone `\r` field.
    fn blank_line_before(&self, end: &Position) -> Option<u64> {
        let start = self.record.position()?;
        if self.record.len() == 1 && &self.record[0] == "\r" {
            return Some(start.line());
        }
        let spanned = end.line().saturating_sub(start.line());
        let embedded = self.record.as_slice().matches('\n').count() as u64;
        let terminated = self.ends_with_newline || end.byte() < self.file_len;
        (spanned > embedded + u64::from(terminated)).then_some(start.line())
    }

    /// Releases the file handle. Idempotent.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(schema = %self.schema, table = %self.table, "Closed table scan");
        }
    }

    /// Returns true once the file handle has been released.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    /// Returns the schema name.
    #[must_use]
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Returns the table name.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }
}

impl core::fmt::Debug for TableScan {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TableScan")
            .field("schema", &self.schema)
            .field("table", &self.table)
            .field("types", &self.types)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn join_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

fn strip_cr(raw: &str) -> &str {
    raw.strip_suffix('\r').unwrap_or(raw)
}

/// Returns the file length and whether its last byte is `\n`.
fn file_tail(path: &Path) -> std::io::Result<(u64, bool)> {
    let mut file = File::open(path)?;
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok((0, false));
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0_u8; 1];
    file.read_exact(&mut last)?;
    Ok((len, last[0] == b'\n'))
}
