//! Declared column types and the coercion of raw fields.

use core::fmt;

use chrono::NaiveDate;

use super::Value;
use crate::error::CoercionError;

/// Format accepted for `date` and `datetime` columns.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The closed set of column types a table may declare.
///
/// Declared type names are normalized once through [`ColumnType::from_declared`]
/// when metadata is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    Integer,
    Float,
    Boolean,
    Date,
    /// Parsed with the same `YYYY-MM-DD` format as `Date`.
    DateTime,
    /// Only the literal `null` is accepted.
    Null,
    /// Unrecognized declared type: best-effort conversion.
    Untyped,
}

impl ColumnType {
    /// Normalizes a declared type name (case-insensitive).
    #[must_use]
    pub fn from_declared(declared: &str) -> Self {
        match declared.trim().to_ascii_lowercase().as_str() {
            "varchar" | "text" | "char" | "string" => Self::Text,
            "integer" | "int" | "bigint" | "smallint" | "tinyint" => Self::Integer,
            "float" | "double" | "decimal" | "dec" | "real" => Self::Float,
            "boolean" | "bool" => Self::Boolean,
            "date" => Self::Date,
            "datetime" | "timestamp" => Self::DateTime,
            "null" => Self::Null,
            _ => Self::Untyped,
        }
    }

    /// Returns the canonical lowercase name of the type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Null => "null",
            Self::Untyped => "untyped",
        }
    }

    /// Converts a raw CSV field to a value of this type.
    ///
    /// # Errors
    ///
    /// Returns a `CoercionError` if `raw` is not a valid representation.
    pub fn coerce(self, raw: &str) -> Result<Value, CoercionError> {
        let invalid = || CoercionError {
            raw: raw.to_string(),
            target: self,
        };

        match self {
            Self::Text => Ok(Value::Text(strip_quotes(raw).unwrap_or(raw).to_string())),
            Self::Integer => raw.trim().parse().map(Value::Integer).map_err(|_| invalid()),
            Self::Float => parse_finite(raw).map(Value::Float).ok_or_else(invalid),
            Self::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    Ok(Value::Boolean(true))
                } else if raw.eq_ignore_ascii_case("false") {
                    Ok(Value::Boolean(false))
                } else {
                    Err(invalid())
                }
            }
            Self::Date | Self::DateTime => NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map(Value::Date)
                .map_err(|_| invalid()),
            Self::Null => {
                if raw.eq_ignore_ascii_case("null") {
                    Ok(Value::Null)
                } else {
                    Err(invalid())
                }
            }
            Self::Untyped => Ok(coerce_untyped(raw)),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strips exactly one layer of surrounding single quotes.
fn strip_quotes(raw: &str) -> Option<&str> {
    if raw.len() >= 2 {
        raw.strip_prefix('\'')?.strip_suffix('\'')
    } else {
        None
    }
}

fn coerce_untyped(raw: &str) -> Value {
    if let Some(inner) = strip_quotes(raw) {
        return Value::Text(inner.to_string());
    }
    if let Ok(n) = raw.trim().parse::<i64>() {
        return Value::Integer(n);
    }
    if let Some(x) = parse_finite(raw) {
        return Value::Float(x);
    }
    Value::Text(raw.to_string())
}

/// Parses a float, refusing `NaN` and the infinities JSON cannot carry.
fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|x| x.is_finite())
}
