//! Scan buffers and decoded cells.
//!
//! A [`Cell`] is both the destination buffer a cursor writes into and the
//! decoded, nullable value a row keeps afterwards. Its variant is fixed at
//! allocation time by the [`BufferKind`] the registry prescribes, so a cell
//! never changes kind; only its content goes from `None` to a value.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::ScanError;

/// Kind of scan buffer allocated for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Nullable string.
    String,
    /// Nullable boolean.
    Boolean,
    /// Nullable date-time; holds both DATE and TIMESTAMP columns.
    Timestamp,
    /// Nullable 64-bit float.
    Float,
    /// Nullable 64-bit signed integer.
    Integer,
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferKind::String => write!(f, "string"),
            BufferKind::Boolean => write!(f, "boolean"),
            BufferKind::Timestamp => write!(f, "timestamp"),
            BufferKind::Float => write!(f, "float"),
            BufferKind::Integer => write!(f, "integer"),
        }
    }
}

/// A value as delivered by the driver for one column of the current row.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// SQL NULL.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Text, including the textual form of NUMERIC.
    Text(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Calendar date.
    Date(NaiveDate),
    /// Date and time.
    Timestamp(NaiveDateTime),
}

impl RawValue {
    /// Returns a short name of the wire kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            RawValue::Null => "null",
            RawValue::Bool(_) => "bool",
            RawValue::Int(_) => "int",
            RawValue::Float(_) => "float",
            RawValue::Text(_) => "text",
            RawValue::Bytes(_) => "bytes",
            RawValue::Date(_) => "date",
            RawValue::Timestamp(_) => "timestamp",
        }
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Bool(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Int(v)
    }
}

impl From<i32> for RawValue {
    fn from(v: i32) -> Self {
        RawValue::Int(i64::from(v))
    }
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Float(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(v: NaiveDate) -> Self {
        RawValue::Date(v)
    }
}

impl From<NaiveDateTime> for RawValue {
    fn from(v: NaiveDateTime) -> Self {
        RawValue::Timestamp(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => RawValue::Null,
        }
    }
}

/// A nullable, decoded column value of exactly one kind.
///
/// `None` is SQL NULL.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// String cell.
    String(Option<String>),
    /// Boolean cell.
    Boolean(Option<bool>),
    /// Date-time cell.
    Timestamp(Option<NaiveDateTime>),
    /// Float cell.
    Float(Option<f64>),
    /// Integer cell.
    Integer(Option<i64>),
}

impl Cell {
    /// Allocates an empty (NULL) buffer of the given kind.
    pub fn empty(kind: BufferKind) -> Self {
        match kind {
            BufferKind::String => Cell::String(None),
            BufferKind::Boolean => Cell::Boolean(None),
            BufferKind::Timestamp => Cell::Timestamp(None),
            BufferKind::Float => Cell::Float(None),
            BufferKind::Integer => Cell::Integer(None),
        }
    }

    /// Returns the buffer kind of this cell.
    pub fn kind(&self) -> BufferKind {
        match self {
            Cell::String(_) => BufferKind::String,
            Cell::Boolean(_) => BufferKind::Boolean,
            Cell::Timestamp(_) => BufferKind::Timestamp,
            Cell::Float(_) => BufferKind::Float,
            Cell::Integer(_) => BufferKind::Integer,
        }
    }

    /// Returns true if this cell holds SQL NULL.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::String(v) => v.is_none(),
            Cell::Boolean(v) => v.is_none(),
            Cell::Timestamp(v) => v.is_none(),
            Cell::Float(v) => v.is_none(),
            Cell::Integer(v) => v.is_none(),
        }
    }

    /// Stores a wire value into this buffer, converting where the buffer
    /// kind allows it.
    ///
    /// `column` is the zero-based position, used only for error reporting.
    /// On error the buffer is left unchanged.
    pub fn store(&mut self, column: usize, raw: RawValue) -> Result<(), ScanError> {
        let kind = self.kind();
        let incompatible = |raw: &RawValue| ScanError::IncompatibleValue {
            column,
            expected: kind,
            found: raw.kind_name().to_string(),
        };

        if matches!(raw, RawValue::Null) {
            *self = Cell::empty(kind);
            return Ok(());
        }

        match self {
            Cell::String(slot) => {
                let text = match raw {
                    RawValue::Text(s) => s,
                    RawValue::Bytes(b) => {
                        String::from_utf8(b).map_err(|_| ScanError::IncompatibleValue {
                            column,
                            expected: kind,
                            found: "non-utf8 bytes".to_string(),
                        })?
                    }
                    RawValue::Bool(b) => b.to_string(),
                    RawValue::Int(i) => i.to_string(),
                    RawValue::Float(f) => f.to_string(),
                    RawValue::Date(d) => d.format("%Y-%m-%d").to_string(),
                    RawValue::Timestamp(t) => t.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
                    RawValue::Null => return Ok(()),
                };
                *slot = Some(text);
            }
            Cell::Boolean(slot) => {
                let value = match &raw {
                    RawValue::Bool(b) => Some(*b),
                    RawValue::Int(0) => Some(false),
                    RawValue::Int(1) => Some(true),
                    RawValue::Text(s) => parse_bool(s),
                    RawValue::Bytes(b) => std::str::from_utf8(b).ok().and_then(parse_bool),
                    _ => None,
                };
                *slot = Some(value.ok_or_else(|| incompatible(&raw))?);
            }
            Cell::Timestamp(slot) => {
                let value = match &raw {
                    RawValue::Timestamp(t) => Some(*t),
                    RawValue::Date(d) => d.and_hms_opt(0, 0, 0),
                    _ => None,
                };
                *slot = Some(value.ok_or_else(|| incompatible(&raw))?);
            }
            Cell::Float(slot) => {
                let value = match &raw {
                    RawValue::Float(f) => Some(*f),
                    RawValue::Int(i) => Some(*i as f64),
                    RawValue::Text(s) => s.trim().parse::<f64>().ok(),
                    RawValue::Bytes(b) => std::str::from_utf8(b)
                        .ok()
                        .and_then(|s| s.trim().parse::<f64>().ok()),
                    _ => None,
                };
                *slot = Some(value.ok_or_else(|| incompatible(&raw))?);
            }
            Cell::Integer(slot) => {
                let value = match &raw {
                    RawValue::Int(i) => Some(*i),
                    RawValue::Float(f) => integral_f64(*f),
                    RawValue::Text(s) => s.trim().parse::<i64>().ok(),
                    RawValue::Bytes(b) => std::str::from_utf8(b)
                        .ok()
                        .and_then(|s| s.trim().parse::<i64>().ok()),
                    _ => None,
                };
                *slot = Some(value.ok_or_else(|| incompatible(&raw))?);
            }
        }

        Ok(())
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::String(Some(s)) => write!(f, "{}", s),
            Cell::Boolean(Some(b)) => write!(f, "{}", b),
            Cell::Timestamp(Some(t)) => write!(f, "{}", t),
            Cell::Float(Some(v)) => write!(f, "{}", v),
            Cell::Integer(Some(i)) => write!(f, "{}", i),
            _ => write!(f, "NULL"),
        }
    }
}

/// Accepts the spellings PostgreSQL drivers emit for booleans.
fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Some(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Some(false),
        _ => None,
    }
}

/// Floats are accepted into integer buffers only when they are whole.
fn integral_f64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
