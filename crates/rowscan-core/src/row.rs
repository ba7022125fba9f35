//! The decoded row container and its typed accessors.
//!
//! A [`DataRow`] maps each column name of its [`Metadata`] to one decoded
//! [`Cell`]. Accessors check the column's declared type against the type
//! they serve before returning anything, so asking for the wrong type is an
//! error value, never a silent conversion:
//!
//! ```rust
//! use rowscan_core::{DataRow, Metadata, RawValue, RowError};
//!
//! let metadata = Metadata::builder()
//!     .append("id", "INT8")
//!     .append("name", "VARCHAR")
//!     .build()?;
//! let row = DataRow::from_raw(metadata, vec![RawValue::Int(1), RawValue::Null])?;
//!
//! assert_eq!(row.get_int("id")?, Some(1));
//! assert_eq!(row.get_string("name")?, None);
//! assert!(matches!(row.get_string("id"), Err(RowError::TypeMismatch { .. })));
//! # Ok::<(), RowError>(())
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};

use crate::decoder::RowDecoder;
use crate::error::{RowError, RowResult, ScanError};
use crate::metadata::Metadata;
use crate::types::{Cell, RawValue, TypeTag};

/// One decoded row, keyed by column name.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// Metadata of the result this row came from.
    metadata: Arc<Metadata>,
    /// Decoded value by column name.
    values: HashMap<String, Cell>,
}

impl DataRow {
    /// Assembles a row from the decoder's buffers.
    pub(crate) fn new(metadata: Arc<Metadata>, values: HashMap<String, Cell>) -> Self {
        Self { metadata, values }
    }

    /// Decodes a single row of wire values against the given metadata.
    pub fn from_raw(metadata: impl Into<Arc<Metadata>>, raw: Vec<RawValue>) -> RowResult<Self> {
        let decoder = RowDecoder::new(metadata);
        let mut buffers = decoder.allocate();
        if buffers.len() != raw.len() {
            return Err(ScanError::ColumnCountMismatch {
                expected: buffers.len(),
                actual: raw.len(),
            }
            .into());
        }
        for (i, (cell, value)) in buffers.iter_mut().zip(raw).enumerate() {
            cell.store(i, value)?;
        }
        decoder.assemble(buffers)
    }

    /// Returns the metadata this row was decoded with.
    pub fn metadata(&self) -> &Arc<Metadata> {
        &self.metadata
    }

    /// Returns the number of distinct columns in this row.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns true if the row has a column with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns the decoded cell of a column without checking its type.
    pub fn cell(&self, name: &str) -> RowResult<&Cell> {
        self.values
            .get(name)
            .ok_or_else(|| RowError::column_not_found(name))
    }

    /// Returns `(name, cell)` pairs in projection order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Cell)> {
        self.metadata
            .names()
            .filter_map(|name| self.values.get(name).map(|cell| (name, cell)))
    }

    /// Returns a column's value as `T`, enforcing the declared type.
    ///
    /// Fails with [`RowError::ColumnNotFound`] if the name is unknown and
    /// with [`RowError::TypeMismatch`] if the column is not declared as
    /// `T::TAG`. SQL NULL is `Ok(None)`.
    pub fn get<T: FromCell>(&self, name: &str) -> RowResult<Option<T>> {
        let cell = self.checked(name, T::TAG)?;
        T::from_cell(cell).ok_or_else(|| {
            RowError::internal(format!(
                "column {} holds a {} buffer, expected {}",
                name,
                cell.kind(),
                T::TAG.buffer_kind()
            ))
        })
    }

    /// Returns a string column (or a column of unsupported type).
    pub fn get_string(&self, name: &str) -> RowResult<Option<String>> {
        self.get(name)
    }

    /// Returns a boolean column.
    pub fn get_bool(&self, name: &str) -> RowResult<Option<bool>> {
        self.get(name)
    }

    /// Returns a date column.
    pub fn get_date(&self, name: &str) -> RowResult<Option<NaiveDate>> {
        self.get(name)
    }

    /// Returns a timestamp column.
    pub fn get_timestamp(&self, name: &str) -> RowResult<Option<NaiveDateTime>> {
        self.get(name)
    }

    /// Returns a numeric column.
    pub fn get_numeric(&self, name: &str) -> RowResult<Option<f64>> {
        self.get(name)
    }

    /// Returns an integer column.
    pub fn get_int(&self, name: &str) -> RowResult<Option<i64>> {
        self.get(name)
    }

    fn checked(&self, name: &str, requested: TypeTag) -> RowResult<&Cell> {
        let declared = self
            .metadata
            .type_of(name)
            .ok_or_else(|| RowError::column_not_found(name))?;

        if !declared.readable_as(requested) {
            return Err(RowError::TypeMismatch {
                column: name.to_string(),
                declared,
                requested,
            });
        }

        self.values
            .get(name)
            .ok_or_else(|| RowError::internal(format!("column {} has no decoded value", name)))
    }
}

impl fmt::Display for DataRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (name, cell)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", name, cell)?;
        }
        write!(f, ")")
    }
}

/// Rust types a typed accessor can return.
pub trait FromCell: Sized {
    /// The declared type a column must have to be read as `Self`.
    const TAG: TypeTag;

    /// Extracts the nullable value. Returns `None` if the cell is of a
    /// different buffer kind.
    fn from_cell(cell: &Cell) -> Option<Option<Self>>;
}

impl FromCell for String {
    const TAG: TypeTag = TypeTag::String;

    fn from_cell(cell: &Cell) -> Option<Option<Self>> {
        match cell {
            Cell::String(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FromCell for bool {
    const TAG: TypeTag = TypeTag::Boolean;

    fn from_cell(cell: &Cell) -> Option<Option<Self>> {
        match cell {
            Cell::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromCell for NaiveDate {
    const TAG: TypeTag = TypeTag::Date;

    fn from_cell(cell: &Cell) -> Option<Option<Self>> {
        match cell {
            Cell::Timestamp(v) => Some(v.map(|t| t.date())),
            _ => None,
        }
    }
}

impl FromCell for NaiveDateTime {
    const TAG: TypeTag = TypeTag::Timestamp;

    fn from_cell(cell: &Cell) -> Option<Option<Self>> {
        match cell {
            Cell::Timestamp(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromCell for f64 {
    const TAG: TypeTag = TypeTag::Numeric;

    fn from_cell(cell: &Cell) -> Option<Option<Self>> {
        match cell {
            Cell::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromCell for i64 {
    const TAG: TypeTag = TypeTag::Integer;

    fn from_cell(cell: &Cell) -> Option<Option<Self>> {
        match cell {
            Cell::Integer(v) => Some(*v),
            _ => None,
        }
    }
}
