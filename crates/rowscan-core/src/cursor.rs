//! The cursor abstraction over a driver's result rows.
//!
//! A [`Cursor`] is advanced one row at a time. After a successful
//! [`advance`](Cursor::advance) the current row can be scanned into one
//! destination buffer per column, positionally matched to the column order
//! reported by [`columns`](Cursor::columns).
//!
//! Scanning takes `&mut self`, so decoding a row can never overlap with
//! moving the cursor forward.

use std::collections::VecDeque;

use crate::error::ScanError;
use crate::types::{Cell, RawValue};

/// Name and vendor type name of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDescriptor {
    /// Column name as projected by the query.
    pub name: String,
    /// Vendor type name, e.g. `INT8` or `VARCHAR`.
    pub type_name: String,
}

impl ColumnDescriptor {
    /// Creates a new column descriptor.
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// A forward-only cursor over result rows.
pub trait Cursor {
    /// Returns the ordered column descriptors of the active result.
    fn columns(&self) -> Result<Vec<ColumnDescriptor>, ScanError>;

    /// Moves to the next row. Returns `false` once the rows are exhausted.
    fn advance(&mut self) -> Result<bool, ScanError>;

    /// Writes the current row into `dest`, one buffer per column.
    ///
    /// Implementations write each value through [`Cell::store`] so that
    /// buffer kinds are preserved.
    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), ScanError>;
}

impl<C: Cursor + ?Sized> Cursor for &mut C {
    fn columns(&self) -> Result<Vec<ColumnDescriptor>, ScanError> {
        (**self).columns()
    }

    fn advance(&mut self) -> Result<bool, ScanError> {
        (**self).advance()
    }

    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), ScanError> {
        (**self).scan(dest)
    }
}

/// A cursor over rows held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryCursor {
    /// Column descriptors.
    columns: Vec<ColumnDescriptor>,
    /// Rows not yet reached.
    pending: VecDeque<Vec<RawValue>>,
    /// The row the cursor is positioned on.
    current: Option<Vec<RawValue>>,
}

impl MemoryCursor {
    /// Creates a cursor with the given columns and no rows.
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            pending: VecDeque::new(),
            current: None,
        }
    }

    /// Creates a cursor from `(name, type_name)` pairs.
    pub fn with_columns<N, T>(columns: impl IntoIterator<Item = (N, T)>) -> Self
    where
        N: Into<String>,
        T: Into<String>,
    {
        Self::new(
            columns
                .into_iter()
                .map(|(name, type_name)| ColumnDescriptor::new(name, type_name))
                .collect(),
        )
    }

    /// Appends a row.
    pub fn push_row(&mut self, row: Vec<RawValue>) {
        self.pending.push_back(row);
    }

    /// Appends a row, builder style.
    pub fn row(mut self, row: Vec<RawValue>) -> Self {
        self.push_row(row);
        self
    }

    /// Returns the number of rows not yet reached.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl Cursor for MemoryCursor {
    fn columns(&self) -> Result<Vec<ColumnDescriptor>, ScanError> {
        Ok(self.columns.clone())
    }

    fn advance(&mut self) -> Result<bool, ScanError> {
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    fn scan(&mut self, dest: &mut [Cell]) -> Result<(), ScanError> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| ScanError::driver("scan called without a current row"))?;

        if row.len() != dest.len() {
            return Err(ScanError::ColumnCountMismatch {
                expected: dest.len(),
                actual: row.len(),
            });
        }

        for (i, (cell, raw)) in dest.iter_mut().zip(row.iter()).enumerate() {
            cell.store(i, raw.clone())?;
        }

        Ok(())
    }
}
