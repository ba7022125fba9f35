//! Row decoding.
//!
//! [`RowDecoder`] turns the current row of a [`Cursor`] into a [`DataRow`]:
//!
//! 1. allocate one buffer per column, in metadata order, of the kind the
//!    type registry prescribes for the column's declared type;
//! 2. let the cursor scan the row into those buffers;
//! 3. pair each column name with its buffer, in the same order.
//!
//! All three steps walk the same ordered name list, so buffer position,
//! scan position and row key always agree.
//!
//! [`Rows`] drives the pull loop: advance, decode, yield. It stops at the
//! first scan failure because the cursor position is then unreliable.

use std::collections::HashMap;
use std::iter::FusedIterator;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use crate::config::DecoderConfig;
use crate::cursor::Cursor;
use crate::error::{RowError, RowResult, ScanError};
use crate::metadata::Metadata;
use crate::row::DataRow;
use crate::types::{BufferKind, Cell, TypeTag};

/// Decodes rows of one result against its metadata.
#[derive(Debug, Clone)]
pub struct RowDecoder {
    /// Shared, immutable metadata.
    metadata: Arc<Metadata>,
    /// Buffer kind per column position.
    kinds: Vec<BufferKind>,
}

impl RowDecoder {
    /// Creates a decoder, resolving each column's buffer kind once.
    pub fn new(metadata: impl Into<Arc<Metadata>>) -> Self {
        let metadata = metadata.into();
        let kinds = metadata
            .names()
            .map(|name| {
                metadata
                    .type_of(name)
                    .unwrap_or(TypeTag::Unsupported)
                    .buffer_kind()
            })
            .collect();
        Self { metadata, kinds }
    }

    /// Returns the metadata.
    pub fn metadata(&self) -> &Arc<Metadata> {
        &self.metadata
    }

    /// Returns the buffer kind of every column, in metadata order.
    pub fn buffer_kinds(&self) -> &[BufferKind] {
        &self.kinds
    }

    /// Allocates empty scan buffers for one row.
    pub fn allocate(&self) -> Vec<Cell> {
        self.kinds.iter().map(|&kind| Cell::empty(kind)).collect()
    }

    /// Decodes the row the cursor is positioned on.
    ///
    /// On failure no partial row is produced.
    pub fn decode<C: Cursor + ?Sized>(&self, cursor: &mut C) -> RowResult<DataRow> {
        let mut buffers = self.allocate();
        cursor.scan(&mut buffers)?;
        let row = self.assemble(buffers)?;
        trace!(row = %row, "decoded row");
        Ok(row)
    }

    /// Pairs scanned buffers with column names.
    pub(crate) fn assemble(&self, buffers: Vec<Cell>) -> RowResult<DataRow> {
        if buffers.len() != self.kinds.len() {
            return Err(ScanError::ColumnCountMismatch {
                expected: self.kinds.len(),
                actual: buffers.len(),
            }
            .into());
        }

        let mut values = HashMap::with_capacity(buffers.len());
        for (i, (name, cell)) in self.metadata.names().zip(buffers).enumerate() {
            // a cursor may only fill buffers, never swap their kind
            if cell.kind() != self.kinds[i] {
                return Err(ScanError::IncompatibleValue {
                    column: i,
                    expected: self.kinds[i],
                    found: format!("{} buffer", cell.kind()),
                }
                .into());
            }
            if self.metadata.type_of(name) == Some(TypeTag::Unsupported) {
                debug!(column = name, "decoded unsupported type as string");
            }
            values.insert(name.to_string(), cell);
        }

        Ok(DataRow::new(Arc::clone(&self.metadata), values))
    }
}

/// Pull-based iterator decoding every remaining row of a cursor.
///
/// Yields `Err` at most once; after a scan failure the iterator is
/// exhausted. The cursor is owned (or mutably borrowed) for the whole
/// iteration, and is released when the iterator is dropped.
#[derive(Debug)]
pub struct Rows<C> {
    /// Source cursor.
    cursor: C,
    /// Decoder for the cursor's result.
    decoder: RowDecoder,
    /// Set once rows are exhausted or a failure was yielded.
    done: bool,
    /// Rows decoded so far.
    rows_read: u64,
}

impl<C: Cursor> Rows<C> {
    /// Reads the cursor's metadata and prepares to iterate its rows.
    pub fn new(cursor: C, config: &DecoderConfig) -> RowResult<Self> {
        let metadata = Metadata::from_cursor(&cursor, config)?;
        if config.dump_metadata {
            metadata.dump();
        }
        Ok(Self::with_metadata(cursor, metadata))
    }

    /// Iterates rows with metadata built elsewhere.
    pub fn with_metadata(cursor: C, metadata: impl Into<Arc<Metadata>>) -> Self {
        Self {
            cursor,
            decoder: RowDecoder::new(metadata),
            done: false,
            rows_read: 0,
        }
    }

    /// Returns the metadata shared by every yielded row.
    pub fn metadata(&self) -> &Arc<Metadata> {
        self.decoder.metadata()
    }

    /// Returns the number of rows decoded so far.
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Returns the underlying cursor.
    pub fn into_cursor(self) -> C {
        self.cursor
    }

    fn fail(&mut self, err: RowError) -> Option<RowResult<DataRow>> {
        self.done = true;
        warn!(rows_read = self.rows_read, "row iteration aborted: {}", err);
        Some(Err(err))
    }
}

impl<C: Cursor> Iterator for Rows<C> {
    type Item = RowResult<DataRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.cursor.advance() {
            Ok(true) => {}
            Ok(false) => {
                self.done = true;
                debug!(rows_read = self.rows_read, "rows exhausted");
                return None;
            }
            Err(e) => return self.fail(e.into()),
        }

        match self.decoder.decode(&mut self.cursor) {
            Ok(row) => {
                self.rows_read += 1;
                Some(Ok(row))
            }
            Err(e) => self.fail(e),
        }
    }
}

impl<C: Cursor> FusedIterator for Rows<C> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{ColumnDescriptor, MemoryCursor};
    use crate::types::RawValue;

    fn cursor() -> MemoryCursor {
        MemoryCursor::with_columns([("id", "INT8"), ("name", "VARCHAR"), ("is_good", "BOOL")])
            .row(vec![
                RawValue::Int(1),
                RawValue::from("alice"),
                RawValue::Bool(true),
            ])
            .row(vec![RawValue::Int(2), RawValue::Null, RawValue::Bool(false)])
    }

    #[test]
    fn test_allocate_follows_registry() {
        let md = Metadata::builder()
            .append("a", "NUMERIC")
            .append("b", "DATE")
            .append("c", "TEXT")
            .append("d", "INT8")
            .build()
            .unwrap();
        let decoder = RowDecoder::new(md);
        assert_eq!(
            decoder.buffer_kinds(),
            &[
                BufferKind::Float,
                BufferKind::Timestamp,
                BufferKind::String,
                BufferKind::Integer,
            ]
        );
        assert!(decoder.allocate().iter().all(Cell::is_null));
    }

    #[test]
    fn test_decode_single_row() {
        let mut cursor = cursor();
        let md = Metadata::from_cursor(&cursor, &DecoderConfig::default()).unwrap();
        let decoder = RowDecoder::new(md);

        assert!(cursor.advance().unwrap());
        let row = decoder.decode(&mut cursor).unwrap();
        assert_eq!(row.get_int("id").unwrap(), Some(1));
        assert_eq!(row.get_string("name").unwrap().as_deref(), Some("alice"));
        assert_eq!(row.get_bool("is_good").unwrap(), Some(true));
    }

    #[test]
    fn test_rows_iterates_to_exhaustion() {
        let mut rows = Rows::new(cursor(), &DecoderConfig::default()).unwrap();
        let first = rows.next().unwrap().unwrap();
        let second = rows.next().unwrap().unwrap();
        assert!(rows.next().is_none());
        assert!(rows.next().is_none());
        assert_eq!(rows.rows_read(), 2);

        assert_eq!(first.get_int("id").unwrap(), Some(1));
        assert_eq!(second.get_string("name").unwrap(), None);
        assert!(Arc::ptr_eq(first.metadata(), second.metadata()));
    }

    #[test]
    fn test_rows_stop_after_scan_failure() {
        let cursor = MemoryCursor::with_columns([("id", "INT8")])
            .row(vec![RawValue::Int(1)])
            .row(vec![RawValue::from("not a number")])
            .row(vec![RawValue::Int(3)]);

        let results: Vec<_> = Rows::new(cursor, &DecoderConfig::default())
            .unwrap()
            .collect();
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        let err = results[1].as_ref().unwrap_err();
        assert!(matches!(
            err,
            RowError::Scan(ScanError::IncompatibleValue {
                column: 0,
                expected: BufferKind::Integer,
                ..
            })
        ));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_rows_borrowing_cursor() {
        let mut cursor = cursor();
        let count = Rows::new(&mut cursor, &DecoderConfig::default())
            .unwrap()
            .filter_map(Result::ok)
            .count();
        assert_eq!(count, 2);
        assert_eq!(cursor.remaining(), 0);
    }

    struct KindSwappingCursor;

    impl Cursor for KindSwappingCursor {
        fn columns(&self) -> Result<Vec<ColumnDescriptor>, ScanError> {
            Ok(vec![ColumnDescriptor::new("id", "INT8")])
        }

        fn advance(&mut self) -> Result<bool, ScanError> {
            Ok(true)
        }

        fn scan(&mut self, dest: &mut [Cell]) -> Result<(), ScanError> {
            dest[0] = Cell::String(Some("1".to_string()));
            Ok(())
        }
    }

    #[test]
    fn test_decode_rejects_swapped_buffer_kind() {
        let mut rows = Rows::new(KindSwappingCursor, &DecoderConfig::default()).unwrap();
        let err = rows.next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            RowError::Scan(ScanError::IncompatibleValue { column: 0, .. })
        ));
        assert!(rows.next().is_none());
    }
}
