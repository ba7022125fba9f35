//! Error types for row decoding and typed access.
//!
//! Two layers of errors exist:
//!
//! - [`ScanError`] is reported by a [`Cursor`](crate::cursor::Cursor) when it
//!   cannot write the current row into the provided buffers.
//! - [`RowError`] is what every public operation of this crate returns. Scan
//!   failures are wrapped in [`RowError::Scan`].

use std::fmt;
use thiserror::Error;

use crate::types::{BufferKind, TypeTag};

/// Stable error codes for programmatic handling.
///
/// The high byte is the category, the low byte the specific error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // General errors (0x0000 - 0x00FF)
    /// Internal error (bug).
    Internal = 0x0001,
    /// Invalid argument provided.
    InvalidArgument = 0x0003,

    // Access errors (0x0100 - 0x01FF)
    /// Column not found.
    ColumnNotFound = 0x0100,
    /// Declared type does not match the requested accessor.
    TypeMismatch = 0x0101,

    // Scan errors (0x0200 - 0x02FF)
    /// The driver failed while producing the row.
    DriverFault = 0x0200,
    /// The row has a different number of columns than the metadata.
    ColumnCountMismatch = 0x0201,
    /// A wire value cannot be stored in the buffer allocated for its column.
    IncompatibleValue = 0x0202,
}

impl ErrorCode {
    /// Returns the numeric code.
    #[inline]
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match (*self as u16) >> 8 {
            0x00 => "General",
            0x01 => "Access",
            0x02 => "Scan",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Failure reported by a cursor while scanning the current row.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// The underlying driver reported an error.
    #[error("driver error: {0}")]
    Driver(String),

    /// The number of destination buffers differs from the row width.
    #[error("expected {expected} columns, row has {actual}")]
    ColumnCountMismatch {
        /// Number of buffers supplied.
        expected: usize,
        /// Number of values in the row.
        actual: usize,
    },

    /// A wire value could not be stored into its destination buffer.
    #[error("cannot store {found} into {expected} buffer for column {column}")]
    IncompatibleValue {
        /// Zero-based column position.
        column: usize,
        /// Buffer kind allocated for the column.
        expected: BufferKind,
        /// Description of the wire value.
        found: String,
    },
}

impl ScanError {
    /// Creates a driver error.
    pub fn driver(message: impl Into<String>) -> Self {
        ScanError::Driver(message.into())
    }
}

/// Error type for metadata construction, row decoding and typed access.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    /// An accessor was called with a name the metadata does not contain.
    #[error("no column named {column} in data")]
    ColumnNotFound {
        /// Requested column name.
        column: String,
    },

    /// An accessor was called for a type other than the column's declared one.
    #[error("cannot retrieve {requested} for column {column} of type {declared}")]
    TypeMismatch {
        /// Column name.
        column: String,
        /// Declared type of the column.
        declared: TypeTag,
        /// Type the accessor serves.
        requested: TypeTag,
    },

    /// The same column name appeared twice while building metadata.
    #[error("duplicate column name {column}")]
    DuplicateColumn {
        /// Repeated column name.
        column: String,
    },

    /// The cursor failed to scan the current row.
    #[error("scanning query result: {0}")]
    Scan(#[from] ScanError),

    /// Internal invariant violated - this indicates a bug.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
    },
}

impl RowError {
    /// Creates a column-not-found error.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        RowError::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        RowError::Internal {
            message: message.into(),
        }
    }

    /// Returns the stable error code.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            RowError::ColumnNotFound { .. } => ErrorCode::ColumnNotFound,
            RowError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            RowError::DuplicateColumn { .. } => ErrorCode::InvalidArgument,
            RowError::Scan(ScanError::Driver(_)) => ErrorCode::DriverFault,
            RowError::Scan(ScanError::ColumnCountMismatch { .. }) => {
                ErrorCode::ColumnCountMismatch
            }
            RowError::Scan(ScanError::IncompatibleValue { .. }) => ErrorCode::IncompatibleValue,
            RowError::Internal { .. } => ErrorCode::Internal,
        }
    }

    /// Returns true if row iteration may continue after this error.
    ///
    /// Accessor failures leave the cursor untouched. A scan failure leaves
    /// the read position inconsistent, so the iteration loop must stop.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RowError::ColumnNotFound { .. } | RowError::TypeMismatch { .. }
        )
    }
}

/// Result type for row operations.
pub type RowResult<T> = Result<T, RowError>;
