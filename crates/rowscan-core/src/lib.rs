//! # rowscan-core
//!
//! Typed, null-aware decoding of SQL result rows keyed by column name.
//!
//! Given a result's column names and vendor type names, this crate builds
//! per-row scan buffers, lets a [`Cursor`] fill them, and exposes the row
//! through accessors that enforce each column's declared type:
//!
//! - **Metadata**: ordered column names plus one declared type per name
//! - **Type registry**: the closed table from type tag to buffer kind and
//!   accessor, shared by decoding and access
//! - **Row decoder**: allocates buffers, scans, and assembles a [`DataRow`]
//! - **Row container**: [`DataRow`] and its typed getters
//!
//! ## Example
//!
//! ```rust
//! use rowscan_core::{DecoderConfig, MemoryCursor, RawValue, RowError, Rows};
//!
//! let cursor = MemoryCursor::with_columns([("id", "INT8"), ("name", "VARCHAR")])
//!     .row(vec![RawValue::Int(1), RawValue::from("alice")]);
//!
//! for row in Rows::new(cursor, &DecoderConfig::default())? {
//!     let row = row?;
//!     assert_eq!(row.get_int("id")?, Some(1));
//!     assert_eq!(row.get_string("name")?.as_deref(), Some("alice"));
//! }
//! # Ok::<(), RowError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Decoder configuration.
pub mod config;

/// Cursor abstraction.
pub mod cursor;

/// Row decoding.
pub mod decoder;

/// Error types.
pub mod error;

/// Result metadata.
pub mod metadata;

/// Decoded rows.
pub mod row;

/// Type registry and cell values.
pub mod types;

// Re-exports
pub use config::{DecoderConfig, DuplicatePolicy};
pub use cursor::{ColumnDescriptor, Cursor, MemoryCursor};
pub use decoder::{RowDecoder, Rows};
pub use error::{ErrorCode, RowError, RowResult, ScanError};
pub use metadata::{ColumnType, Metadata, MetadataBuilder};
pub use row::{DataRow, FromCell};
pub use types::{BufferKind, Cell, RawValue, TypeSpec, TypeTag};
