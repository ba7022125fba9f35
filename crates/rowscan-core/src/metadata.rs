//! Result metadata: ordered column names and their declared types.
//!
//! Metadata is built once per query in a single phase, through
//! [`MetadataBuilder`] or [`Metadata::from_cursor`], and is immutable
//! afterwards. Rows share it through an `Arc`.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{info, warn};

use crate::config::{DecoderConfig, DuplicatePolicy};
use crate::cursor::Cursor;
use crate::error::{RowError, RowResult};
use crate::types::TypeTag;

/// Declared type of a column: the registry tag plus the vendor name it
/// was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnType {
    /// Registry tag.
    pub tag: TypeTag,
    /// Vendor type name as reported by the driver.
    pub type_name: String,
}

impl ColumnType {
    /// Resolves a vendor type name through the registry.
    pub fn from_vendor(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self {
            tag: TypeTag::from_vendor(&type_name),
            type_name,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.type_name)
    }
}

/// Column names in projection order, with one declared type per name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Column names in projection order.
    names: Vec<String>,
    /// Declared type by column name.
    types: HashMap<String, ColumnType>,
}

impl Metadata {
    /// Returns a builder that rejects duplicate column names.
    pub fn builder() -> MetadataBuilder {
        MetadataBuilder::new()
    }

    /// Builds metadata from `(name, vendor_type_name)` pairs.
    pub fn from_columns<N, T>(
        columns: impl IntoIterator<Item = (N, T)>,
        policy: DuplicatePolicy,
    ) -> RowResult<Self>
    where
        N: Into<String>,
        T: Into<String>,
    {
        columns
            .into_iter()
            .fold(MetadataBuilder::with_policy(policy), |builder, (name, ty)| {
                builder.append(name, ty)
            })
            .build()
    }

    /// Reads the column descriptors of a cursor's active result.
    pub fn from_cursor<C: Cursor + ?Sized>(cursor: &C, config: &DecoderConfig) -> RowResult<Self> {
        let columns = cursor.columns()?;
        Self::from_columns(
            columns.into_iter().map(|c| (c.name, c.type_name)),
            config.duplicate_columns,
        )
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the column name at the given position.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Returns the column names in projection order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Returns the declared type tag of a column, or `None` if unknown.
    pub fn type_of(&self, name: &str) -> Option<TypeTag> {
        self.types.get(name).map(|t| t.tag)
    }

    /// Returns the full declared type of a column.
    pub fn column_type(&self, name: &str) -> Option<&ColumnType> {
        self.types.get(name)
    }

    /// Returns true if the metadata has a column with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns `(name, declared type)` pairs in projection order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnType)> {
        // every ordered name has a type slot; see MetadataBuilder::append
        self.names
            .iter()
            .filter_map(|name| self.types.get(name).map(|t| (name.as_str(), t)))
    }

    /// Logs every column and its declared type.
    pub fn dump(&self) {
        for (i, (name, ty)) in self.columns().enumerate() {
            info!(position = i, "column {} is type {}", name, ty);
        }
    }
}

impl fmt::Display for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, (name, ty)) in self.columns().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, ty)?;
        }
        write!(f, ")")
    }
}

/// Single-phase builder for [`Metadata`].
#[derive(Debug, Clone, Default)]
pub struct MetadataBuilder {
    /// Duplicate column policy.
    policy: DuplicatePolicy,
    /// Column names appended so far.
    names: Vec<String>,
    /// Declared types appended so far.
    types: HashMap<String, ColumnType>,
    /// First repeated name seen under `DuplicatePolicy::Reject`.
    duplicate: Option<String>,
}

impl MetadataBuilder {
    /// Creates a builder that rejects duplicate column names.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder with the given duplicate policy.
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Appends a column in projection order.
    pub fn append(mut self, name: impl Into<String>, type_name: impl Into<String>) -> Self {
        self.push(name, type_name);
        self
    }

    /// Appends a column in projection order.
    pub fn push(&mut self, name: impl Into<String>, type_name: impl Into<String>) {
        let name = name.into();
        let column_type = ColumnType::from_vendor(type_name);

        if let Some(previous) = self.types.get(&name) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    if self.duplicate.is_none() {
                        self.duplicate = Some(name.clone());
                    }
                }
                DuplicatePolicy::LastWriteWins => {
                    warn!(
                        "duplicate column {}: type {} replaces {}",
                        name, column_type, previous
                    );
                }
            }
        }

        self.types.insert(name.clone(), column_type);
        self.names.push(name);
    }

    /// Finishes the metadata.
    ///
    /// Fails with [`RowError::DuplicateColumn`] if a name was appended
    /// twice under [`DuplicatePolicy::Reject`]. Every column whose vendor
    /// type is outside the registry is reported once here.
    pub fn build(self) -> RowResult<Metadata> {
        if let Some(column) = self.duplicate {
            return Err(RowError::DuplicateColumn { column });
        }

        let metadata = Metadata {
            names: self.names,
            types: self.types,
        };

        {
            let mut reported = HashSet::new();
            for (name, ty) in metadata.columns() {
                if !ty.tag.is_supported() && reported.insert(name) {
                    warn!(
                        "unhandled data type {} for column {}, using string",
                        ty.type_name, name
                    );
                }
            }
        }

        Ok(metadata)
    }
}
