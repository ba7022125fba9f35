//! The type registry.
//!
//! A single closed table maps every declared [`TypeTag`] to the buffer kind
//! the decoder allocates for it and the accessor allowed to read it back.
//! Both the decoder and the row accessors go through [`TypeTag::spec`], so
//! "what was decoded" and "what may be retrieved" cannot drift apart.

use std::fmt;

use super::BufferKind;

/// Declared type of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TypeTag {
    /// Character data.
    String = 0,
    /// Boolean.
    Boolean = 1,
    /// Calendar date.
    Date = 2,
    /// Date and time of day.
    Timestamp = 3,
    /// Arbitrary-precision numeric, decoded as a 64-bit float.
    Numeric = 4,
    /// 64-bit signed integer.
    Integer = 5,
    /// Vendor type outside the registry; decoded as a string.
    Unsupported = 6,
}

/// Registry entry for one type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeSpec {
    /// The tag this entry describes.
    pub tag: TypeTag,
    /// Vendor type name matched (case-sensitively) to select this tag.
    pub vendor_name: Option<&'static str>,
    /// Scan buffer allocated for columns of this type.
    pub buffer: BufferKind,
    /// Tag an accessor must serve to read columns of this type.
    pub accessor: TypeTag,
    /// Human-readable name used in error messages.
    pub name: &'static str,
}

/// Indexed by `TypeTag as usize`.
static REGISTRY: [TypeSpec; 7] = [
    TypeSpec {
        tag: TypeTag::String,
        vendor_name: Some("VARCHAR"),
        buffer: BufferKind::String,
        accessor: TypeTag::String,
        name: "string",
    },
    TypeSpec {
        tag: TypeTag::Boolean,
        vendor_name: Some("BOOL"),
        buffer: BufferKind::Boolean,
        accessor: TypeTag::Boolean,
        name: "boolean",
    },
    TypeSpec {
        tag: TypeTag::Date,
        vendor_name: Some("DATE"),
        buffer: BufferKind::Timestamp,
        accessor: TypeTag::Date,
        name: "date",
    },
    TypeSpec {
        tag: TypeTag::Timestamp,
        vendor_name: Some("TIMESTAMP"),
        buffer: BufferKind::Timestamp,
        accessor: TypeTag::Timestamp,
        name: "timestamp",
    },
    TypeSpec {
        tag: TypeTag::Numeric,
        vendor_name: Some("NUMERIC"),
        buffer: BufferKind::Float,
        accessor: TypeTag::Numeric,
        name: "numeric",
    },
    TypeSpec {
        tag: TypeTag::Integer,
        vendor_name: Some("INT8"),
        buffer: BufferKind::Integer,
        accessor: TypeTag::Integer,
        name: "integer",
    },
    TypeSpec {
        tag: TypeTag::Unsupported,
        vendor_name: None,
        buffer: BufferKind::String,
        accessor: TypeTag::String,
        name: "unsupported",
    },
];

impl TypeTag {
    /// Every tag the registry recognizes by vendor name.
    pub const SUPPORTED: [TypeTag; 6] = [
        TypeTag::String,
        TypeTag::Boolean,
        TypeTag::Date,
        TypeTag::Timestamp,
        TypeTag::Numeric,
        TypeTag::Integer,
    ];

    /// Resolves a vendor type name. Unknown names map to `Unsupported`.
    #[must_use]
    pub fn from_vendor(type_name: &str) -> Self {
        REGISTRY
            .iter()
            .find(|spec| spec.vendor_name.is_some_and(|name| name == type_name))
            .map_or(TypeTag::Unsupported, |spec| spec.tag)
    }

    /// Returns the registry entry for this tag.
    #[inline]
    #[must_use]
    pub fn spec(self) -> &'static TypeSpec {
        &REGISTRY[self as usize]
    }

    /// Returns the buffer kind the decoder allocates for this tag.
    #[inline]
    #[must_use]
    pub fn buffer_kind(self) -> BufferKind {
        self.spec().buffer
    }

    /// Returns true if an accessor serving `requested` may read this tag.
    #[inline]
    #[must_use]
    pub fn readable_as(self, requested: TypeTag) -> bool {
        self.spec().accessor == requested
    }

    /// Returns true if the tag is in the registry proper.
    #[must_use]
    pub fn is_supported(self) -> bool {
        self != TypeTag::Unsupported
    }

    /// Returns the human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.spec().name
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
