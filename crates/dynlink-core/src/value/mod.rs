mod text;
mod wire;


use crate::{
    record::DynamicRecord,
    types::{Float64, Timestamp, Ulid},
};
use dynlink_primitives::ScalarKind;
use std::fmt;

// re-exports
pub use text::ConversionError;
pub use wire::{WireRecord, WireValue};

///
/// MapValueError
///
/// Invariant violations for `Value::Map` construction.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum MapValueError {
    EmptyKey { index: usize },
    NonScalarKey { index: usize, key: Value },
    DuplicateKey { left_index: usize, right_index: usize },
}

impl fmt::Display for MapValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyKey { index } => write!(f, "map key at index {index} must be non-null"),
            Self::NonScalarKey { index, key } => {
                write!(f, "map key at index {index} is not scalar: {key:?}")
            }
            Self::DuplicateKey {
                left_index,
                right_index,
            } => write!(
                f,
                "map contains duplicate keys at positions {left_index} and {right_index}"
            ),
        }
    }
}

impl std::error::Error for MapValueError {}

///
/// Value
///
/// Runtime value held in one record slot.
///
/// Null        → the empty sentinel returned for unset scalar and to-one slots.
/// Ref         → identity-bearing reference to another record.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    Blob(Vec<u8>),
    Bool(bool),
    Float64(Float64),
    Int(i64),
    /// Ordered list of values.
    /// Backs to-many collection slots; order is insertion order.
    List(Vec<Self>),
    /// Key/value entries in insertion order; keys are scalar and unique.
    Map(Vec<(Self, Self)>),
    Null,
    Ref(DynamicRecord),
    Text(String),
    Timestamp(Timestamp),
    Uint(u64),
    Ulid(Ulid),
}

impl Value {
    ///
    /// CONSTRUCTION
    ///

    /// Build a `Value::List` from owned items.
    pub fn from_list<T>(items: Vec<T>) -> Self
    where
        T: Into<Self>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Build a `Value::Map` from owned key/value entries.
    ///
    /// Keys must be scalar, non-null, and unique. Entry order is preserved.
    pub fn from_map(entries: Vec<(Self, Self)>) -> Result<Self, MapValueError> {
        Self::validate_map_entries(&entries)?;

        Ok(Self::Map(entries))
    }

    /// Validate map entry invariants without changing order.
    pub fn validate_map_entries(entries: &[(Self, Self)]) -> Result<(), MapValueError> {
        for (index, (key, _)) in entries.iter().enumerate() {
            if key.is_null() {
                return Err(MapValueError::EmptyKey { index });
            }
            if !key.is_scalar() {
                return Err(MapValueError::NonScalarKey {
                    index,
                    key: key.clone(),
                });
            }
            if let Some(left_index) = entries[..index].iter().position(|(k, _)| k == key) {
                return Err(MapValueError::DuplicateKey {
                    left_index,
                    right_index: index,
                });
            }
        }

        Ok(())
    }

    ///
    /// TYPES
    ///

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Scalars are everything that is not a container, a reference, or null.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        self.scalar_kind().is_some()
    }

    #[must_use]
    pub const fn scalar_kind(&self) -> Option<ScalarKind> {
        match self {
            Self::Blob(_) => Some(ScalarKind::Blob),
            Self::Bool(_) => Some(ScalarKind::Bool),
            Self::Float64(_) => Some(ScalarKind::Float64),
            Self::Int(_) => Some(ScalarKind::Int),
            Self::Text(_) => Some(ScalarKind::Text),
            Self::Timestamp(_) => Some(ScalarKind::Timestamp),
            Self::Uint(_) => Some(ScalarKind::Uint),
            Self::Ulid(_) => Some(ScalarKind::Ulid),
            Self::List(_) | Self::Map(_) | Self::Null | Self::Ref(_) => None,
        }
    }

    /// Stable human-readable value kind label for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::List(_) => "List",
            Self::Map(_) => "Map",
            Self::Null => "Null",
            Self::Ref(_) => "Ref",
            scalar => match scalar.scalar_kind() {
                Some(kind) => kind.label(),
                None => "Unknown",
            },
        }
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub const fn as_record(&self) -> Option<&DynamicRecord> {
        match self {
            Self::Ref(record) => Some(record),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&[(Self, Self)]> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    ///
    /// CANONICAL TEXT
    ///

    /// Canonical string form of a scalar value, used by key and link encoding.
    ///
    /// Returns `None` for non-scalars and for kinds without canonical text.
    #[must_use]
    pub fn canonical_text(&self) -> Option<String> {
        text::canonical_text(self)
    }

    /// Parse canonical text into a value of the requested scalar kind.
    pub fn parse_canonical(kind: ScalarKind, input: &str) -> Result<Self, ConversionError> {
        text::parse_canonical(kind, input)
    }
}

macro_rules! impl_from_value {
    ( $( $ty:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    }
}

impl_from_value! {
    bool => Bool,
    Float64 => Float64,
    i8 => Int,
    i16 => Int,
    i32 => Int,
    i64 => Int,
    String => Text,
    &str => Text,
    Timestamp => Timestamp,
    u8 => Uint,
    u16 => Uint,
    u32 => Uint,
    u64 => Uint,
    Ulid => Ulid,
    Vec<u8> => Blob,
    DynamicRecord => Ref,
}

impl From<&DynamicRecord> for Value {
    fn from(record: &DynamicRecord) -> Self {
        Self::Ref(record.clone())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}
