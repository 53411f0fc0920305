#[macro_use]
mod macros;

use std::fmt;

///
/// ScalarKind
///
/// Canonical scalar kind of a record property.
/// Drives value type checks, key conversion, and wire encoding.
///

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ScalarKind {
    Blob,
    Bool,
    Float64,
    Int,
    Text,
    Timestamp,
    Uint,
    Ulid,
}

impl ScalarKind {
    /// Return the full metadata descriptor for one scalar kind.
    #[must_use]
    pub const fn metadata(self) -> ScalarMetadata {
        scalar_kind_registry!(metadata_from_registry, self)
    }

    /// Return the coarse routing family for this scalar kind.
    #[must_use]
    pub const fn family(self) -> ScalarFamily {
        self.metadata().family
    }

    /// Stable human-readable label for diagnostics.
    #[must_use]
    pub const fn label(self) -> &'static str {
        self.metadata().label
    }

    /// Return whether values of this kind are numeric.
    #[must_use]
    pub const fn is_numeric_value(self) -> bool {
        self.metadata().is_numeric_value
    }

    /// Return whether values of this kind round-trip through canonical text.
    #[must_use]
    pub const fn has_canonical_text(self) -> bool {
        self.metadata().has_canonical_text
    }

    /// Return whether this kind may back a primary-key property.
    #[must_use]
    pub const fn is_keyable(self) -> bool {
        self.metadata().is_keyable
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// ScalarMetadata
///
/// Capability metadata shared across model/core layers.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ScalarMetadata {
    pub family: ScalarFamily,
    pub label: &'static str,
    pub is_numeric_value: bool,
    pub has_canonical_text: bool,
    pub is_keyable: bool,
}

///
/// ScalarFamily
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ScalarFamily {
    Numeric,
    Textual,
    Identifier,
    Blob,
    Bool,
}

/// Ordered list of all scalar kinds in registry order.
pub const ALL_SCALAR_KINDS: [ScalarKind; 8] = scalar_kind_registry!(all_kinds_from_registry);

///
/// TESTS
///
