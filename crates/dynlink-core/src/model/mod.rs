//! Runtime record model.
//!
//! Types here are the *runtime representations* of schema-level concepts.
//! They are assembled once by schema bootstrap and then shared read-only
//! across every record instance and request.
//!
//! In general:
//! - Schema bootstrap defines *what exists*
//! - `model` defines *what runs*

pub mod property;
pub mod record_type;
pub mod schema;

#[cfg(test)]
mod tests;

use crate::error::{ErrorOrigin, InternalError};
use thiserror::Error as ThisError;

// re-exports
pub use property::{PropertyDescriptor, PropertyKind, ValueType};
pub use record_type::RecordType;
pub use schema::Schema;

///
/// ModelError
///
/// Schema assembly failures. Raised while building record types,
/// never while records are in use.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ModelError {
    #[error("record type name '{name}' is invalid: {reason}")]
    InvalidRecordTypeName { name: String, reason: &'static str },

    #[error("property name '{record_type}.{property}' is invalid: {reason}")]
    InvalidPropertyName {
        record_type: String,
        property: String,
        reason: &'static str,
    },

    #[error("record type '{record_type}' declares property '{property}' twice")]
    DuplicateProperty {
        record_type: String,
        property: String,
    },

    #[error("primary key '{record_type}.{property}' must be a keyable scalar")]
    InvalidPrimaryKey {
        record_type: String,
        property: String,
    },

    #[error("property '{record_type}.{property}' cannot declare mapped_by: {reason}")]
    InvalidMappedBy {
        record_type: String,
        property: String,
        reason: &'static str,
    },

    #[error("record type '{0}' already registered")]
    DuplicateRecordType(String),

    #[error("property '{record_type}.{property}' references unknown record type '{target}'")]
    UnknownTarget {
        record_type: String,
        property: String,
        target: String,
    },

    #[error(
        "mapped_by '{record_type}.{property}' -> '{target}.{back_reference}' is not a to-one back-reference"
    )]
    BrokenBackReference {
        record_type: String,
        property: String,
        target: String,
        back_reference: String,
    },
}

impl From<ModelError> for InternalError {
    fn from(err: ModelError) -> Self {
        Self::invariant(ErrorOrigin::Model, err.to_string())
    }
}

///
/// UnknownPropertyError
///
/// A property name or position that the record type does not declare.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("record type '{record_type}' has no property '{property}'")]
pub struct UnknownPropertyError {
    pub record_type: String,
    pub property: String,
}

impl From<UnknownPropertyError> for InternalError {
    fn from(err: UnknownPropertyError) -> Self {
        Self::invalid_input(ErrorOrigin::Model, err.to_string())
    }
}
