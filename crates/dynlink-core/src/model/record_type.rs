use crate::model::{
    ModelError, UnknownPropertyError,
    property::{PropertyDescriptor, PropertyKind, ValueType},
};
use std::collections::HashMap;

///
/// RecordType
///
/// Named, ordered list of property descriptors.
///
/// Invariants:
/// - Property positions are declaration order and never change.
/// - Name lookup goes through an index built once at construction.
/// - Immutable after construction; shared behind `Arc` by every record.
///

#[derive(Debug)]
pub struct RecordType {
    name: String,
    properties: Vec<PropertyDescriptor>,
    index: HashMap<String, usize>,
    primary_key: Vec<usize>,
    canonical_key: Vec<usize>,
}

impl RecordType {
    /// Assemble and validate a record type.
    pub fn new(
        name: impl Into<String>,
        properties: Vec<PropertyDescriptor>,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        validate_type_name(&name)?;

        // Phase 1: build the name index, rejecting bad names and duplicates.
        let mut index = HashMap::with_capacity(properties.len());
        for (position, property) in properties.iter().enumerate() {
            validate_property_name(&name, property.name())?;
            if index.insert(property.name().to_string(), position).is_some() {
                return Err(ModelError::DuplicateProperty {
                    record_type: name,
                    property: property.name().to_string(),
                });
            }
        }

        // Phase 2: per-property shape checks.
        for property in &properties {
            if property.is_primary_key() {
                let keyable = property.kind() == PropertyKind::Scalar
                    && property
                        .value_type()
                        .scalar_kind()
                        .is_some_and(|kind| kind.is_keyable());
                if !keyable {
                    return Err(ModelError::InvalidPrimaryKey {
                        record_type: name,
                        property: property.name().to_string(),
                    });
                }
            }

            if property.mapped_by_property().is_some() {
                let reason = match (property.kind(), property.value_type()) {
                    (PropertyKind::ToManyCollection, ValueType::Record(_)) => None,
                    (PropertyKind::ToManyCollection, ValueType::Scalar(_)) => {
                        Some("element type is not a record")
                    }
                    _ => Some("only to-many collections maintain back-references"),
                };
                if let Some(reason) = reason {
                    return Err(ModelError::InvalidMappedBy {
                        record_type: name,
                        property: property.name().to_string(),
                        reason,
                    });
                }
            }
        }

        // Phase 3: derive key orderings.
        let primary_key: Vec<usize> = properties
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_primary_key())
            .map(|(position, _)| position)
            .collect();
        let mut canonical_key = primary_key.clone();
        canonical_key.sort_by(|a, b| properties[*a].name().cmp(properties[*b].name()));

        Ok(Self {
            name,
            properties,
            index,
            primary_key,
            canonical_key,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    #[must_use]
    pub const fn property_count(&self) -> usize {
        self.properties.len()
    }

    /// Resolve a property name to its stable position.
    pub fn property_index(&self, name: &str) -> Result<usize, UnknownPropertyError> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| self.unknown_property(name))
    }

    pub fn property(&self, name: &str) -> Result<&PropertyDescriptor, UnknownPropertyError> {
        let position = self.property_index(name)?;

        Ok(&self.properties[position])
    }

    pub fn property_at(&self, position: usize) -> Result<&PropertyDescriptor, UnknownPropertyError> {
        self.properties
            .get(position)
            .ok_or_else(|| self.unknown_property(&format!("#{position}")))
    }

    /// Primary-key properties in declaration order.
    pub fn primary_key_properties(&self) -> impl ExactSizeIterator<Item = &PropertyDescriptor> {
        self.primary_key.iter().map(|&i| &self.properties[i])
    }

    /// Primary-key properties in canonical (lexicographic by name) order.
    #[must_use]
    pub fn canonical_key_properties(&self) -> Vec<&PropertyDescriptor> {
        self.canonical_key
            .iter()
            .map(|&i| &self.properties[i])
            .collect()
    }

    /// Positions of the primary-key properties in canonical order.
    #[must_use]
    pub fn canonical_key_positions(&self) -> &[usize] {
        &self.canonical_key
    }

    /// Whether records of this type carry an identity (at least one key property).
    #[must_use]
    pub const fn is_identified(&self) -> bool {
        !self.primary_key.is_empty()
    }

    fn unknown_property(&self, property: &str) -> UnknownPropertyError {
        UnknownPropertyError {
            record_type: self.name.clone(),
            property: property.to_string(),
        }
    }
}

// Names become URI path segments and XML element names.
fn name_error(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    let first = chars.next()?;

    if !name.is_ascii() {
        Some("must be ASCII")
    } else if !(first.is_ascii_alphabetic() || first == '_') {
        Some("must start with a letter or '_'")
    } else if !chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')) {
        Some("may only contain letters, digits, '_', '-' and '.'")
    } else {
        None
    }
}

fn validate_type_name(name: &str) -> Result<(), ModelError> {
    let reason = if name.is_empty() {
        Some("empty")
    } else {
        name_error(name)
    };

    match reason {
        Some(reason) => Err(ModelError::InvalidRecordTypeName {
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn validate_property_name(record_type: &str, property: &str) -> Result<(), ModelError> {
    let reason = if property.is_empty() {
        Some("empty")
    } else {
        name_error(property)
    };

    match reason {
        Some(reason) => Err(ModelError::InvalidPropertyName {
            record_type: record_type.to_string(),
            property: property.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
