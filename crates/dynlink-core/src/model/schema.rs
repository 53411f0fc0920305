use crate::model::{ModelError, PropertyKind, RecordType};
use std::{collections::HashMap, sync::Arc};

///
/// Schema
///
/// Registry of published record types, resolved by name.
/// Built during bootstrap, then shared read-only.
///

#[derive(Debug, Default)]
pub struct Schema {
    types: HashMap<String, Arc<RecordType>>,
}

impl Schema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a record type under its name.
    pub fn register(&mut self, record_type: RecordType) -> Result<Arc<RecordType>, ModelError> {
        let name = record_type.name().to_string();
        if self.types.contains_key(&name) {
            return Err(ModelError::DuplicateRecordType(name));
        }

        let record_type = Arc::new(record_type);
        self.types.insert(name, Arc::clone(&record_type));

        Ok(record_type)
    }

    #[must_use]
    pub fn record_type(&self, name: &str) -> Option<&Arc<RecordType>> {
        self.types.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<RecordType>> {
        self.types.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Check cross-type references once every type is registered.
    pub fn validate(&self) -> Result<(), ModelError> {
        for record_type in self.types.values() {
            for property in record_type.properties() {
                let Some(target) = property.value_type().target() else {
                    continue;
                };
                let Some(target_type) = self.types.get(target) else {
                    return Err(ModelError::UnknownTarget {
                        record_type: record_type.name().to_string(),
                        property: property.name().to_string(),
                        target: target.to_string(),
                    });
                };

                if let Some(back_reference) = property.mapped_by_property() {
                    let points_back = target_type.property(back_reference).is_ok_and(|back| {
                        back.kind() == PropertyKind::ToOne
                            && back.value_type().target() == Some(record_type.name())
                    });
                    if !points_back {
                        return Err(ModelError::BrokenBackReference {
                            record_type: record_type.name().to_string(),
                            property: property.name().to_string(),
                            target: target.to_string(),
                            back_reference: back_reference.to_string(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
