use crate::{model::RecordType, value::Value};
use std::collections::BTreeSet;

///
/// FetchGroup
///
/// Set of property names considered loaded on a record.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct FetchGroup {
    properties: BTreeSet<String>,
}

impl FetchGroup {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            properties: properties.into_iter().map(Into::into).collect(),
        }
    }

    /// Group holding exactly the primary-key properties of a type.
    #[must_use]
    pub fn primary_key(record_type: &RecordType) -> Self {
        Self::new(record_type.primary_key_properties().map(|p| p.name()))
    }

    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.properties.contains(property)
    }

    /// Returns true when the property was not already present.
    pub fn insert(&mut self, property: impl Into<String>) -> bool {
        self.properties.insert(property.into())
    }

    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            properties: self.properties.union(&other.properties).cloned().collect(),
        }
    }

    /// Whether every property of the type is in this group.
    #[must_use]
    pub fn covers(&self, record_type: &RecordType) -> bool {
        record_type
            .properties()
            .iter()
            .all(|property| self.contains(property.name()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

///
/// FetchState
///
/// Partial-materialization state of one record.
///
/// Full        → every property is loaded.
/// Partial     → only the group's properties are loaded.
/// Refreshing  → a reload for the group's complement is in flight.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum FetchState {
    #[default]
    Full,
    Partial(FetchGroup),
    Refreshing(FetchGroup),
}

impl FetchState {
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }

    #[must_use]
    pub const fn is_partial(&self) -> bool {
        matches!(self, Self::Partial(_))
    }

    #[must_use]
    pub const fn group(&self) -> Option<&FetchGroup> {
        match self {
            Self::Full => None,
            Self::Partial(group) | Self::Refreshing(group) => Some(group),
        }
    }

    /// Whether a read of `property` can be served without a reload.
    #[must_use]
    pub fn is_loaded(&self, property: &str) -> bool {
        match self {
            Self::Partial(group) => group.contains(property),
            // a reload in flight serves current slots rather than re-entering
            Self::Full | Self::Refreshing(_) => true,
        }
    }
}

///
/// RecordSnapshot
///
/// Raw slot image of one record, used to copy reloaded state into an
/// existing record without replacing its identity.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordSnapshot {
    pub(crate) record_type: String,
    pub(crate) slots: Vec<Option<Value>>,
    pub(crate) loaded: Option<FetchGroup>,
}

impl RecordSnapshot {
    #[must_use]
    pub fn record_type(&self) -> &str {
        &self.record_type
    }

    /// Raw slot at `position`; `None` when the slot was never written.
    #[must_use]
    pub fn slot(&self, position: usize) -> Option<&Value> {
        self.slots.get(position).and_then(Option::as_ref)
    }

    /// Loaded properties; `None` means every property.
    #[must_use]
    pub const fn loaded(&self) -> Option<&FetchGroup> {
        self.loaded.as_ref()
    }
}
