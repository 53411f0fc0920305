//! Runtime records.
//!
//! A `DynamicRecord` is a shared handle to one positional slot array typed
//! by a `RecordType`. Cloning the handle never copies the record: every
//! clone observes the same slots, and equality is instance identity.

pub mod fetch;

#[cfg(test)]
mod tests;

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    identity::IdentityKey,
    key::Key,
    model::{PropertyDescriptor, PropertyKind, RecordType, UnknownPropertyError, ValueType},
    obs::sink::{self, MetricsEvent, RefreshOutcome},
    store::{RecordStore, StoreError},
    value::Value,
};
use parking_lot::RwLock;
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
};
use thiserror::Error as ThisError;

// re-exports
pub use fetch::{FetchGroup, FetchState, RecordSnapshot};

///
/// RecordError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum RecordError {
    #[error(transparent)]
    UnknownProperty(#[from] UnknownPropertyError),

    #[error("property '{record_type}.{property}' is {actual}, not {expected}")]
    WrongPropertyKind {
        record_type: String,
        property: String,
        expected: PropertyKind,
        actual: PropertyKind,
    },

    #[error("property '{record_type}.{property}' expects {expected}, found {found}")]
    ValueTypeMismatch {
        record_type: String,
        property: String,
        expected: String,
        found: &'static str,
    },

    #[error("primary key property '{record_type}.{property}' is unset")]
    PrimaryKeyUnset {
        record_type: String,
        property: String,
    },

    #[error("key for '{record_type}' has {found} value(s), expected {expected}")]
    KeyArity {
        record_type: String,
        expected: usize,
        found: usize,
    },

    #[error("record '{record_type}' {key} no longer exists")]
    RecordGone { record_type: String, key: String },

    #[error("refresh of record '{record_type}' {key} timed out")]
    Timeout { record_type: String, key: String },

    #[error("record '{record_type}' is not attached to a live session")]
    Detached { record_type: String },

    #[error("refresh of record '{record_type}' failed: {source}")]
    Store {
        record_type: String,
        source: StoreError,
    },

    #[error("snapshot of '{found}' cannot be applied to a '{expected}' record")]
    SnapshotMismatch { expected: String, found: String },

    #[error("reload of record '{record_type}' did not load '{property}'")]
    NotReloaded {
        record_type: String,
        property: String,
    },
}

impl RecordError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::UnknownProperty(_)
            | Self::WrongPropertyKind { .. }
            | Self::ValueTypeMismatch { .. }
            | Self::PrimaryKeyUnset { .. }
            | Self::KeyArity { .. } => ErrorClass::InvalidInput,
            Self::RecordGone { .. } => ErrorClass::NotFound,
            Self::Timeout { .. } => ErrorClass::Unavailable,
            Self::Detached { .. } | Self::NotReloaded { .. } => ErrorClass::Internal,
            Self::Store { source, .. } => source.class(),
            Self::SnapshotMismatch { .. } => ErrorClass::InvariantViolation,
        }
    }
}

impl From<RecordError> for InternalError {
    fn from(err: RecordError) -> Self {
        Self::new(err.class(), ErrorOrigin::Record, err.to_string())
    }
}

///
/// DynamicRecord
///
/// Shared handle to one runtime record.
///
/// Slot lifecycle:
/// - `None`           → never written; reads return the empty sentinel.
/// - `Some(Null)`     → explicitly emptied (to-one unset).
/// - `Some(List|Map)` → to-many container, allocated on first read.
///

#[derive(Clone)]
pub struct DynamicRecord {
    inner: Arc<RecordInner>,
}

struct RecordInner {
    record_type: Arc<RecordType>,
    identity: Option<IdentityKey>,
    state: RwLock<RecordState>,
}

struct RecordState {
    slots: Vec<Option<Value>>,
    fetch: FetchState,
    session: Option<Weak<dyn RecordStore>>,
}

impl DynamicRecord {
    ///
    /// CONSTRUCTION
    ///

    /// Fresh record with every property unset.
    #[must_use]
    pub fn new(record_type: Arc<RecordType>) -> Self {
        Self::build(record_type, None, FetchState::Full)
    }

    /// Record materialized with only `group` loaded.
    #[must_use]
    pub fn partial(record_type: Arc<RecordType>, group: FetchGroup) -> Self {
        let fetch = if group.covers(&record_type) {
            FetchState::Full
        } else {
            FetchState::Partial(group)
        };

        Self::build(record_type, None, fetch)
    }

    /// Fresh record bound to an identity-cache entry.
    pub(crate) fn wrapper(record_type: Arc<RecordType>, identity: IdentityKey) -> Self {
        Self::build(record_type, Some(identity), FetchState::Full)
    }

    /// Minimal record holding only its primary key, loaded lazily from `session`.
    ///
    /// `key` values are in canonical order.
    pub fn placeholder(
        record_type: Arc<RecordType>,
        key: &Key,
        session: &Arc<dyn RecordStore>,
    ) -> Result<Self, RecordError> {
        let positions = record_type.canonical_key_positions();
        if positions.len() != key.len() {
            return Err(RecordError::KeyArity {
                record_type: record_type.name().to_string(),
                expected: positions.len(),
                found: key.len(),
            });
        }

        let group = FetchGroup::primary_key(&record_type);
        let record = Self::partial(Arc::clone(&record_type), group);
        for (&position, value) in positions.iter().zip(key.values()) {
            record.set_at_position(position, value.clone())?;
        }
        record.attach_session(session);

        tracing::trace!(record_type = record_type.name(), %key, "placeholder built");

        Ok(record)
    }

    fn build(
        record_type: Arc<RecordType>,
        identity: Option<IdentityKey>,
        fetch: FetchState,
    ) -> Self {
        let slots = vec![None; record_type.property_count()];

        Self {
            inner: Arc::new(RecordInner {
                record_type,
                identity,
                state: RwLock::new(RecordState {
                    slots,
                    fetch,
                    session: None,
                }),
            }),
        }
    }

    /// Bind this record to the store that refreshes it.
    pub fn attach_session(&self, session: &Arc<dyn RecordStore>) {
        self.inner.state.write().session = Some(Arc::downgrade(session));
    }

    /// Replace the fetch state; `None` marks every property as loaded.
    pub fn set_fetch_group(&self, group: Option<FetchGroup>) {
        let record_type = self.record_type();
        let fetch = match group {
            Some(group) if !group.covers(record_type) => FetchState::Partial(group),
            _ => FetchState::Full,
        };

        self.inner.state.write().fetch = fetch;
    }

    ///
    /// ACCESSORS
    ///

    #[must_use]
    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.inner.record_type
    }

    #[must_use]
    pub fn identity(&self) -> Option<IdentityKey> {
        self.inner.identity
    }

    /// Whether both handles point at the same record instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    #[must_use]
    pub fn fetch_state(&self) -> FetchState {
        self.inner.state.read().fetch.clone()
    }

    /// Whether a read of `name` would be served without a reload.
    pub fn is_loaded(&self, name: &str) -> Result<bool, RecordError> {
        self.record_type().property_index(name)?;

        Ok(self.inner.state.read().fetch.is_loaded(name))
    }

    ///
    /// READ
    ///

    pub fn get(&self, name: &str) -> Result<Value, RecordError> {
        let position = self.record_type().property_index(name)?;

        self.get_at_position(position)
    }

    /// Read a slot, reloading first if the property is outside the fetch group.
    ///
    /// While a reload is in flight, reads are served from the current slots.
    ///
    /// Unset scalar and to-one slots read as `Value::Null`; unset to-many
    /// slots are allocated as empty containers and stored.
    pub fn get_at_position(&self, position: usize) -> Result<Value, RecordError> {
        let property = self.record_type().property_at(position)?;
        self.ensure_loaded(property)?;

        if let Some(value) = &self.inner.state.read().slots[position] {
            return Ok(value.clone());
        }

        match property.kind() {
            PropertyKind::Scalar | PropertyKind::ToOne => Ok(Value::Null),
            kind => {
                let mut state = self.inner.state.write();
                let slot = state.slots[position].get_or_insert_with(|| empty_container(kind));

                Ok(slot.clone())
            }
        }
    }

    /// Raw slot contents, without reloading or allocating containers.
    #[must_use]
    pub fn peek(&self, name: &str) -> Option<Value> {
        let position = self.record_type().property_index(name).ok()?;

        self.inner.state.read().slots[position].clone()
    }

    /// Whether the property holds a meaningful value.
    ///
    /// Empty containers and emptied to-one slots report false. Never reloads.
    pub fn is_set(&self, name: &str) -> Result<bool, RecordError> {
        let position = self.record_type().property_index(name)?;
        let state = self.inner.state.read();

        Ok(match &state.slots[position] {
            None | Some(Value::Null) => false,
            Some(Value::List(items)) => !items.is_empty(),
            Some(Value::Map(entries)) => !entries.is_empty(),
            Some(_) => true,
        })
    }

    /// Primary key in canonical order.
    ///
    /// Unset key properties are reported in declaration order.
    pub fn primary_key(&self) -> Result<Key, RecordError> {
        let record_type = self.record_type();
        let state = self.inner.state.read();

        for property in record_type.primary_key_properties() {
            let position = record_type.property_index(property.name())?;
            if matches!(state.slots[position], None | Some(Value::Null)) {
                return Err(RecordError::PrimaryKeyUnset {
                    record_type: record_type.name().to_string(),
                    property: property.name().to_string(),
                });
            }
        }

        let values = record_type
            .canonical_key_positions()
            .iter()
            .map(|&position| state.slots[position].clone().unwrap_or(Value::Null))
            .collect();

        Ok(Key::from_values(values))
    }

    ///
    /// WRITE
    ///

    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<&Self, RecordError> {
        let position = self.record_type().property_index(name)?;

        self.set_at_position(position, value)
    }

    /// Write a slot after checking the value against the declared type.
    ///
    /// On a partial record the property joins the fetch group.
    pub fn set_at_position(
        &self,
        position: usize,
        value: impl Into<Value>,
    ) -> Result<&Self, RecordError> {
        let value = value.into();
        let property = self.record_type().property_at(position)?;
        self.check_value(property, &value)?;

        let slot = match (property.kind(), value) {
            (PropertyKind::Scalar, Value::Null) => None,
            (kind @ PropertyKind::ToManyCollection, Value::Null)
            | (kind @ PropertyKind::ToManyMap, Value::Null) => Some(empty_container(kind)),
            (_, value) => Some(value),
        };

        let mut state = self.inner.state.write();
        state.slots[position] = slot;
        mark_loaded(&mut state.fetch, property.name());

        Ok(self)
    }

    /// Clear a property.
    ///
    /// Scalars return to never-written; to-one slots hold `Null`; to-many
    /// slots get a fresh empty container.
    pub fn unset(&self, name: &str) -> Result<(), RecordError> {
        let position = self.record_type().property_index(name)?;
        let property = self.record_type().property_at(position)?;

        let slot = match property.kind() {
            PropertyKind::Scalar => None,
            PropertyKind::ToOne => Some(Value::Null),
            kind => Some(empty_container(kind)),
        };

        let mut state = self.inner.state.write();
        state.slots[position] = slot;
        mark_loaded(&mut state.fetch, property.name());

        Ok(())
    }

    ///
    /// COLLECTIONS
    ///

    /// Append an item to a to-many collection.
    ///
    /// For a `mapped_by` collection the item's back-reference is then set to
    /// this record. The back-reference write happens after this record's
    /// lock is released.
    pub fn add(&self, name: &str, item: impl Into<Value>) -> Result<(), RecordError> {
        let item = item.into();
        let property = self.expect_kind(name, PropertyKind::ToManyCollection)?;
        self.check_element(property, &item)?;
        self.ensure_loaded(property)?;

        let position = self.record_type().property_index(name)?;
        {
            let mut state = self.inner.state.write();
            let slot = &mut state.slots[position];
            let mut items = take_list(slot);
            items.push(item.clone());
            *slot = Some(Value::List(items));
            mark_loaded(&mut state.fetch, name);
        }

        if let (Some(back_reference), Value::Ref(target)) = (property.mapped_by_property(), &item) {
            target.set(back_reference, self)?;
        }

        Ok(())
    }

    /// Remove the first matching item from a to-many collection.
    ///
    /// Returns whether an item was removed. For a `mapped_by` collection the
    /// removed item's back-reference is cleared if it still points here.
    pub fn remove(&self, name: &str, item: &Value) -> Result<bool, RecordError> {
        let property = self.expect_kind(name, PropertyKind::ToManyCollection)?;
        self.ensure_loaded(property)?;

        let position = self.record_type().property_index(name)?;
        let removed = {
            let mut state = self.inner.state.write();
            let slot = &mut state.slots[position];
            let mut items = take_list(slot);
            let removed = items
                .iter()
                .position(|candidate| candidate == item)
                .map(|index| items.remove(index));
            *slot = Some(Value::List(items));
            if removed.is_some() {
                mark_loaded(&mut state.fetch, name);
            }
            removed
        };

        let Some(removed) = removed else {
            return Ok(false);
        };

        if let (Some(back_reference), Value::Ref(target)) =
            (property.mapped_by_property(), &removed)
        {
            let points_here = target
                .peek(back_reference)
                .and_then(|value| value.as_record().map(|owner| owner.ptr_eq(self)))
                .unwrap_or(false);
            if points_here {
                target.unset(back_reference)?;
            }
        }

        Ok(true)
    }

    ///
    /// MAPS
    ///

    /// Value stored under `key` in a to-many map, or `Null` when absent.
    pub fn get_at(&self, name: &str, key: &Value) -> Result<Value, RecordError> {
        let property = self.expect_kind(name, PropertyKind::ToManyMap)?;
        self.ensure_loaded(property)?;

        let position = self.record_type().property_index(name)?;
        let state = self.inner.state.read();
        let value = match &state.slots[position] {
            Some(Value::Map(entries)) => entries
                .iter()
                .find(|(k, _)| k == key)
                .map_or(Value::Null, |(_, v)| v.clone()),
            _ => Value::Null,
        };

        Ok(value)
    }

    /// Insert or replace the entry for `key`, returning the previous value.
    ///
    /// New keys are appended; replaced keys keep their position.
    pub fn put_at(
        &self,
        name: &str,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, RecordError> {
        let (key, value) = (key.into(), value.into());
        let property = self.expect_kind(name, PropertyKind::ToManyMap)?;
        self.check_map_key(property, &key)?;
        self.check_element(property, &value)?;
        self.ensure_loaded(property)?;

        let position = self.record_type().property_index(name)?;
        let mut state = self.inner.state.write();
        let slot = &mut state.slots[position];
        let mut entries = take_map(slot);
        let previous = match entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                entries.push((key, value));
                None
            }
        };
        *slot = Some(Value::Map(entries));
        mark_loaded(&mut state.fetch, name);

        Ok(previous)
    }

    /// Remove the entry for `key`, returning its value.
    pub fn remove_at(&self, name: &str, key: &Value) -> Result<Option<Value>, RecordError> {
        let property = self.expect_kind(name, PropertyKind::ToManyMap)?;
        self.ensure_loaded(property)?;

        let position = self.record_type().property_index(name)?;
        let mut state = self.inner.state.write();
        let slot = &mut state.slots[position];
        let mut entries = take_map(slot);
        let removed = entries
            .iter()
            .position(|(k, _)| k == key)
            .map(|index| entries.remove(index).1);
        *slot = Some(Value::Map(entries));
        if removed.is_some() {
            mark_loaded(&mut state.fetch, name);
        }

        Ok(removed)
    }

    ///
    /// SNAPSHOTS
    ///

    #[must_use]
    pub fn snapshot(&self) -> RecordSnapshot {
        let state = self.inner.state.read();

        RecordSnapshot {
            record_type: self.record_type().name().to_string(),
            slots: state.slots.clone(),
            loaded: state.fetch.group().cloned(),
        }
    }

    /// Copy a snapshot into this record's slots in place.
    ///
    /// Properties this record already loaded are kept. The fetch state
    /// becomes the union of both loaded sets.
    pub fn apply_snapshot(&self, snapshot: &RecordSnapshot) -> Result<(), RecordError> {
        let record_type = self.record_type();
        if snapshot.record_type != record_type.name() {
            return Err(RecordError::SnapshotMismatch {
                expected: record_type.name().to_string(),
                found: snapshot.record_type.clone(),
            });
        }

        let mut state = self.inner.state.write();
        let local = state.fetch.group().cloned();

        for (position, property) in record_type.properties().iter().enumerate() {
            let name = property.name();
            let offered = snapshot.loaded.as_ref().is_none_or(|g| g.contains(name));
            let kept = local.as_ref().is_some_and(|g| g.contains(name));
            if offered && !kept {
                state.slots[position] = snapshot.slots.get(position).cloned().flatten();
            }
        }

        state.fetch = match (local, &snapshot.loaded) {
            (Some(local), Some(remote)) => {
                let merged = local.union(remote);
                if merged.covers(record_type) {
                    FetchState::Full
                } else {
                    FetchState::Partial(merged)
                }
            }
            _ => FetchState::Full,
        };

        Ok(())
    }

    ///
    /// REFRESH
    ///

    /// Reload a partial record from its session.
    ///
    /// On failure the record keeps its slots and returns to `Partial`.
    pub fn refresh(&self) -> Result<(), RecordError> {
        let record_type = self.record_type();
        let (group, session) = {
            let mut state = self.inner.state.write();
            let FetchState::Partial(group) = &state.fetch else {
                return Ok(());
            };
            let group = group.clone();
            state.fetch = FetchState::Refreshing(group.clone());
            (group, state.session.clone())
        };

        let result = self
            .load_snapshot(session.as_ref(), &group)
            .and_then(|snapshot| self.apply_snapshot(&snapshot));

        let outcome = match &result {
            Ok(()) => RefreshOutcome::Loaded,
            Err(RecordError::RecordGone { .. }) => RefreshOutcome::Gone,
            Err(RecordError::Timeout { .. }) => RefreshOutcome::TimedOut,
            Err(_) => RefreshOutcome::Failed,
        };
        sink::record(MetricsEvent::RecordRefresh {
            record_type: record_type.name(),
            outcome,
        });

        if let Err(err) = &result {
            tracing::debug!(record_type = record_type.name(), error = %err, "refresh failed");
            self.inner.state.write().fetch = FetchState::Partial(group);
        } else {
            tracing::debug!(record_type = record_type.name(), "refresh loaded");
        }

        result
    }

    fn load_snapshot(
        &self,
        session: Option<&Weak<dyn RecordStore>>,
        group: &FetchGroup,
    ) -> Result<RecordSnapshot, RecordError> {
        let record_type = self.record_type();
        let store = session
            .and_then(Weak::upgrade)
            .ok_or_else(|| RecordError::Detached {
                record_type: record_type.name().to_string(),
            })?;
        let key = self.primary_key()?;

        match store.find_by_key(record_type.name(), &key, None) {
            // the resident instance carries nothing new
            Ok(Some(fresh)) if fresh.ptr_eq(self) => Err(RecordError::NotReloaded {
                record_type: record_type.name().to_string(),
                property: record_type
                    .properties()
                    .iter()
                    .map(PropertyDescriptor::name)
                    .find(|name| !group.contains(name))
                    .unwrap_or_default()
                    .to_string(),
            }),
            Ok(Some(fresh)) => Ok(fresh.snapshot()),
            Ok(None) => Err(RecordError::RecordGone {
                record_type: record_type.name().to_string(),
                key: key.to_string(),
            }),
            Err(StoreError::Timeout { .. }) => Err(RecordError::Timeout {
                record_type: record_type.name().to_string(),
                key: key.to_string(),
            }),
            Err(source) => Err(RecordError::Store {
                record_type: record_type.name().to_string(),
                source,
            }),
        }
    }

    fn ensure_loaded(&self, property: &PropertyDescriptor) -> Result<(), RecordError> {
        let is_loaded = || self.inner.state.read().fetch.is_loaded(property.name());
        if is_loaded() {
            return Ok(());
        }

        self.refresh()?;
        if is_loaded() {
            Ok(())
        } else {
            Err(RecordError::NotReloaded {
                record_type: self.record_type().name().to_string(),
                property: property.name().to_string(),
            })
        }
    }

    ///
    /// TYPE CHECKS
    ///

    fn expect_kind(
        &self,
        name: &str,
        expected: PropertyKind,
    ) -> Result<&PropertyDescriptor, RecordError> {
        let property = self.record_type().property(name)?;
        if property.kind() != expected {
            return Err(RecordError::WrongPropertyKind {
                record_type: self.record_type().name().to_string(),
                property: name.to_string(),
                expected,
                actual: property.kind(),
            });
        }

        Ok(property)
    }

    fn check_value(&self, property: &PropertyDescriptor, value: &Value) -> Result<(), RecordError> {
        let value_type = property.value_type();
        let accepted = match (property.kind(), value) {
            (_, Value::Null) => true,
            (PropertyKind::Scalar | PropertyKind::ToOne, value) => matches_type(value_type, value),
            (PropertyKind::ToManyCollection, Value::List(items)) => {
                items.iter().all(|item| matches_type(value_type, item))
            }
            (PropertyKind::ToManyMap, Value::Map(entries)) => {
                Value::validate_map_entries(entries).is_ok()
                    && entries.iter().all(|(_, v)| matches_type(value_type, v))
            }
            _ => false,
        };

        if accepted {
            Ok(())
        } else {
            Err(self.mismatch(property, value))
        }
    }

    fn check_element(&self, property: &PropertyDescriptor, item: &Value) -> Result<(), RecordError> {
        if matches_type(property.value_type(), item) {
            Ok(())
        } else {
            Err(self.mismatch(property, item))
        }
    }

    fn check_map_key(&self, property: &PropertyDescriptor, key: &Value) -> Result<(), RecordError> {
        if key.is_scalar() {
            return Ok(());
        }

        Err(RecordError::ValueTypeMismatch {
            record_type: self.record_type().name().to_string(),
            property: property.name().to_string(),
            expected: "scalar map key".to_string(),
            found: key.kind_label(),
        })
    }

    fn mismatch(&self, property: &PropertyDescriptor, value: &Value) -> RecordError {
        let expected = match property.kind() {
            PropertyKind::Scalar | PropertyKind::ToOne => property.value_type().to_string(),
            PropertyKind::ToManyCollection => format!("list<{}>", property.value_type()),
            PropertyKind::ToManyMap => format!("map<{}>", property.value_type()),
        };

        RecordError::ValueTypeMismatch {
            record_type: self.record_type().name().to_string(),
            property: property.name().to_string(),
            expected,
            found: value.kind_label(),
        }
    }
}

impl fmt::Debug for DynamicRecord {
    // Never locks: Debug may run while the record's own lock is held.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicRecord")
            .field("record_type", &self.record_type().name())
            .field("instance", &Arc::as_ptr(&self.inner))
            .finish()
    }
}

impl Eq for DynamicRecord {}

impl PartialEq for DynamicRecord {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Hash for DynamicRecord {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.inner).hash(state);
    }
}

fn matches_type(value_type: &ValueType, value: &Value) -> bool {
    match value_type {
        ValueType::Scalar(kind) => value.scalar_kind() == Some(*kind),
        ValueType::Record(target) => value
            .as_record()
            .is_some_and(|record| record.record_type().name() == target),
    }
}

const fn empty_container(kind: PropertyKind) -> Value {
    match kind {
        PropertyKind::ToManyMap => Value::Map(Vec::new()),
        _ => Value::List(Vec::new()),
    }
}

fn mark_loaded(fetch: &mut FetchState, property: &str) {
    if let FetchState::Partial(group) | FetchState::Refreshing(group) = fetch {
        group.insert(property);
    }
}

fn take_list(slot: &mut Option<Value>) -> Vec<Value> {
    match slot.take() {
        Some(Value::List(items)) => items,
        _ => Vec::new(),
    }
}

fn take_map(slot: &mut Option<Value>) -> Vec<(Value, Value)> {
    match slot.take() {
        Some(Value::Map(entries)) => entries,
        _ => Vec::new(),
    }
}
