//! Identity-stable wrappers for host-language owner objects.
//!
//! An owner is any `Arc<O>`. The cache maps each live owner to exactly one
//! `DynamicRecord` wrapper, so wrapping the same owner twice yields the same
//! record instance.

#[cfg(test)]
mod tests;

use crate::{
    model::RecordType,
    obs::sink::{self, MetricsEvent},
    record::DynamicRecord,
};
use derive_more::Display;
use parking_lot::Mutex;
use std::{
    any::Any,
    collections::HashMap,
    sync::{Arc, Weak},
};

///
/// IdentityKey
///
/// Address of an owner allocation. Stable while any handle to the
/// allocation (strong or weak) exists.
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{_0:#x}")]
pub struct IdentityKey(usize);

impl IdentityKey {
    #[must_use]
    pub fn of<O: ?Sized>(owner: &Arc<O>) -> Self {
        Self(Arc::as_ptr(owner).cast::<()>().addr())
    }
}

type ErasedOwner = Weak<dyn Any + Send + Sync>;

///
/// IdentityWrapperCache
///
/// Owner → wrapper map. Entries hold owners weakly, so the cache never
/// extends an owner's lifetime; dead entries are swept on insert and by
/// `purge`.
///

#[derive(Default)]
pub struct IdentityWrapperCache {
    entries: Mutex<HashMap<IdentityKey, (ErasedOwner, DynamicRecord)>>,
}

impl IdentityWrapperCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the owner's wrapper, creating and populating it on first sight.
    ///
    /// `populate` runs outside the cache lock. When two callers race on the
    /// same owner, the first published wrapper wins and is returned to both.
    pub fn wrap<O, F>(
        &self,
        owner: &Arc<O>,
        record_type: &Arc<RecordType>,
        populate: F,
    ) -> DynamicRecord
    where
        O: Any + Send + Sync,
        F: FnOnce(&Arc<O>, &DynamicRecord),
    {
        let key = IdentityKey::of(owner);
        if let Some(existing) = self.lookup(owner) {
            sink::record(MetricsEvent::WrapperResolved { created: false });
            return existing;
        }

        let wrapper = DynamicRecord::wrapper(Arc::clone(record_type), key);
        populate(owner, &wrapper);

        let mut entries = self.entries.lock();
        if let Some((weak, existing)) = entries.get(&key)
            && weak.strong_count() > 0
        {
            sink::record(MetricsEvent::WrapperResolved { created: false });
            return existing.clone();
        }

        entries.retain(|_, (weak, _)| weak.strong_count() > 0);
        let erased: Arc<dyn Any + Send + Sync> = owner.clone();
        entries.insert(key, (Arc::downgrade(&erased), wrapper.clone()));
        drop(entries);

        tracing::trace!(record_type = record_type.name(), owner = %key, "wrapper created");
        sink::record(MetricsEvent::WrapperResolved { created: true });

        wrapper
    }

    /// Existing wrapper for a live owner.
    #[must_use]
    pub fn lookup<O: ?Sized>(&self, owner: &Arc<O>) -> Option<DynamicRecord> {
        let key = IdentityKey::of(owner);
        let entries = self.entries.lock();

        entries
            .get(&key)
            .filter(|(weak, _)| weak.strong_count() > 0)
            .map(|(_, wrapper)| wrapper.clone())
    }

    /// Recover the owner behind a wrapper.
    ///
    /// Returns `None` for records that are not wrappers from this cache,
    /// for dead owners, and when the owner is not an `O`.
    #[must_use]
    pub fn unwrap<O: Any + Send + Sync>(&self, record: &DynamicRecord) -> Option<Arc<O>> {
        let key = record.identity()?;
        let owner = {
            let entries = self.entries.lock();
            let (weak, wrapper) = entries.get(&key)?;
            if !wrapper.ptr_eq(record) {
                return None;
            }
            weak.upgrade()?
        };

        owner.downcast::<O>().ok()
    }

    /// Drop entries whose owner is gone; returns how many were removed.
    pub fn purge(&self) -> usize {
        let mut entries = self.entries.lock();
        let before = entries.len();
        entries.retain(|_, (weak, _)| weak.strong_count() > 0);

        before - entries.len()
    }

    /// Number of entries, including dead ones not yet purged.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
