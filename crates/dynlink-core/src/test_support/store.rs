use crate::{
    key::{Key, ScalarConverter},
    model::Schema,
    record::{DynamicRecord, FetchGroup},
    store::{RecordStore, StoreError},
    value::Value,
};
use parking_lot::Mutex;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

type RowKey = (String, Key);

///
/// MemoryStore
///
/// In-memory `RecordStore` for tests.
///
/// - `identity`: records resident in the session (cache-only lookups).
/// - `rows`: backing storage, materialized into fresh records on load.
/// - `timeout`: when set, every load fails with `StoreError::Timeout`.
/// - `serve_resident`: when set, loads hand back the resident instance.
///

pub struct MemoryStore {
    schema: Arc<Schema>,
    identity: Mutex<HashMap<RowKey, DynamicRecord>>,
    rows: Mutex<HashMap<RowKey, Vec<(String, Value)>>>,
    timeout: AtomicBool,
    serve_resident: AtomicBool,
    loads: AtomicUsize,
}

impl MemoryStore {
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            identity: Mutex::new(HashMap::new()),
            rows: Mutex::new(HashMap::new()),
            timeout: AtomicBool::new(false),
            serve_resident: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    /// Store a backing row; properties include the key properties.
    pub fn insert_row(&self, record_type: &str, key: Key, properties: Vec<(&str, Value)>) {
        let properties = properties
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        self.rows
            .lock()
            .insert((record_type.to_string(), key), properties);
    }

    pub fn delete_row(&self, record_type: &str, key: &Key) {
        self.rows.lock().remove(&(record_type.to_string(), key.clone()));
    }

    /// Make a record resident, as if the session had loaded it.
    pub fn remember(&self, record: &DynamicRecord) {
        let key = record.primary_key().expect("resident record key");
        self.identity
            .lock()
            .insert((record.record_type().name().to_string(), key), record.clone());
    }

    pub fn set_timeout(&self, timeout: bool) {
        self.timeout.store(timeout, Ordering::SeqCst);
    }

    pub fn set_serve_resident(&self, serve_resident: bool) {
        self.serve_resident.store(serve_resident, Ordering::SeqCst);
    }

    /// Number of `find_by_key` calls so far.
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn resident_count(&self) -> usize {
        self.identity.lock().len()
    }
}

impl ScalarConverter for MemoryStore {}

impl RecordStore for MemoryStore {
    fn find_by_key_cache_only(&self, record_type: &str, key: &Key) -> Option<DynamicRecord> {
        self.identity
            .lock()
            .get(&(record_type.to_string(), key.clone()))
            .cloned()
    }

    fn find_by_key(
        &self,
        record_type: &str,
        key: &Key,
        fetch_group: Option<&FetchGroup>,
    ) -> Result<Option<DynamicRecord>, StoreError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.timeout.load(Ordering::SeqCst) {
            return Err(StoreError::Timeout {
                record_type: record_type.to_string(),
            });
        }
        if self.serve_resident.load(Ordering::SeqCst)
            && let Some(resident) = self.find_by_key_cache_only(record_type, key)
        {
            return Ok(Some(resident));
        }

        let Some(row) = self
            .rows
            .lock()
            .get(&(record_type.to_string(), key.clone()))
            .cloned()
        else {
            return Ok(None);
        };
        let Some(rt) = self.schema.record_type(record_type) else {
            return Ok(None);
        };

        let record = DynamicRecord::new(Arc::clone(rt));
        for (name, value) in row {
            let loaded = fetch_group.is_none_or(|group| {
                group.contains(&name) || rt.property(&name).is_ok_and(|p| p.is_primary_key())
            });
            if loaded {
                record
                    .set(&name, value)
                    .map_err(|err| StoreError::Backend(err.to_string()))?;
            }
        }
        if let Some(group) = fetch_group {
            record.set_fetch_group(Some(group.union(&FetchGroup::primary_key(rt))));
        }

        Ok(Some(record))
    }

    fn attach(&self, record: DynamicRecord) -> DynamicRecord {
        let Ok(key) = record.primary_key() else {
            return record;
        };
        let mut identity = self.identity.lock();

        identity
            .entry((record.record_type().name().to_string(), key))
            .or_insert(record)
            .clone()
    }
}
