use crate::{
    error::{ErrorOrigin, InternalError},
    identity::IdentityWrapperCache,
    key::Key,
    link::{LinkConfig, ResourceLinkCodec},
    model::{RecordType, Schema},
    record::{DynamicRecord, FetchGroup},
    store::RecordStore,
    stream::ResultStreamer,
};
use std::sync::Arc;

///
/// SessionContext
///
/// Everything one session shares: the validated schema, the store that
/// owns the identity map, the link codec, and the wrapper cache.
///

pub struct SessionContext {
    schema: Arc<Schema>,
    store: Arc<dyn RecordStore>,
    links: ResourceLinkCodec,
    wrappers: IdentityWrapperCache,
}

impl SessionContext {
    /// Validate the schema and assemble a session.
    pub fn new(
        schema: Arc<Schema>,
        store: Arc<dyn RecordStore>,
        config: LinkConfig,
    ) -> Result<Self, InternalError> {
        schema.validate()?;
        let links = ResourceLinkCodec::new(config, Arc::clone(&schema), Arc::clone(&store));

        Ok(Self {
            schema,
            store,
            links,
            wrappers: IdentityWrapperCache::new(),
        })
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    #[must_use]
    pub const fn links(&self) -> &ResourceLinkCodec {
        &self.links
    }

    #[must_use]
    pub const fn wrappers(&self) -> &IdentityWrapperCache {
        &self.wrappers
    }

    pub fn record_type(&self, name: &str) -> Result<Arc<RecordType>, InternalError> {
        self.schema.record_type(name).cloned().ok_or_else(|| {
            InternalError::invalid_input(
                ErrorOrigin::Model,
                format!("unknown record type '{name}'"),
            )
        })
    }

    /// Fresh record of a named type, bound to this session.
    pub fn new_record(&self, record_type: &str) -> Result<DynamicRecord, InternalError> {
        let record = DynamicRecord::new(self.record_type(record_type)?);
        record.attach_session(&self.store);

        Ok(record)
    }

    /// Resident record for a key, loading it when the identity map misses.
    pub fn find(
        &self,
        record_type: &str,
        key: &Key,
        fetch_group: Option<&FetchGroup>,
    ) -> Result<Option<DynamicRecord>, InternalError> {
        let record_type = self.record_type(record_type)?;
        if let Some(resident) = self.store.find_by_key_cache_only(record_type.name(), key) {
            return Ok(Some(resident));
        }

        let Some(loaded) = self.store.find_by_key(record_type.name(), key, fetch_group)? else {
            return Ok(None);
        };
        loaded.attach_session(&self.store);

        Ok(Some(self.store.attach(loaded)))
    }

    /// Streamer carrying the bundled encoders, rendering references as links.
    #[must_use]
    pub fn streamer(&self) -> ResultStreamer<'_> {
        ResultStreamer::structural(Some(&self.links))
    }
}
