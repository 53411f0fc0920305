use crate::{config::Config, error::Error};
use dynlink_core::{
    error::InternalError,
    key::Key,
    link::LinkConfig,
    model::{RecordType, Schema},
    obs::{MetricsSink, with_metrics_sink},
    record::{DynamicRecord, FetchGroup},
    session::SessionContext,
    store::RecordStore,
    stream::{Accept, Format, Payload, ResultStreamer},
};
use std::{any::Any, io::Write, sync::Arc};

///
/// Session
///
/// Public facade over the core `SessionContext`.
/// Applies session policy (debug summaries, metrics routing) around every
/// operation and converts core errors into `dynlink::Error`.
///

pub struct Session {
    inner: SessionContext,
    debug: bool,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl Session {
    // ------------------------------------------------------------------
    // Session configuration
    // ------------------------------------------------------------------

    /// Build a session from loaded configuration.
    pub fn new(
        schema: Arc<Schema>,
        store: Arc<dyn RecordStore>,
        config: &Config,
    ) -> Result<Self, Error> {
        config.validate()?;
        let session = Self::with_link_config(schema, store, config.link_config())?;

        Ok(if config.session.debug {
            session.debug()
        } else {
            session
        })
    }

    /// Build a session from an explicit link configuration.
    pub fn with_link_config(
        schema: Arc<Schema>,
        store: Arc<dyn RecordStore>,
        links: LinkConfig,
    ) -> Result<Self, Error> {
        Ok(Self {
            inner: SessionContext::new(schema, store, links)?,
            debug: false,
            metrics: None,
        })
    }

    /// Enable debug summaries for operations executed in this session.
    #[must_use]
    pub const fn debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Route metrics events for this session's operations to `sink`.
    #[must_use]
    pub fn metrics_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.metrics = Some(sink);
        self
    }

    #[must_use]
    pub const fn context(&self) -> &SessionContext {
        &self.inner
    }

    // ------------------------------------------------------------------
    // Records
    // ------------------------------------------------------------------

    pub fn record_type(&self, name: &str) -> Result<Arc<RecordType>, Error> {
        Ok(self.inner.record_type(name)?)
    }

    pub fn new_record(&self, record_type: &str) -> Result<DynamicRecord, Error> {
        self.run("new_record", || self.inner.new_record(record_type))
    }

    /// Resident record for a key, loading it on an identity-map miss.
    pub fn find(
        &self,
        record_type: &str,
        key: &Key,
        fetch_group: Option<&FetchGroup>,
    ) -> Result<Option<DynamicRecord>, Error> {
        self.run("find", || self.inner.find(record_type, key, fetch_group))
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    pub fn encode_link(&self, record: &DynamicRecord) -> Result<String, Error> {
        self.run("encode_link", || Ok(self.inner.links().encode(record)?))
    }

    /// Resolve a link; `Ok(None)` for the empty link.
    pub fn decode_link(&self, uri: &str) -> Result<Option<DynamicRecord>, Error> {
        self.run("decode_link", || Ok(self.inner.links().decode(uri)?))
    }

    // ------------------------------------------------------------------
    // Identity wrappers
    // ------------------------------------------------------------------

    /// Wrapper record for an owner object, created on first sight.
    pub fn wrap<O, F>(
        &self,
        owner: &Arc<O>,
        record_type: &str,
        populate: F,
    ) -> Result<DynamicRecord, Error>
    where
        O: Any + Send + Sync,
        F: FnOnce(&Arc<O>, &DynamicRecord),
    {
        self.run("wrap", || {
            let record_type = self.inner.record_type(record_type)?;

            Ok(self.inner.wrappers().wrap(owner, &record_type, populate))
        })
    }

    #[must_use]
    pub fn unwrap<O: Any + Send + Sync>(&self, record: &DynamicRecord) -> Option<Arc<O>> {
        self.inner.wrappers().unwrap(record)
    }

    /// Link for an owner through its wrapper; empty when it has none.
    pub fn encode_owned_link<O>(&self, owner: &Arc<O>) -> Result<String, Error>
    where
        O: Any + Send + Sync,
    {
        self.run("encode_owned_link", || {
            Ok(self.inner.links().encode_owned(self.inner.wrappers(), owner)?)
        })
    }

    // ------------------------------------------------------------------
    // Streaming
    // ------------------------------------------------------------------

    /// Negotiate a response format from client candidates.
    #[must_use]
    pub fn choose_format(candidates: &[Accept]) -> Format {
        ResultStreamer::choose_format(candidates)
    }

    /// Stream a payload with the bundled encoders, references as links.
    pub fn stream(
        &self,
        format: Format,
        payload: Payload<'_>,
        out: &mut dyn Write,
    ) -> Result<u64, Error> {
        self.run("stream", || Ok(self.inner.streamer().stream(format, payload, out)?))
    }

    // ------------------------------------------------------------------
    // Policy
    // ------------------------------------------------------------------

    fn run<T>(
        &self,
        operation: &'static str,
        f: impl FnOnce() -> Result<T, InternalError>,
    ) -> Result<T, Error> {
        let result = match &self.metrics {
            Some(sink) => with_metrics_sink(Arc::clone(sink), f),
            None => f(),
        };

        if self.debug {
            match &result {
                Ok(_) => tracing::debug!(operation, "session operation ok"),
                Err(err) => tracing::debug!(
                    operation,
                    class = %err.class,
                    origin = %err.origin,
                    error = %err.message,
                    "session operation failed"
                ),
            }
        }

        result.map_err(Error::from)
    }
}
