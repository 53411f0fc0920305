//! Resource links.
//!
//! A link names one record as
//! `{base_uri}/{context_name}/entity/{TypeName}/{key}` where `key` is the
//! canonical key text, composite values joined with `+`. Every path
//! segment is percent-encoded, so key text may contain any character.


use crate::{
    error::{ErrorOrigin, InternalError},
    identity::IdentityWrapperCache,
    key::{KEY_DELIMITER, Key, KeyCodec, KeyError},
    model::{RecordType, Schema},
    obs::sink::{self, LinkResolution, MetricsEvent},
    record::{DynamicRecord, RecordError},
    store::RecordStore,
};
use std::{any::Any, sync::Arc};
use thiserror::Error as ThisError;
use url::Url;

///
/// CONSTANTS
///

/// Path segment between the context name and the record type name.
pub const ENTITY_SEGMENT: &str = "entity";

///
/// LinkError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum LinkError {
    #[error("cannot link '{record_type}': primary key property '{property}' is unset")]
    Unresolvable {
        record_type: String,
        property: String,
    },

    #[error("malformed link '{uri}': {reason}")]
    Malformed { uri: String, reason: String },

    #[error("link names unknown record type '{0}'")]
    UnknownRecordType(String),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl From<LinkError> for InternalError {
    fn from(err: LinkError) -> Self {
        match err {
            LinkError::Unresolvable { .. } => Self::internal(ErrorOrigin::Link, err.to_string()),
            LinkError::Malformed { .. } | LinkError::UnknownRecordType(_) => {
                Self::invalid_input(ErrorOrigin::Link, err.to_string())
            }
            LinkError::Key(err) => err.into(),
            LinkError::Record(err) => err.into(),
        }
    }
}

///
/// LinkConfig
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LinkConfig {
    pub base_uri: String,
    pub context_name: String,
}

impl LinkConfig {
    pub fn new(base_uri: impl Into<String>, context_name: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            context_name: context_name.into(),
        }
    }

    /// Link prefix up to and including the entity segment.
    #[must_use]
    pub fn entity_prefix(&self) -> String {
        format!(
            "{}/{}/{ENTITY_SEGMENT}",
            self.base_uri.trim_end_matches('/'),
            encode_segment(&self.context_name),
        )
    }
}

///
/// ResourceLinkCodec
///
/// Bidirectional record ↔ link mapping for one session.
/// Decoding never performs I/O: unknown keys become placeholders.
///

pub struct ResourceLinkCodec {
    config: LinkConfig,
    schema: Arc<Schema>,
    store: Arc<dyn RecordStore>,
}

impl ResourceLinkCodec {
    #[must_use]
    pub fn new(config: LinkConfig, schema: Arc<Schema>, store: Arc<dyn RecordStore>) -> Self {
        Self {
            config,
            schema,
            store,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LinkConfig {
        &self.config
    }

    ///
    /// ENCODE
    ///

    /// Link for a record; the empty string when its type has no identity.
    pub fn encode(&self, record: &DynamicRecord) -> Result<String, LinkError> {
        let record_type = record.record_type();
        if !record_type.is_identified() {
            return Ok(String::new());
        }

        let key = match record.primary_key() {
            Ok(key) => key,
            Err(RecordError::PrimaryKeyUnset {
                record_type,
                property,
            }) => {
                sink::record(MetricsEvent::LinkRejected {
                    record_type: Some(record_type.as_str()),
                });
                return Err(LinkError::Unresolvable {
                    record_type,
                    property,
                });
            }
            Err(err) => return Err(err.into()),
        };

        let link = self.link_for(record_type, &key)?;
        sink::record(MetricsEvent::LinkEncoded {
            record_type: record_type.name(),
        });

        Ok(link)
    }

    /// Link for an owner object through its identity wrapper.
    ///
    /// Owners without a wrapper encode to the empty string.
    pub fn encode_owned<O>(
        &self,
        cache: &IdentityWrapperCache,
        owner: &Arc<O>,
    ) -> Result<String, LinkError>
    where
        O: Any + Send + Sync,
    {
        match cache.lookup(owner) {
            Some(wrapper) => self.encode(&wrapper),
            None => Ok(String::new()),
        }
    }

    /// Link for a known type and canonical key.
    pub fn link_for(&self, record_type: &RecordType, key: &Key) -> Result<String, LinkError> {
        let tokens = KeyCodec::encode_tokens(key.values())?;
        let key_text = tokens
            .iter()
            .map(|token| encode_segment(token))
            .collect::<Vec<_>>()
            .join(&KEY_DELIMITER.to_string());

        Ok(format!(
            "{}/{}/{key_text}",
            self.config.entity_prefix(),
            encode_segment(record_type.name()),
        ))
    }

    ///
    /// DECODE
    ///

    /// Resolve a link to a record; `Ok(None)` for the empty link.
    ///
    /// A resident record is returned when the store's identity map has one;
    /// otherwise a key-only placeholder is built and attached.
    pub fn decode(&self, uri: &str) -> Result<Option<DynamicRecord>, LinkError> {
        if uri.is_empty() {
            return Ok(None);
        }

        let (record_type, key) = self.decode_key(uri)?;

        if let Some(resident) = self.store.find_by_key_cache_only(record_type.name(), &key) {
            sink::record(MetricsEvent::LinkDecoded {
                record_type: record_type.name(),
                resolution: LinkResolution::Resident,
            });
            return Ok(Some(resident));
        }

        let placeholder = DynamicRecord::placeholder(Arc::clone(&record_type), &key, &self.store)?;
        let record = self.store.attach(placeholder);
        sink::record(MetricsEvent::LinkDecoded {
            record_type: record_type.name(),
            resolution: LinkResolution::Placeholder,
        });

        Ok(Some(record))
    }

    /// Parse a link into its record type and typed key, without any lookup.
    pub fn decode_key(&self, uri: &str) -> Result<(Arc<RecordType>, Key), LinkError> {
        let result = self.parse(uri);
        if let Err(err) = &result {
            tracing::debug!(uri, error = %err, "link decode failed");
            let record_type = match err {
                LinkError::Key(KeyError::Malformed { record_type, .. })
                | LinkError::Key(KeyError::Conversion { record_type, .. }) => {
                    Some(record_type.as_str())
                }
                _ => None,
            };
            sink::record(MetricsEvent::LinkRejected { record_type });
        }

        result
    }

    fn parse(&self, uri: &str) -> Result<(Arc<RecordType>, Key), LinkError> {
        let malformed = |reason: &str| LinkError::Malformed {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        let path = link_path(uri).ok_or_else(|| malformed("link has no hierarchical path"))?;
        let segments: Vec<&str> = path.split('/').collect();
        let [.., context, marker, type_name, key_text] = segments.as_slice() else {
            return Err(malformed("expected '{context}/entity/{type}/{key}' at the end of the path"));
        };

        if *marker != ENTITY_SEGMENT {
            return Err(malformed("missing 'entity' segment"));
        }
        let context = decode_segment(context).ok_or_else(|| malformed("invalid percent-encoding"))?;
        if context != self.config.context_name {
            return Err(malformed(&format!(
                "context '{context}' does not match '{}'",
                self.config.context_name
            )));
        }

        let type_name =
            decode_segment(type_name).ok_or_else(|| malformed("invalid percent-encoding"))?;
        let record_type = self
            .schema
            .record_type(&type_name)
            .cloned()
            .ok_or(LinkError::UnknownRecordType(type_name))?;
        if !record_type.is_identified() {
            return Err(KeyError::NoPrimaryKey(record_type.name().to_string()).into());
        }

        // single keys take the whole segment; the delimiter only splits composites
        let raw_tokens: Vec<&str> = if record_type.canonical_key_positions().len() == 1 {
            vec![*key_text]
        } else {
            key_text.split(KEY_DELIMITER).collect()
        };
        let tokens = raw_tokens
            .into_iter()
            .map(decode_segment)
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| malformed("invalid percent-encoding"))?;

        let key = KeyCodec::decode_tokens(&record_type, key_text, &tokens, self.store.as_ref())?;

        Ok((record_type, key))
    }
}

// Path part of an absolute URI or a bare path; query and fragment dropped.
// Dot segments are kept as written, `Url::path` would collapse them.
fn link_path(uri: &str) -> Option<&str> {
    let raw = uri.trim().split(['?', '#']).next().unwrap_or_default();
    match Url::parse(raw) {
        Ok(url) if url.cannot_be_a_base() => None,
        Ok(url) => {
            let rest = raw.get(url.scheme().len() + 1..)?;
            match rest.strip_prefix("//") {
                Some(authority) => Some(authority.find('/').map_or("", |at| &authority[at..])),
                None => Some(rest),
            }
        }
        Err(_) => Some(raw),
    }
}

// Percent-encode one path segment; dot-only segments are escaped as well.
fn encode_segment(segment: &str) -> String {
    match segment {
        "." | ".." => segment.replace('.', "%2E"),
        _ => urlencoding::encode(segment).into_owned(),
    }
}

fn decode_segment(segment: &str) -> Option<String> {
    urlencoding::decode(segment).ok().map(|decoded| decoded.into_owned())
}
