//! Persistence collaborator boundary.
//!
//! The runtime never talks to storage directly. Records, links, and the
//! session reach their backing store through `RecordStore`, which also
//! owns the scalar conversion service used for key decoding.

use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    key::{Key, ScalarConverter},
    record::{DynamicRecord, FetchGroup},
};
use thiserror::Error as ThisError;

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    #[error("store lookup for '{record_type}' timed out")]
    Timeout { record_type: String },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store failure: {0}")]
    Backend(String),
}

impl StoreError {
    #[must_use]
    pub const fn class(&self) -> ErrorClass {
        match self {
            Self::Timeout { .. } | Self::Unavailable(_) => ErrorClass::Unavailable,
            Self::Backend(_) => ErrorClass::Internal,
        }
    }
}

impl From<StoreError> for InternalError {
    fn from(err: StoreError) -> Self {
        Self::new(err.class(), ErrorOrigin::Store, err.to_string())
    }
}

///
/// RecordStore
///
/// Session-scoped identity map plus loader.
///
/// Implementations guarantee that within one session at most one record
/// instance exists per (record type, key).
///

pub trait RecordStore: ScalarConverter + Send + Sync {
    /// Identity-map lookup only. Never performs I/O.
    fn find_by_key_cache_only(&self, record_type: &str, key: &Key) -> Option<DynamicRecord>;

    /// Materialize a record image from storage, honouring `fetch_group`.
    ///
    /// The returned instance need not be the resident one; refresh copies
    /// its state into the resident record. `Ok(None)` means the record no
    /// longer exists.
    fn find_by_key(
        &self,
        record_type: &str,
        key: &Key,
        fetch_group: Option<&FetchGroup>,
    ) -> Result<Option<DynamicRecord>, StoreError>;

    /// Register a freshly built placeholder in the identity map.
    ///
    /// Returns the instance that is now resident for its key, which may be
    /// an earlier one.
    fn attach(&self, record: DynamicRecord) -> DynamicRecord {
        record
    }
}
