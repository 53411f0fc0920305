mod cbor;

use crate::error::{ErrorOrigin, InternalError};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use thiserror::Error as ThisError;

/// Opaque byte-level serialization.
///
/// Opaque payloads are a fixed header followed by CBOR. The header is what
/// tells opaque output apart from structural (JSON / XML) output:
/// - JSON starts with `[`, `{`, `"`, a digit or a literal.
/// - XML starts with `<`.
/// - Opaque starts with `OPAQUE_MAGIC`.

///
/// CONSTANTS
///

pub const OPAQUE_MAGIC: &[u8; 4] = b"DLNK";
pub const OPAQUE_VERSION: u8 = 1;

/// Upper bound on opaque payloads accepted by `decode_opaque`.
pub const MAX_OPAQUE_BYTES: usize = 16 * 1024 * 1024;

///
/// SerializeError
///

#[derive(Debug, ThisError)]
pub enum SerializeError {
    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    #[error("deserialize size limit exceeded: {len} bytes (limit {max_bytes})")]
    DeserializeSizeLimitExceeded { len: usize, max_bytes: usize },

    #[error("payload is not opaque-encoded")]
    NotOpaque,

    #[error("unsupported opaque payload version {0}")]
    UnsupportedVersion(u8),
}

///
/// SerializeErrorKind
///
/// Stable error-kind taxonomy for serializer failures.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SerializeErrorKind {
    Serialize,
    Deserialize,
    DeserializeSizeLimitExceeded,
    NotOpaque,
    UnsupportedVersion,
}

impl SerializeErrorKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Serialize => "serialize",
            Self::Deserialize => "deserialize",
            Self::DeserializeSizeLimitExceeded => "deserialize_size_limit_exceeded",
            Self::NotOpaque => "not_opaque",
            Self::UnsupportedVersion => "unsupported_version",
        }
    }
}

impl fmt::Display for SerializeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SerializeError {
    /// Return a stable error kind independent of backend error-message text.
    #[must_use]
    pub const fn kind(&self) -> SerializeErrorKind {
        match self {
            Self::Serialize(_) => SerializeErrorKind::Serialize,
            Self::Deserialize(_) => SerializeErrorKind::Deserialize,
            Self::DeserializeSizeLimitExceeded { .. } => {
                SerializeErrorKind::DeserializeSizeLimitExceeded
            }
            Self::NotOpaque => SerializeErrorKind::NotOpaque,
            Self::UnsupportedVersion(_) => SerializeErrorKind::UnsupportedVersion,
        }
    }
}

impl From<SerializeError> for InternalError {
    fn from(err: SerializeError) -> Self {
        match err.kind() {
            SerializeErrorKind::Serialize => Self::internal(ErrorOrigin::Serialize, err.to_string()),
            _ => Self::invalid_input(ErrorOrigin::Serialize, err.to_string()),
        }
    }
}

/// Serialize a value into bare CBOR.
pub fn serialize<T>(ty: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    cbor::to_body(ty)
}

/// Deserialize bare CBOR produced by [`serialize`], with an explicit size limit.
pub fn deserialize_bounded<T>(bytes: &[u8], max_bytes: usize) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    cbor::from_body(bytes, max_bytes)
}

/// Serialize a value into a framed opaque payload.
pub fn encode_opaque<T>(ty: &T) -> Result<Vec<u8>, SerializeError>
where
    T: Serialize,
{
    let body = serialize(ty)?;
    let mut out = Vec::with_capacity(OPAQUE_MAGIC.len() + 1 + body.len());
    out.extend_from_slice(OPAQUE_MAGIC);
    out.push(OPAQUE_VERSION);
    out.extend_from_slice(&body);

    Ok(out)
}

/// Whether `bytes` start with the opaque header.
#[must_use]
pub fn is_opaque(bytes: &[u8]) -> bool {
    bytes.starts_with(OPAQUE_MAGIC)
}

/// Deserialize a framed payload produced by [`encode_opaque`].
pub fn decode_opaque<T>(bytes: &[u8]) -> Result<T, SerializeError>
where
    T: DeserializeOwned,
{
    let rest = bytes
        .strip_prefix(OPAQUE_MAGIC.as_slice())
        .ok_or(SerializeError::NotOpaque)?;
    let (&version, body) = rest.split_first().ok_or(SerializeError::NotOpaque)?;
    if version != OPAQUE_VERSION {
        return Err(SerializeError::UnsupportedVersion(version));
    }

    deserialize_bounded(body, MAX_OPAQUE_BYTES)
}

///
/// TESTS
///
