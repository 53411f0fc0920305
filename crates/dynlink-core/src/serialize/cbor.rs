use crate::serialize::SerializeError;
use serde::{Serialize, de::DeserializeOwned};

// CBOR body encoding behind the opaque header.

pub(super) fn to_body<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializeError> {
    serde_cbor::to_vec(value).map_err(|err| SerializeError::Serialize(err.to_string()))
}

pub(super) fn from_body<T: DeserializeOwned>(body: &[u8], limit: usize) -> Result<T, SerializeError> {
    if body.len() > limit {
        return Err(SerializeError::DeserializeSizeLimitExceeded {
            len: body.len(),
            max_bytes: limit,
        });
    }

    serde_cbor::from_slice(body).map_err(|err| SerializeError::Deserialize(err.to_string()))
}
