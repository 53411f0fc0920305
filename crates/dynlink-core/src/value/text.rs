use crate::{
    types::{Float64, Timestamp, Ulid},
    value::Value,
};
use dynlink_primitives::ScalarKind;
use thiserror::Error as ThisError;

///
/// ConversionError
///
/// Canonical text could not be converted into the requested scalar kind.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ConversionError {
    #[error("'{input}' is not a valid {kind} value")]
    Invalid { kind: ScalarKind, input: String },

    #[error("{kind} values have no canonical text form")]
    Unsupported { kind: ScalarKind },
}

pub(super) fn canonical_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(v) => Some(v.to_string()),
        Value::Float64(v) => Some(v.to_string()),
        Value::Int(v) => Some(v.to_string()),
        Value::Text(v) => Some(v.clone()),
        Value::Timestamp(v) => Some(v.to_string()),
        Value::Uint(v) => Some(v.to_string()),
        Value::Ulid(v) => Some(v.to_string()),
        Value::Blob(_) | Value::List(_) | Value::Map(_) | Value::Null | Value::Ref(_) => None,
    }
}

pub(super) fn parse_canonical(kind: ScalarKind, input: &str) -> Result<Value, ConversionError> {
    let invalid = || ConversionError::Invalid {
        kind,
        input: input.to_string(),
    };

    match kind {
        ScalarKind::Blob => Err(ConversionError::Unsupported { kind }),
        ScalarKind::Bool => input.parse::<bool>().map(Value::Bool).map_err(|_| invalid()),
        ScalarKind::Float64 => input
            .parse::<Float64>()
            .map(Value::Float64)
            .map_err(|_| invalid()),
        ScalarKind::Int => input.parse::<i64>().map(Value::Int).map_err(|_| invalid()),
        ScalarKind::Text => Ok(Value::Text(input.to_string())),
        ScalarKind::Timestamp => input
            .parse::<Timestamp>()
            .map(Value::Timestamp)
            .map_err(|_| invalid()),
        ScalarKind::Uint => input.parse::<u64>().map(Value::Uint).map_err(|_| invalid()),
        ScalarKind::Ulid => Ulid::from_string(input)
            .map(Value::Ulid)
            .map_err(|_| invalid()),
    }
}
