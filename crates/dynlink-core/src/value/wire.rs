use crate::{
    record::DynamicRecord,
    types::{Float64, Timestamp},
    value::Value,
};
use serde::{Deserialize, Serialize};

///
/// WireValue
///
/// Serde mirror of `Value` used by opaque byte-level serialization.
/// Nested references carry only the target type name and key values,
/// so cyclic record graphs serialize to finite output.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum WireValue {
    Blob(#[serde(with = "serde_bytes")] Vec<u8>),
    Bool(bool),
    Float64(Float64),
    Int(i64),
    List(Vec<Self>),
    Map(Vec<(Self, Self)>),
    Null,
    Record(WireRecord),
    Ref { record_type: String, key: Vec<Self> },
    Text(String),
    Timestamp(Timestamp),
    Uint(u64),
    /// Raw 128-bit ULID payload.
    Ulid(u128),
}

///
/// WireRecord
///
/// One record image: type name plus its set properties in declaration order.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct WireRecord {
    pub record_type: String,
    pub properties: Vec<(String, WireValue)>,
}

impl WireValue {
    /// Project a runtime value into its wire mirror.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Blob(v) => Self::Blob(v.clone()),
            Value::Bool(v) => Self::Bool(*v),
            Value::Float64(v) => Self::Float64(*v),
            Value::Int(v) => Self::Int(*v),
            Value::List(items) => Self::List(items.iter().map(Self::from_value).collect()),
            Value::Map(entries) => Self::Map(
                entries
                    .iter()
                    .map(|(k, v)| (Self::from_value(k), Self::from_value(v)))
                    .collect(),
            ),
            Value::Null => Self::Null,
            Value::Ref(record) => Self::reference(record),
            Value::Text(v) => Self::Text(v.clone()),
            Value::Timestamp(v) => Self::Timestamp(*v),
            Value::Uint(v) => Self::Uint(*v),
            Value::Ulid(v) => Self::Ulid(v.0),
        }
    }

    /// Key-only reference image of a record.
    ///
    /// Unset key properties are carried as `Null`.
    #[must_use]
    pub fn reference(record: &DynamicRecord) -> Self {
        let record_type = record.record_type();
        let key = record_type
            .canonical_key_properties()
            .iter()
            .map(|property| {
                record
                    .peek(property.name())
                    .map_or(Self::Null, |value| Self::from_value(&value))
            })
            .collect();

        Self::Ref {
            record_type: record_type.name().to_string(),
            key,
        }
    }
}

impl WireRecord {
    /// Capture the set properties of a record without triggering lazy loads.
    #[must_use]
    pub fn from_record(record: &DynamicRecord) -> Self {
        let record_type = record.record_type();
        let properties = record_type
            .properties()
            .iter()
            .filter_map(|property| {
                let value = record.peek(property.name())?;
                if value.is_null() {
                    return None;
                }
                Some((property.name().to_string(), WireValue::from_value(&value)))
            })
            .collect();

        Self {
            record_type: record_type.name().to_string(),
            properties,
        }
    }
}
