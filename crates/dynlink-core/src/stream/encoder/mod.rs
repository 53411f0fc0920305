mod json;
mod xml;

use crate::{
    link::{LinkError, ResourceLinkCodec},
    record::{DynamicRecord, RecordError},
    stream::{Format, StreamError},
    value::Value,
};
use std::io::Write;

// re-exports
pub use json::JsonEncoder;
pub use xml::{XML_PROLOG, XmlEncoder};

///
/// EncodeMode
///
/// Document  → standalone output (XML writes its prolog).
/// Fragment  → one item inside an enclosing sequence.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EncodeMode {
    Document,
    Fragment,
}

///
/// StructuralEncoder
///
/// Writes one record or value in a structural format.
/// Encoders never follow references: a referenced record is written as
/// its link.
///

pub trait StructuralEncoder {
    fn format(&self) -> Format;

    fn encode_record(
        &self,
        record: &DynamicRecord,
        mode: EncodeMode,
        out: &mut dyn Write,
    ) -> Result<(), StreamError>;

    fn encode_value(
        &self,
        value: &Value,
        mode: EncodeMode,
        out: &mut dyn Write,
    ) -> Result<(), StreamError>;
}

// Text written for a reference; `None` means omit it.
//
// Only references to types without identity are omitted. An unset key is
// `LinkError::Unresolvable` with or without a link codec.
fn reference_text(
    links: Option<&ResourceLinkCodec>,
    record: &DynamicRecord,
) -> Result<Option<String>, StreamError> {
    if !record.record_type().is_identified() {
        return Ok(None);
    }

    let text = match links {
        Some(links) => links.encode(record)?,
        None => match record.primary_key() {
            Ok(key) => key.to_string(),
            Err(RecordError::PrimaryKeyUnset {
                record_type,
                property,
            }) => {
                return Err(LinkError::Unresolvable {
                    record_type,
                    property,
                }
                .into());
            }
            Err(err) => return Err(LinkError::from(err).into()),
        },
    };

    Ok(Some(text))
}

// Loaded, meaningful properties in declaration order. Never triggers a reload.
fn written_properties(record: &DynamicRecord) -> Vec<(&str, Value)> {
    record
        .record_type()
        .properties()
        .iter()
        .filter_map(|property| {
            let value = record.peek(property.name())?;
            let meaningful = match &value {
                Value::Null => false,
                Value::List(items) => !items.is_empty(),
                Value::Map(entries) => !entries.is_empty(),
                _ => true,
            };
            meaningful.then(|| (property.name(), value))
        })
        .collect()
}
