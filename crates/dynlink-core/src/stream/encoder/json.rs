use crate::{
    link::ResourceLinkCodec,
    record::DynamicRecord,
    stream::{
        Format, StreamError,
        encoder::{EncodeMode, StructuralEncoder, reference_text, written_properties},
    },
    value::Value,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::Write;

///
/// JsonEncoder
///
/// Records become objects of their set properties in declaration order.
/// Blobs are base64 strings, timestamps are epoch milliseconds, ULIDs
/// are strings, and references are link strings.
///

#[derive(Clone, Copy, Default)]
pub struct JsonEncoder<'a> {
    links: Option<&'a ResourceLinkCodec>,
}

impl<'a> JsonEncoder<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self { links: None }
    }

    #[must_use]
    pub const fn with_links(links: &'a ResourceLinkCodec) -> Self {
        Self { links: Some(links) }
    }

    fn write_record(&self, record: &DynamicRecord, out: &mut dyn Write) -> Result<(), StreamError> {
        out.write_all(b"{")?;
        let mut first = true;
        for (name, value) in written_properties(record) {
            if let Value::Ref(target) = &value {
                let Some(link) = reference_text(self.links, target)? else {
                    continue;
                };
                write_separator(&mut first, out)?;
                write_key(name, out)?;
                serde_json::to_writer(&mut *out, &link)?;
                continue;
            }

            write_separator(&mut first, out)?;
            write_key(name, out)?;
            self.write_value(&value, out)?;
        }
        out.write_all(b"}")?;

        Ok(())
    }

    fn write_value(&self, value: &Value, out: &mut dyn Write) -> Result<(), StreamError> {
        match value {
            Value::Blob(bytes) => serde_json::to_writer(&mut *out, &STANDARD.encode(bytes))?,
            Value::Bool(v) => serde_json::to_writer(&mut *out, v)?,
            Value::Float64(v) => serde_json::to_writer(&mut *out, &v.get())?,
            Value::Int(v) => serde_json::to_writer(&mut *out, v)?,
            Value::Text(v) => serde_json::to_writer(&mut *out, v)?,
            Value::Timestamp(v) => serde_json::to_writer(&mut *out, &v.as_millis())?,
            Value::Uint(v) => serde_json::to_writer(&mut *out, v)?,
            Value::Ulid(v) => serde_json::to_writer(&mut *out, &v.to_string())?,
            Value::Null => out.write_all(b"null")?,
            Value::Ref(target) => match reference_text(self.links, target)? {
                Some(link) => serde_json::to_writer(&mut *out, &link)?,
                None => out.write_all(b"null")?,
            },
            Value::List(items) => {
                out.write_all(b"[")?;
                let mut first = true;
                for item in items {
                    if let Value::Ref(target) = item {
                        let Some(link) = reference_text(self.links, target)? else {
                            continue;
                        };
                        write_separator(&mut first, out)?;
                        serde_json::to_writer(&mut *out, &link)?;
                        continue;
                    }
                    write_separator(&mut first, out)?;
                    self.write_value(item, out)?;
                }
                out.write_all(b"]")?;
            }
            Value::Map(entries) => {
                out.write_all(b"{")?;
                let mut first = true;
                for (key, entry) in entries {
                    let key = match key {
                        Value::Blob(bytes) => STANDARD.encode(bytes),
                        other => other.canonical_text().unwrap_or_default(),
                    };
                    write_separator(&mut first, out)?;
                    write_key(&key, out)?;
                    self.write_value(entry, out)?;
                }
                out.write_all(b"}")?;
            }
        }

        Ok(())
    }
}

impl StructuralEncoder for JsonEncoder<'_> {
    fn format(&self) -> Format {
        Format::Json
    }

    fn encode_record(
        &self,
        record: &DynamicRecord,
        _mode: EncodeMode,
        out: &mut dyn Write,
    ) -> Result<(), StreamError> {
        self.write_record(record, out)
    }

    fn encode_value(
        &self,
        value: &Value,
        _mode: EncodeMode,
        out: &mut dyn Write,
    ) -> Result<(), StreamError> {
        match value {
            Value::Ref(record) => self.write_record(record, out),
            other => self.write_value(other, out),
        }
    }
}

fn write_separator(first: &mut bool, out: &mut dyn Write) -> Result<(), StreamError> {
    if !*first {
        out.write_all(b",")?;
    }
    *first = false;

    Ok(())
}

fn write_key(key: &str, out: &mut dyn Write) -> Result<(), StreamError> {
    serde_json::to_writer(&mut *out, key)?;
    out.write_all(b":")?;

    Ok(())
}
