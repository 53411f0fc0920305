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
/// CONSTANTS
///

pub const XML_PROLOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

///
/// XmlEncoder
///
/// `<Type><property>text</property>...</Type>` per record.
/// Lists nest `<item>` elements; maps nest `<entry key="...">` elements.
///

#[derive(Clone, Copy, Default)]
pub struct XmlEncoder<'a> {
    links: Option<&'a ResourceLinkCodec>,
}

impl<'a> XmlEncoder<'a> {
    #[must_use]
    pub const fn new() -> Self {
        Self { links: None }
    }

    #[must_use]
    pub const fn with_links(links: &'a ResourceLinkCodec) -> Self {
        Self { links: Some(links) }
    }

    fn write_record(&self, record: &DynamicRecord, out: &mut dyn Write) -> Result<(), StreamError> {
        let tag = record.record_type().name();
        write!(out, "<{tag}>")?;
        for (name, value) in written_properties(record) {
            self.write_element(name, &value, out)?;
        }
        write!(out, "</{tag}>")?;

        Ok(())
    }

    fn write_element(&self, tag: &str, value: &Value, out: &mut dyn Write) -> Result<(), StreamError> {
        match value {
            Value::Ref(target) => {
                if let Some(link) = reference_text(self.links, target)? {
                    write!(out, "<{tag}>{}</{tag}>", escape(&link))?;
                }
            }
            Value::List(items) => {
                write!(out, "<{tag}>")?;
                for item in items {
                    self.write_element("item", item, out)?;
                }
                write!(out, "</{tag}>")?;
            }
            Value::Map(entries) => {
                write!(out, "<{tag}>")?;
                for (key, entry) in entries {
                    let key = key.canonical_text().unwrap_or_default();
                    write!(out, "<entry key=\"{}\">", escape(&key))?;
                    self.write_inline(entry, out)?;
                    out.write_all(b"</entry>")?;
                }
                write!(out, "</{tag}>")?;
            }
            Value::Null => write!(out, "<{tag}/>")?,
            scalar => {
                write!(out, "<{tag}>")?;
                self.write_inline(scalar, out)?;
                write!(out, "</{tag}>")?;
            }
        }

        Ok(())
    }

    // Element content for a map entry or scalar.
    fn write_inline(&self, value: &Value, out: &mut dyn Write) -> Result<(), StreamError> {
        match value {
            Value::Blob(bytes) => out.write_all(STANDARD.encode(bytes).as_bytes())?,
            Value::Ref(target) => {
                if let Some(link) = reference_text(self.links, target)? {
                    out.write_all(escape(&link).as_bytes())?;
                }
            }
            Value::List(_) | Value::Map(_) => self.write_element("value", value, out)?,
            Value::Null => {}
            scalar => {
                let text = scalar.canonical_text().unwrap_or_default();
                out.write_all(escape(&text).as_bytes())?;
            }
        }

        Ok(())
    }
}

impl StructuralEncoder for XmlEncoder<'_> {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn encode_record(
        &self,
        record: &DynamicRecord,
        mode: EncodeMode,
        out: &mut dyn Write,
    ) -> Result<(), StreamError> {
        if mode == EncodeMode::Document {
            out.write_all(XML_PROLOG.as_bytes())?;
        }

        self.write_record(record, out)
    }

    fn encode_value(
        &self,
        value: &Value,
        mode: EncodeMode,
        out: &mut dyn Write,
    ) -> Result<(), StreamError> {
        if let Value::Ref(record) = value {
            return self.encode_record(record, mode, out);
        }
        if mode == EncodeMode::Document {
            out.write_all(XML_PROLOG.as_bytes())?;
        }

        self.write_element("value", value, out)
    }
}

// Escape text for element content and attribute values.
fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }

    escaped
}
