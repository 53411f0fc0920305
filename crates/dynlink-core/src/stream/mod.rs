//! Result streaming.
//!
//! Negotiates a response format from client media-type candidates and
//! writes records to an output sink one item at a time. Sequences are
//! framed per format; nothing is buffered beyond the current item except
//! in the opaque fallback.

pub mod encoder;
mod media;


use crate::{
    error::{ErrorClass, ErrorOrigin, InternalError},
    link::{LinkError, ResourceLinkCodec},
    obs::sink::{self, MetricsEvent},
    record::DynamicRecord,
    serialize::{self, SerializeError},
    value::{Value, WireRecord, WireValue},
};
use std::io::Write;
use thiserror::Error as ThisError;

// re-exports
pub use encoder::{EncodeMode, JsonEncoder, StructuralEncoder, XML_PROLOG, XmlEncoder};
pub use media::{Accept, Format, MediaType};

///
/// CONSTANTS
///

/// Wrapper element around XML sequences.
pub const COLLECTION_ELEMENT: &str = "collection";

///
/// StreamError
///

#[derive(Debug, ThisError)]
pub enum StreamError {
    #[error("no encoder for format '{0}'")]
    UnsupportedFormat(Format),

    #[error("write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("json encoding failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error(transparent)]
    Link(#[from] LinkError),
}

impl From<StreamError> for InternalError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::UnsupportedFormat(_) => {
                Self::new(ErrorClass::Unsupported, ErrorOrigin::Stream, err.to_string())
            }
            StreamError::Serialize(err) => err.into(),
            StreamError::Link(err) => err.into(),
            StreamError::Io(_) | StreamError::Json(_) => {
                Self::internal(ErrorOrigin::Stream, err.to_string())
            }
        }
    }
}

///
/// Payload
///

pub enum Payload<'a> {
    Record(&'a DynamicRecord),
    /// Sequence pulled one record at a time.
    Records(Box<dyn Iterator<Item = DynamicRecord> + 'a>),
    Value(&'a Value),
    Bytes(&'a [u8]),
}

impl<'a> Payload<'a> {
    pub fn records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = DynamicRecord>,
        I::IntoIter: 'a,
    {
        Self::Records(Box::new(records.into_iter()))
    }
}

///
/// ResultStreamer
///
/// Holds the structural encoders available for this response.
/// With no encoders at all, output degrades to raw bytes or the opaque
/// serialization.
///

#[derive(Default)]
pub struct ResultStreamer<'a> {
    encoders: Vec<Box<dyn StructuralEncoder + 'a>>,
}

impl<'a> ResultStreamer<'a> {
    /// Streamer without structural encoders.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Streamer with the bundled JSON and XML encoders.
    #[must_use]
    pub fn structural(links: Option<&'a ResourceLinkCodec>) -> Self {
        match links {
            Some(links) => Self::new()
                .with_encoder(JsonEncoder::with_links(links))
                .with_encoder(XmlEncoder::with_links(links)),
            None => Self::new()
                .with_encoder(JsonEncoder::new())
                .with_encoder(XmlEncoder::new()),
        }
    }

    /// Register an encoder; a later encoder for the same format wins.
    #[must_use]
    pub fn with_encoder(mut self, encoder: impl StructuralEncoder + 'a) -> Self {
        self.encoders.insert(0, Box::new(encoder));
        self
    }

    /// Pick a format from client candidates: any JSON candidate wins,
    /// then any XML candidate, else `Unsupported`.
    #[must_use]
    pub fn choose_format(candidates: &[Accept]) -> Format {
        if candidates.iter().any(Accept::is_json) {
            Format::Json
        } else if candidates.iter().any(Accept::is_xml) {
            Format::Xml
        } else {
            Format::Unsupported
        }
    }

    fn encoder_for(&self, format: Format) -> Option<&(dyn StructuralEncoder + 'a)> {
        if format == Format::Unsupported {
            return None;
        }

        self.encoders
            .iter()
            .find(|encoder| encoder.format() == format)
            .map(Box::as_ref)
    }

    /// Write `payload` to `out`, returning the number of items written.
    ///
    /// Bytes already written stay written when a later item fails.
    pub fn stream(
        &self,
        format: Format,
        payload: Payload<'_>,
        out: &mut dyn Write,
    ) -> Result<u64, StreamError> {
        tracing::debug!(%format, "stream started");

        let (label, items) = match self.encoder_for(format) {
            Some(encoder) => (format.label(), stream_structural(encoder, payload, out)?),
            None if self.encoders.is_empty() => stream_fallback(payload, out)?,
            None => return Err(StreamError::UnsupportedFormat(format)),
        };
        out.flush()?;

        sink::record(MetricsEvent::StreamWritten {
            format: label,
            items,
        });

        Ok(items)
    }
}

fn stream_structural(
    encoder: &dyn StructuralEncoder,
    payload: Payload<'_>,
    out: &mut dyn Write,
) -> Result<u64, StreamError> {
    match payload {
        Payload::Record(record) => encoder.encode_record(record, EncodeMode::Document, out)?,
        Payload::Value(value) => encoder.encode_value(value, EncodeMode::Document, out)?,
        Payload::Bytes(bytes) => {
            encoder.encode_value(&Value::Blob(bytes.to_vec()), EncodeMode::Document, out)?;
        }
        Payload::Records(records) => return stream_sequence(encoder, records, out),
    }

    Ok(1)
}

fn stream_sequence(
    encoder: &dyn StructuralEncoder,
    records: Box<dyn Iterator<Item = DynamicRecord> + '_>,
    out: &mut dyn Write,
) -> Result<u64, StreamError> {
    let mut items = 0u64;

    match encoder.format() {
        Format::Xml => {
            out.write_all(XML_PROLOG.as_bytes())?;
            write!(out, "<{COLLECTION_ELEMENT}>")?;
            for record in records {
                encoder.encode_record(&record, EncodeMode::Fragment, out)?;
                items += 1;
            }
            write!(out, "</{COLLECTION_ELEMENT}>")?;
        }
        Format::Json | Format::Unsupported => {
            out.write_all(b"[")?;
            for record in records {
                if items > 0 {
                    out.write_all(b",")?;
                }
                encoder.encode_record(&record, EncodeMode::Fragment, out)?;
                items += 1;
            }
            out.write_all(b"]")?;
        }
    }

    Ok(items)
}

// No structural encoder: raw bytes verbatim, anything else opaque.
fn stream_fallback(
    payload: Payload<'_>,
    out: &mut dyn Write,
) -> Result<(&'static str, u64), StreamError> {
    let (wire, items) = match payload {
        Payload::Bytes(bytes) => {
            out.write_all(bytes)?;
            return Ok(("bytes", 1));
        }
        Payload::Record(record) => (WireValue::Record(WireRecord::from_record(record)), 1),
        Payload::Value(Value::Ref(record)) => {
            (WireValue::Record(WireRecord::from_record(record)), 1)
        }
        Payload::Value(value) => (WireValue::from_value(value), 1),
        Payload::Records(records) => {
            let records: Vec<WireValue> = records
                .map(|record| WireValue::Record(WireRecord::from_record(&record)))
                .collect();
            let items = u64::try_from(records.len()).unwrap_or(u64::MAX);
            (WireValue::List(records), items)
        }
    };

    out.write_all(&serialize::encode_opaque(&wire)?)?;

    Ok(("opaque", items))
}
