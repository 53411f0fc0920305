//! Primary-key encoding.
//!
//! A key is the ordered set of primary-key values of one record.
//! Keys reconstructed from unordered sources (delimited text, key/value
//! lookups) always use canonical order: primary-key properties sorted
//! lexicographically by property name, independent of declaration order.

mod convert;


use crate::{
    error::{ErrorOrigin, InternalError},
    model::{PropertyDescriptor, RecordType},
    value::{ConversionError, Value},
};
use dynlink_primitives::ScalarKind;
use std::fmt;
use thiserror::Error as ThisError;

// re-exports
pub use convert::{CanonicalConverter, ScalarConverter};

///
/// CONSTANTS
///

/// Separator between composite key tokens.
pub const KEY_DELIMITER: char = '+';

///
/// KeyError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum KeyError {
    #[error("malformed key '{input}' for '{record_type}': expected {expected} token(s), found {found}")]
    Malformed {
        record_type: String,
        input: String,
        expected: usize,
        found: usize,
    },

    #[error("key property '{record_type}.{property}' must have exactly one value, found {found}")]
    MissingOrDuplicate {
        record_type: String,
        property: String,
        found: usize,
    },

    #[error("key property '{record_type}.{property}': {source}")]
    Conversion {
        record_type: String,
        property: String,
        source: ConversionError,
    },

    #[error("value of kind {kind} cannot be part of a delimited key")]
    Unencodable { kind: &'static str },

    #[error("record type '{0}' has no primary key")]
    NoPrimaryKey(String),
}

impl From<KeyError> for InternalError {
    fn from(err: KeyError) -> Self {
        Self::invalid_input(ErrorOrigin::Key, err.to_string())
    }
}

///
/// Key
///
/// Primary-key values of one record.
/// Single-property keys hold the bare scalar; composite keys hold values
/// in canonical order.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    Single(Value),
    Composite(Vec<Value>),
}

impl Key {
    /// Build a key from canonically ordered values.
    #[must_use]
    pub fn from_values(mut values: Vec<Value>) -> Self {
        if values.len() == 1 {
            Self::Single(values.remove(0))
        } else {
            Self::Composite(values)
        }
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Composite(values) => values,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }

    /// Pair each value with its canonical property name.
    #[must_use]
    pub fn named<'a>(&'a self, record_type: &'a RecordType) -> Vec<(&'a str, &'a Value)> {
        record_type
            .canonical_key_properties()
            .into_iter()
            .map(|property| property.name())
            .zip(self.values())
            .collect()
    }

    /// Canonical delimited text of this key.
    pub fn to_delimited(&self) -> Result<String, KeyError> {
        KeyCodec::encode_delimited(self.values())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for value in self.values() {
            if !first {
                write!(f, "{KEY_DELIMITER}")?;
            }
            first = false;
            match value.canonical_text() {
                Some(text) => f.write_str(&text)?,
                None => write!(f, "<{}>", value.kind_label())?,
            }
        }

        Ok(())
    }
}

///
/// KeyCodec
///
/// Stateless codec between keys and their canonical text forms.
///

pub struct KeyCodec;

impl KeyCodec {
    /// Canonical text token of each value, without delimiter checks.
    pub fn encode_tokens(values: &[Value]) -> Result<Vec<String>, KeyError> {
        values
            .iter()
            .map(|value| {
                value.canonical_text().ok_or(KeyError::Unencodable {
                    kind: value.kind_label(),
                })
            })
            .collect()
    }

    /// Join values with the key delimiter using their canonical text.
    ///
    /// Tokens containing the delimiter or `/` are rejected so that every
    /// produced string splits back into the same tokens.
    pub fn encode_delimited(values: &[Value]) -> Result<String, KeyError> {
        let tokens = Self::encode_tokens(values)?;
        for (value, token) in values.iter().zip(&tokens) {
            if token.contains(KEY_DELIMITER) || token.contains('/') {
                return Err(KeyError::Unencodable {
                    kind: value.kind_label(),
                });
            }
        }

        Ok(tokens.join(&KEY_DELIMITER.to_string()))
    }

    /// Split delimited text and assign tokens to key properties in canonical order.
    pub fn decode_delimited<C>(
        record_type: &RecordType,
        input: &str,
        converter: &C,
    ) -> Result<Key, KeyError>
    where
        C: ScalarConverter + ?Sized,
    {
        let tokens: Vec<&str> = input.split(KEY_DELIMITER).collect();

        Self::decode_tokens(record_type, input, &tokens, converter)
    }

    /// Assign already split tokens to key properties in canonical order.
    ///
    /// `input` is the original text, reported on arity mismatch.
    pub fn decode_tokens<C, S>(
        record_type: &RecordType,
        input: &str,
        tokens: &[S],
        converter: &C,
    ) -> Result<Key, KeyError>
    where
        C: ScalarConverter + ?Sized,
        S: AsRef<str>,
    {
        let properties = key_properties(record_type)?;
        if tokens.len() != properties.len() {
            return Err(KeyError::Malformed {
                record_type: record_type.name().to_string(),
                input: input.to_string(),
                expected: properties.len(),
                found: tokens.len(),
            });
        }

        let values = properties
            .iter()
            .zip(tokens)
            .map(|(property, token)| {
                convert_token(record_type, property, token.as_ref(), converter)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Key::from_values(values))
    }

    /// Build a key from a multi-valued name → value lookup.
    ///
    /// Every key property must appear exactly once.
    pub fn decode_key_value_map<C, I, K, V>(
        record_type: &RecordType,
        entries: I,
        converter: &C,
    ) -> Result<Key, KeyError>
    where
        C: ScalarConverter + ?Sized,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let properties = key_properties(record_type)?;
        let mut found: Vec<Vec<String>> = vec![Vec::new(); properties.len()];

        for (name, value) in entries {
            if let Some(slot) = properties.iter().position(|p| p.name() == name.as_ref()) {
                found[slot].push(value.as_ref().to_string());
            }
        }

        let mut values = Vec::with_capacity(properties.len());
        for (property, raw) in properties.iter().zip(found) {
            if raw.len() != 1 {
                return Err(KeyError::MissingOrDuplicate {
                    record_type: record_type.name().to_string(),
                    property: property.name().to_string(),
                    found: raw.len(),
                });
            }
            values.push(convert_token(record_type, property, &raw[0], converter)?);
        }

        Ok(Key::from_values(values))
    }
}

fn key_properties(record_type: &RecordType) -> Result<Vec<&PropertyDescriptor>, KeyError> {
    let properties = record_type.canonical_key_properties();
    if properties.is_empty() {
        return Err(KeyError::NoPrimaryKey(record_type.name().to_string()));
    }

    Ok(properties)
}

pub(crate) fn convert_token<C>(
    record_type: &RecordType,
    property: &PropertyDescriptor,
    token: &str,
    converter: &C,
) -> Result<Value, KeyError>
where
    C: ScalarConverter + ?Sized,
{
    // Key properties are validated as keyable scalars at type construction.
    let kind = property
        .value_type()
        .scalar_kind()
        .unwrap_or(ScalarKind::Text);

    converter.convert_scalar(token, kind).map_err(|source| KeyError::Conversion {
        record_type: record_type.name().to_string(),
        property: property.name().to_string(),
        source,
    })
}
