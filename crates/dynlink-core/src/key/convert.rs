use crate::value::{ConversionError, Value};
use dynlink_primitives::ScalarKind;

///
/// ScalarConverter
///
/// Converts canonical text into a typed scalar value.
/// Storage collaborators may override this to apply their own
/// conversion rules; the default uses canonical text parsing.
///

pub trait ScalarConverter {
    fn convert_scalar(&self, input: &str, kind: ScalarKind) -> Result<Value, ConversionError> {
        Value::parse_canonical(kind, input)
    }
}

///
/// CanonicalConverter
/// Converter that applies canonical text parsing only.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalConverter;

impl ScalarConverter for CanonicalConverter {}
