//! Core runtime for dynlink: runtime-typed records, partial materialization,
//! identity wrappers, key and resource-link codecs, and result streaming.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod error;
pub mod identity;
pub mod key;
pub mod link;
pub mod model;
pub mod obs;
pub mod record;
pub mod serialize;
pub mod session;
pub mod store;
pub mod stream;
pub mod types;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, codecs, stores, or serializers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        key::Key,
        model::{PropertyDescriptor, PropertyKind, RecordType, Schema, ValueType},
        record::{DynamicRecord, FetchGroup},
        types::{Float64, Timestamp, Ulid},
        value::Value,
    };
    pub use dynlink_primitives::ScalarKind;
}
