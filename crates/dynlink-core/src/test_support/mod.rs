pub mod store;

use crate::{
    link::{LinkConfig, ResourceLinkCodec},
    model::{PropertyDescriptor as P, RecordType, Schema, ValueType},
    store::RecordStore,
};
use dynlink_primitives::ScalarKind;
use std::sync::Arc;

// re-exports
pub use store::MemoryStore;

/// Base URI used by link fixtures.
pub const BASE_URI: &str = "http://h/";

/// Context name used by link fixtures.
pub const CONTEXT_NAME: &str = "shop";

/// Build the shared test schema.
///
/// Customer 1─* Order 1─* OrderLine, plus:
/// - `Pair`: composite key declared `b` then `a`.
/// - `Tag`: single text key, one property.
/// - `Note`: no primary key.
#[must_use]
pub fn schema() -> Arc<Schema> {
    let mut schema = Schema::new();
    let types = [
        RecordType::new(
            "Customer",
            vec![
                P::scalar("id", ScalarKind::Int).primary_key(),
                P::scalar("name", ScalarKind::Text),
                P::to_many("orders", ValueType::Record("Order".into())).mapped_by("customer"),
            ],
        ),
        RecordType::new(
            "Order",
            vec![
                P::scalar("id", ScalarKind::Int).primary_key(),
                P::scalar("status", ScalarKind::Text),
                P::to_one("customer", "Customer"),
                P::to_many("lines", ValueType::Record("OrderLine".into())).mapped_by("order"),
                P::to_many_map("attributes", ValueType::Scalar(ScalarKind::Text)),
                P::to_many("tags", ValueType::Scalar(ScalarKind::Text)),
            ],
        ),
        RecordType::new(
            "OrderLine",
            vec![
                P::scalar("id", ScalarKind::Int).primary_key(),
                P::scalar("sku", ScalarKind::Text),
                P::scalar("quantity", ScalarKind::Uint),
                P::to_one("order", "Order"),
            ],
        ),
        RecordType::new(
            "Pair",
            vec![
                P::scalar("b", ScalarKind::Int).primary_key(),
                P::scalar("a", ScalarKind::Int).primary_key(),
                P::scalar("label", ScalarKind::Text),
            ],
        ),
        RecordType::new("Tag", vec![P::scalar("name", ScalarKind::Text).primary_key()]),
        RecordType::new("Note", vec![P::scalar("body", ScalarKind::Text)]),
    ];

    for record_type in types {
        schema
            .register(record_type.expect("fixture type"))
            .expect("fixture registration");
    }
    schema.validate().expect("fixture schema");

    Arc::new(schema)
}

///
/// Fixture
///
/// Schema plus an in-memory store, with the store also available as the
/// trait object that records and codecs hold.
///

pub struct Fixture {
    pub schema: Arc<Schema>,
    pub store: Arc<MemoryStore>,
    pub session: Arc<dyn RecordStore>,
}

impl Fixture {
    #[must_use]
    pub fn new() -> Self {
        let schema = schema();
        let store = Arc::new(MemoryStore::new(Arc::clone(&schema)));
        let session: Arc<dyn RecordStore> = store.clone();

        Self {
            schema,
            store,
            session,
        }
    }

    #[must_use]
    pub fn record_type(&self, name: &str) -> Arc<RecordType> {
        self.schema
            .record_type(name)
            .cloned()
            .expect("fixture record type")
    }

    #[must_use]
    pub fn links(&self) -> ResourceLinkCodec {
        ResourceLinkCodec::new(
            LinkConfig::new(BASE_URI, CONTEXT_NAME),
            Arc::clone(&self.schema),
            Arc::clone(&self.session),
        )
    }
}
