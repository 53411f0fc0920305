use crate::{
    error::{ErrorClass, InternalError},
    key::Key,
    model::PropertyKind,
    record::{DynamicRecord, FetchGroup, FetchState, RecordError},
    store::RecordStore,
    test_support::{Fixture, MemoryStore},
    value::Value,
};
use std::sync::Arc;

// ---- helpers -----------------------------------------------------------

fn order(fixture: &Fixture, id: i64) -> DynamicRecord {
    let record = DynamicRecord::new(fixture.record_type("Order"));
    record.set("id", id).expect("set id");
    record
}

fn line(fixture: &Fixture, id: i64) -> DynamicRecord {
    let record = DynamicRecord::new(fixture.record_type("OrderLine"));
    record.set("id", id).expect("set id");
    record
}

fn stored_order(fixture: &Fixture, id: i64) -> DynamicRecord {
    fixture.store.insert_row(
        "Order",
        Key::Single(Value::Int(id)),
        vec![
            ("id", Value::Int(id)),
            ("status", Value::from("open")),
            ("tags", Value::from_list(vec!["rush"])),
        ],
    );

    DynamicRecord::placeholder(
        fixture.record_type("Order"),
        &Key::Single(Value::Int(id)),
        &fixture.session,
    )
    .expect("placeholder")
}

// ---- reads -------------------------------------------------------------

#[test]
fn collection_read_is_never_null() {
    let fixture = Fixture::new();
    let record = DynamicRecord::new(fixture.record_type("Order"));

    assert_eq!(record.get("lines"), Ok(Value::List(vec![])));
    assert_eq!(record.is_set("lines"), Ok(false));

    record.add("lines", &line(&fixture, 1)).expect("add line");
    assert_eq!(record.is_set("lines"), Ok(true));
}

#[test]
fn map_read_allocates_empty_map() {
    let fixture = Fixture::new();
    let record = DynamicRecord::new(fixture.record_type("Order"));

    assert_eq!(record.peek("attributes"), None);
    assert_eq!(record.get("attributes"), Ok(Value::Map(vec![])));
    assert_eq!(record.peek("attributes"), Some(Value::Map(vec![])));
    assert_eq!(record.is_set("attributes"), Ok(false));
}

#[test]
fn unset_scalar_and_to_one_read_as_null() {
    let fixture = Fixture::new();
    let record = DynamicRecord::new(fixture.record_type("Order"));

    assert_eq!(record.get("status"), Ok(Value::Null));
    assert_eq!(record.get("customer"), Ok(Value::Null));
    // reading a to-one never allocates a record
    assert_eq!(record.peek("customer"), None);
}

#[test]
fn unknown_property_is_reported() {
    let fixture = Fixture::new();
    let record = DynamicRecord::new(fixture.record_type("Order"));

    let err = record.get("nope").unwrap_err();
    assert!(matches!(err, RecordError::UnknownProperty(_)));
    assert!(record.get_at_position(99).is_err());
}

#[test]
fn positional_access_matches_named_access() {
    let fixture = Fixture::new();
    let record = order(&fixture, 5);
    let position = record.record_type().property_index("id").expect("index");

    assert_eq!(record.get_at_position(position), Ok(Value::Int(5)));
    record.set_at_position(position, 6).expect("set by position");
    assert_eq!(record.get("id"), Ok(Value::Int(6)));
}

// ---- writes ------------------------------------------------------------

#[test]
fn set_checks_declared_types() {
    let fixture = Fixture::new();
    let record = order(&fixture, 1);

    let err = record.set("status", 5).unwrap_err();
    assert!(matches!(err, RecordError::ValueTypeMismatch { found: "Int", .. }));

    let err = record.set("customer", &line(&fixture, 1)).unwrap_err();
    assert!(matches!(err, RecordError::ValueTypeMismatch { .. }));

    let err = record
        .set("lines", Value::from_list(vec!["not a line"]))
        .unwrap_err();
    assert!(matches!(err, RecordError::ValueTypeMismatch { .. }));

    let class = InternalError::from(err).class;
    assert_eq!(class, ErrorClass::InvalidInput);
}

#[test]
fn set_returns_the_record_for_chaining() {
    let fixture = Fixture::new();
    let record = DynamicRecord::new(fixture.record_type("Order"));

    record
        .set("id", 9)
        .and_then(|r| r.set("status", "open"))
        .expect("chained set");
    assert_eq!(record.get("status"), Ok(Value::from("open")));
}

#[test]
fn unset_resets_each_kind() {
    let fixture = Fixture::new();
    let customer_type = fixture.record_type("Customer");
    let customer = DynamicRecord::new(customer_type);
    customer.set("id", 1).expect("set id");

    let record = order(&fixture, 1);
    record.set("status", "open").expect("set status");
    record.set("customer", &customer).expect("set customer");
    record.add("tags", "a").expect("add tag");

    record.unset("status").expect("unset status");
    record.unset("customer").expect("unset customer");
    record.unset("tags").expect("unset tags");

    assert_eq!(record.peek("status"), None);
    assert_eq!(record.peek("customer"), Some(Value::Null));
    assert_eq!(record.peek("tags"), Some(Value::List(vec![])));
    for name in ["status", "customer", "tags"] {
        assert_eq!(record.is_set(name), Ok(false), "{name}");
    }
}

// ---- collections -------------------------------------------------------

#[test]
fn add_sets_back_reference() {
    let fixture = Fixture::new();
    let owner = order(&fixture, 1);
    let item = line(&fixture, 10);

    owner.add("lines", &item).expect("add");

    let back = item.get("order").expect("back reference");
    assert_eq!(back, Value::Ref(owner.clone()));
    assert_eq!(owner.get("lines"), Ok(Value::List(vec![Value::Ref(item)])));
}

#[test]
fn remove_clears_back_reference_pointing_at_owner() {
    let fixture = Fixture::new();
    let owner = order(&fixture, 1);
    let other = order(&fixture, 2);
    let first = line(&fixture, 10);
    let second = line(&fixture, 11);

    owner.add("lines", &first).expect("add first");
    owner.add("lines", &second).expect("add second");
    // second now belongs elsewhere
    second.set("order", &other).expect("reassign");

    assert_eq!(owner.remove("lines", &Value::from(&first)), Ok(true));
    assert_eq!(owner.remove("lines", &Value::from(&second)), Ok(true));
    assert_eq!(owner.remove("lines", &Value::from(&second)), Ok(false));

    assert_eq!(first.get("order"), Ok(Value::Null));
    assert_eq!(second.get("order"), Ok(Value::Ref(other)));
    assert_eq!(owner.is_set("lines"), Ok(false));
}

#[test]
fn scalar_collections_keep_insertion_order() {
    let fixture = Fixture::new();
    let record = order(&fixture, 1);

    for tag in ["b", "a", "c"] {
        record.add("tags", tag).expect("add tag");
    }
    assert_eq!(record.get("tags"), Ok(Value::from_list(vec!["b", "a", "c"])));

    let err = record.add("tags", 5).unwrap_err();
    assert!(matches!(err, RecordError::ValueTypeMismatch { .. }));
}

#[test]
fn collection_and_map_contracts_do_not_mix() {
    let fixture = Fixture::new();
    let record = order(&fixture, 1);

    let err = record.add("attributes", "x").unwrap_err();
    assert_eq!(
        err,
        RecordError::WrongPropertyKind {
            record_type: "Order".to_string(),
            property: "attributes".to_string(),
            expected: PropertyKind::ToManyCollection,
            actual: PropertyKind::ToManyMap,
        }
    );

    let err = record.put_at("tags", "k", "v").unwrap_err();
    assert!(matches!(
        err,
        RecordError::WrongPropertyKind {
            expected: PropertyKind::ToManyMap,
            actual: PropertyKind::ToManyCollection,
            ..
        }
    ));

    assert!(record.get_at("status", &Value::from("k")).is_err());
    assert!(record.remove("status", &Value::Null).is_err());
}

// ---- maps --------------------------------------------------------------

#[test]
fn map_entries_insert_replace_and_remove() {
    let fixture = Fixture::new();
    let record = order(&fixture, 1);

    assert_eq!(record.put_at("attributes", "color", "red"), Ok(None));
    assert_eq!(record.put_at("attributes", "size", "L"), Ok(None));
    assert_eq!(
        record.put_at("attributes", "color", "blue"),
        Ok(Some(Value::from("red")))
    );

    assert_eq!(
        record.get_at("attributes", &Value::from("color")),
        Ok(Value::from("blue"))
    );
    assert_eq!(
        record.get_at("attributes", &Value::from("missing")),
        Ok(Value::Null)
    );
    assert_eq!(
        record.get("attributes"),
        Ok(Value::Map(vec![
            (Value::from("color"), Value::from("blue")),
            (Value::from("size"), Value::from("L")),
        ]))
    );

    assert_eq!(
        record.remove_at("attributes", &Value::from("color")),
        Ok(Some(Value::from("blue")))
    );
    assert_eq!(record.remove_at("attributes", &Value::from("color")), Ok(None));
    assert_eq!(record.is_set("attributes"), Ok(true));
}

#[test]
fn map_keys_must_be_scalar() {
    let fixture = Fixture::new();
    let record = order(&fixture, 1);

    let err = record
        .put_at("attributes", Value::List(vec![]), "v")
        .unwrap_err();
    assert!(matches!(err, RecordError::ValueTypeMismatch { .. }));
}

// ---- keys --------------------------------------------------------------

#[test]
fn primary_key_is_canonical() {
    let fixture = Fixture::new();
    let pair = DynamicRecord::new(fixture.record_type("Pair"));
    pair.set("b", 2).expect("set b");

    let err = pair.primary_key().unwrap_err();
    assert_eq!(
        err,
        RecordError::PrimaryKeyUnset {
            record_type: "Pair".to_string(),
            property: "a".to_string(),
        }
    );

    pair.set("a", 1).expect("set a");
    assert_eq!(
        pair.primary_key(),
        Ok(Key::Composite(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
fn unset_reports_first_missing_key_in_declaration_order() {
    let fixture = Fixture::new();
    let pair = DynamicRecord::new(fixture.record_type("Pair"));

    let err = pair.primary_key().unwrap_err();
    assert!(matches!(err, RecordError::PrimaryKeyUnset { property, .. } if property == "b"));
}

// ---- partial materialization -------------------------------------------

#[test]
fn placeholder_holds_only_its_key() {
    let fixture = Fixture::new();
    let record = stored_order(&fixture, 42);

    assert_eq!(record.peek("id"), Some(Value::Int(42)));
    for property in record.record_type().properties() {
        let expected = property.name() == "id";
        assert_eq!(record.is_set(property.name()), Ok(expected), "{}", property.name());
    }
    assert!(matches!(record.fetch_state(), FetchState::Partial(_)));
    assert_eq!(fixture.store.loads(), 0);
}

#[test]
fn read_outside_group_refreshes_in_place() {
    let fixture = Fixture::new();
    let record = stored_order(&fixture, 42);
    let other_holder = record.clone();

    assert_eq!(record.get("status"), Ok(Value::from("open")));
    assert_eq!(fixture.store.loads(), 1);
    assert_eq!(record.fetch_state(), FetchState::Full);

    // every holder observes the same slots
    assert_eq!(other_holder.peek("tags"), Some(Value::from_list(vec!["rush"])));
    assert!(other_holder.ptr_eq(&record));

    // loaded records do not reload
    record.get("tags").expect("tags");
    assert_eq!(fixture.store.loads(), 1);
}

#[test]
fn local_writes_survive_refresh() {
    let fixture = Fixture::new();
    let record = stored_order(&fixture, 42);

    record.set("status", "draft").expect("local write");
    assert!(record.is_loaded("status").expect("is_loaded"));

    assert_eq!(record.get("tags"), Ok(Value::from_list(vec!["rush"])));
    assert_eq!(record.get("status"), Ok(Value::from("draft")));
}

#[test]
fn refresh_of_deleted_record_fails_without_mutation() {
    let fixture = Fixture::new();
    let record = stored_order(&fixture, 42);
    fixture.store.delete_row("Order", &Key::Single(Value::Int(42)));

    let err = record.get("status").unwrap_err();
    assert_eq!(
        err,
        RecordError::RecordGone {
            record_type: "Order".to_string(),
            key: "42".to_string(),
        }
    );
    assert!(InternalError::from(err).is_not_found());

    assert!(matches!(record.fetch_state(), FetchState::Partial(_)));
    assert_eq!(record.peek("status"), None);
    assert_eq!(record.peek("id"), Some(Value::Int(42)));
}

#[test]
fn refresh_timeout_is_retryable_and_leaves_record_partial() {
    let fixture = Fixture::new();
    let record = stored_order(&fixture, 42);
    fixture.store.set_timeout(true);

    let err = record.get("status").unwrap_err();
    assert!(matches!(err, RecordError::Timeout { .. }));
    assert!(InternalError::from(err).is_retryable());
    assert!(matches!(record.fetch_state(), FetchState::Partial(_)));

    fixture.store.set_timeout(false);
    assert_eq!(record.get("status"), Ok(Value::from("open")));
}

#[test]
fn reload_returning_the_same_instance_is_not_served_as_loaded() {
    let fixture = Fixture::new();
    let record = stored_order(&fixture, 42);
    fixture.store.remember(&record);
    fixture.store.set_serve_resident(true);

    let err = record.get("status").unwrap_err();
    assert!(matches!(
        &err,
        RecordError::NotReloaded { record_type, .. } if record_type == "Order"
    ));
    assert_eq!(InternalError::from(err).class, ErrorClass::Internal);
    assert!(matches!(record.fetch_state(), FetchState::Partial(_)));
    assert_eq!(record.peek("status"), None);

    fixture.store.set_serve_resident(false);
    assert_eq!(record.get("status"), Ok(Value::from("open")));
    assert_eq!(record.fetch_state(), FetchState::Full);
}

#[test]
fn reads_during_a_reload_serve_current_slots() {
    let fixture = Fixture::new();
    let record = stored_order(&fixture, 42);
    let group = FetchGroup::primary_key(record.record_type());
    record.inner.state.write().fetch = FetchState::Refreshing(group);

    assert_eq!(record.get("status"), Ok(Value::Null));
    assert_eq!(fixture.store.loads(), 0);
}

#[test]
fn refresh_without_live_session_is_detached() {
    let fixture = Fixture::new();
    let record_type = fixture.record_type("Order");
    let record = {
        let store = Arc::new(MemoryStore::new(Arc::clone(&fixture.schema)));
        let session: Arc<dyn RecordStore> = store;
        DynamicRecord::placeholder(record_type, &Key::Single(Value::Int(1)), &session)
            .expect("placeholder")
    };

    let err = record.get("status").unwrap_err();
    assert_eq!(
        err,
        RecordError::Detached {
            record_type: "Order".to_string()
        }
    );
}

#[test]
fn partial_record_with_full_group_is_full() {
    let fixture = Fixture::new();
    let record_type = fixture.record_type("Tag");
    let record = DynamicRecord::partial(record_type, FetchGroup::new(["name"]));

    assert_eq!(record.fetch_state(), FetchState::Full);
}

#[test]
fn placeholder_rejects_wrong_key_arity() {
    let fixture = Fixture::new();
    let err = DynamicRecord::placeholder(
        fixture.record_type("Pair"),
        &Key::Single(Value::Int(1)),
        &fixture.session,
    )
    .unwrap_err();

    assert!(matches!(err, RecordError::KeyArity { expected: 2, found: 1, .. }));
}

// ---- snapshots ---------------------------------------------------------

#[test]
fn snapshot_applies_only_unloaded_properties() {
    let fixture = Fixture::new();
    let target = DynamicRecord::partial(
        fixture.record_type("Order"),
        FetchGroup::new(["id", "status"]),
    );
    target.set("id", 1).expect("set id");
    target.set("status", "mine").expect("set status");

    let source = order(&fixture, 1);
    source.set("status", "theirs").expect("set status");
    source.add("tags", "x").expect("add tag");

    target.apply_snapshot(&source.snapshot()).expect("apply");

    assert_eq!(target.peek("status"), Some(Value::from("mine")));
    assert_eq!(target.peek("tags"), Some(Value::from_list(vec!["x"])));
    assert_eq!(target.fetch_state(), FetchState::Full);
}

#[test]
fn snapshot_of_other_type_is_rejected() {
    let fixture = Fixture::new();
    let target = order(&fixture, 1);
    let source = line(&fixture, 1);

    let err = target.apply_snapshot(&source.snapshot()).unwrap_err();
    assert!(matches!(err, RecordError::SnapshotMismatch { .. }));
}
