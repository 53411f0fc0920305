use crate::{
    model::{ModelError, PropertyDescriptor as P, PropertyKind, RecordType, Schema, ValueType},
    test_support,
};
use dynlink_primitives::ScalarKind;

fn order_like() -> RecordType {
    RecordType::new(
        "Order",
        vec![
            P::scalar("id", ScalarKind::Int).primary_key(),
            P::scalar("status", ScalarKind::Text),
            P::to_one("customer", "Customer"),
            P::to_many("lines", ValueType::Record("OrderLine".into())),
        ],
    )
    .expect("valid type")
}

// ---- positions ---------------------------------------------------------

#[test]
fn property_positions_follow_declaration_order() {
    let record_type = order_like();

    for (position, property) in record_type.properties().iter().enumerate() {
        assert_eq!(record_type.property_index(property.name()), Ok(position));
        assert_eq!(
            record_type.property_at(position).map(P::name),
            Ok(property.name())
        );
    }
}

#[test]
fn property_positions_are_stable_across_lookups() {
    let schema = test_support::schema();

    for record_type in schema.iter() {
        let first: Vec<_> = record_type
            .properties()
            .iter()
            .map(|p| record_type.property_index(p.name()))
            .collect();
        let second: Vec<_> = record_type
            .properties()
            .iter()
            .map(|p| record_type.property_index(p.name()))
            .collect();
        assert_eq!(first, second);
    }
}

#[test]
fn unknown_property_names_the_type() {
    let err = order_like().property_index("nope").unwrap_err();
    assert_eq!(err.record_type, "Order");
    assert_eq!(err.property, "nope");
    assert!(order_like().property_at(99).is_err());
}

// ---- keys --------------------------------------------------------------

#[test]
fn canonical_key_order_is_lexicographic() {
    let record_type = RecordType::new(
        "Pair",
        vec![
            P::scalar("b", ScalarKind::Int).primary_key(),
            P::scalar("label", ScalarKind::Text),
            P::scalar("a", ScalarKind::Int).primary_key(),
        ],
    )
    .expect("valid type");

    let declared: Vec<_> = record_type.primary_key_properties().map(P::name).collect();
    let canonical: Vec<_> = record_type
        .canonical_key_properties()
        .into_iter()
        .map(P::name)
        .collect();

    assert_eq!(declared, ["b", "a"]);
    assert_eq!(canonical, ["a", "b"]);
    assert_eq!(record_type.canonical_key_positions(), &[2, 0]);
    assert!(record_type.is_identified());
}

#[test]
fn type_without_key_is_unidentified() {
    let record_type =
        RecordType::new("Note", vec![P::scalar("body", ScalarKind::Text)]).expect("valid type");
    assert!(!record_type.is_identified());
}

// ---- validation --------------------------------------------------------

#[test]
fn invalid_type_names_are_rejected() {
    for name in ["", "Or/der", "A+B", "Ünicode", "<Order>", "A&B", "Big Order", "1st", ".", ".."] {
        let err = RecordType::new(name, vec![]).unwrap_err();
        assert!(
            matches!(err, ModelError::InvalidRecordTypeName { .. }),
            "name {name:?}"
        );
    }
}

#[test]
fn property_names_must_be_element_safe() {
    for property in ["", "a b", "<x>", "a&b", "9lives", "-x"] {
        let err = RecordType::new("Bad", vec![P::scalar(property, ScalarKind::Int)]).unwrap_err();
        assert!(
            matches!(&err, ModelError::InvalidPropertyName { property: found, .. } if found == property),
            "property {property:?}: {err:?}"
        );
    }

    let record_type = RecordType::new(
        "Line_item.v2",
        vec![P::scalar("unit-price", ScalarKind::Int), P::scalar("_seq", ScalarKind::Uint)],
    )
    .expect("element-safe names");
    assert_eq!(record_type.property_index("unit-price"), Ok(0));
}

#[test]
fn duplicate_properties_are_rejected() {
    let err = RecordType::new(
        "Dup",
        vec![
            P::scalar("x", ScalarKind::Int),
            P::scalar("x", ScalarKind::Text),
        ],
    )
    .unwrap_err();

    assert_eq!(
        err,
        ModelError::DuplicateProperty {
            record_type: "Dup".to_string(),
            property: "x".to_string(),
        }
    );
}

#[test]
fn primary_key_must_be_keyable_scalar() {
    let blob = RecordType::new("B", vec![P::scalar("data", ScalarKind::Blob).primary_key()]);
    assert!(matches!(blob, Err(ModelError::InvalidPrimaryKey { .. })));

    let reference = RecordType::new("R", vec![P::to_one("other", "B").primary_key()]);
    assert!(matches!(reference, Err(ModelError::InvalidPrimaryKey { .. })));
}

#[test]
fn mapped_by_requires_record_collection() {
    let err = RecordType::new(
        "Bad",
        vec![P::to_one("owner", "Owner").mapped_by("items")],
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidMappedBy { .. }));

    let err = RecordType::new(
        "Bad",
        vec![P::to_many("names", ValueType::Scalar(ScalarKind::Text)).mapped_by("owner")],
    )
    .unwrap_err();
    assert!(matches!(err, ModelError::InvalidMappedBy { .. }));
}

#[test]
fn property_kinds_report_to_many() {
    let record_type = order_like();
    let kinds: Vec<_> = record_type.properties().iter().map(P::kind).collect();

    assert_eq!(
        kinds,
        [
            PropertyKind::Scalar,
            PropertyKind::Scalar,
            PropertyKind::ToOne,
            PropertyKind::ToManyCollection,
        ]
    );
    assert!(PropertyKind::ToManyMap.is_to_many());
    assert!(!PropertyKind::ToOne.is_to_many());
}

// ---- schema ------------------------------------------------------------

#[test]
fn schema_rejects_duplicate_registration() {
    let mut schema = Schema::new();
    schema.register(order_like()).expect("first registration");

    let err = schema.register(order_like()).unwrap_err();
    assert_eq!(err, ModelError::DuplicateRecordType("Order".to_string()));
}

#[test]
fn schema_validate_reports_unknown_targets() {
    let mut schema = Schema::new();
    schema.register(order_like()).expect("registration");

    let err = schema.validate().unwrap_err();
    assert!(matches!(err, ModelError::UnknownTarget { .. }));
}

#[test]
fn schema_validate_reports_broken_back_reference() {
    let mut schema = Schema::new();
    schema
        .register(
            RecordType::new(
                "Owner",
                vec![
                    P::scalar("id", ScalarKind::Int).primary_key(),
                    P::to_many("items", ValueType::Record("Item".into())).mapped_by("owner"),
                ],
            )
            .expect("owner type"),
        )
        .expect("owner registration");
    schema
        .register(
            RecordType::new(
                "Item",
                vec![
                    P::scalar("id", ScalarKind::Int).primary_key(),
                    P::scalar("owner", ScalarKind::Int),
                ],
            )
            .expect("item type"),
        )
        .expect("item registration");

    let err = schema.validate().unwrap_err();
    assert!(matches!(err, ModelError::BrokenBackReference { .. }));
}

#[test]
fn fixture_schema_validates() {
    let schema = test_support::schema();
    assert_eq!(schema.len(), 6);
    assert!(schema.record_type("Order").is_some());
    assert!(schema.record_type("Missing").is_none());
}
