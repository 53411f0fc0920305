use super::*;
use crate::{test_support::Fixture, value::Value};
use std::{
    sync::atomic::{AtomicUsize, Ordering},
    thread,
};

#[derive(Debug)]
struct Account {
    id: i64,
    name: String,
}

fn account(id: i64, name: &str) -> Arc<Account> {
    Arc::new(Account {
        id,
        name: name.to_string(),
    })
}

fn populate(owner: &Arc<Account>, record: &DynamicRecord) {
    record
        .set("id", owner.id)
        .and_then(|r| r.set("name", owner.name.as_str()))
        .expect("populate wrapper");
}

#[test]
fn same_owner_yields_same_wrapper() {
    let fixture = Fixture::new();
    let customer = fixture.record_type("Customer");
    let cache = IdentityWrapperCache::new();
    let owner = account(7, "Ada");

    let first = cache.wrap(&owner, &customer, populate);
    let second = cache.wrap(&owner, &customer, |_, _| panic!("populated twice"));

    assert!(first.ptr_eq(&second));
    assert_eq!(first.get("name"), Ok(Value::from("Ada")));
    assert_eq!(first.identity(), Some(IdentityKey::of(&owner)));
    assert_eq!(cache.len(), 1);
}

#[test]
fn distinct_owners_get_distinct_wrappers() {
    let fixture = Fixture::new();
    let customer = fixture.record_type("Customer");
    let cache = IdentityWrapperCache::new();

    // equal contents, different instances
    let a = account(1, "Same");
    let b = account(1, "Same");

    let wa = cache.wrap(&a, &customer, populate);
    let wb = cache.wrap(&b, &customer, populate);

    assert!(!wa.ptr_eq(&wb));
    assert_ne!(wa, wb);
    assert_eq!(cache.len(), 2);
}

#[test]
fn unwrap_returns_the_owner() {
    let fixture = Fixture::new();
    let customer = fixture.record_type("Customer");
    let cache = IdentityWrapperCache::new();
    let owner = account(3, "Grace");

    let wrapper = cache.wrap(&owner, &customer, populate);
    let back = cache.unwrap::<Account>(&wrapper).expect("owner");

    assert!(Arc::ptr_eq(&back, &owner));
}

#[test]
fn unwrap_rejects_foreign_records_and_wrong_types() {
    let fixture = Fixture::new();
    let customer = fixture.record_type("Customer");
    let cache = IdentityWrapperCache::new();
    let owner = account(3, "Grace");
    let wrapper = cache.wrap(&owner, &customer, populate);

    let plain = DynamicRecord::new(Arc::clone(&customer));
    assert!(cache.unwrap::<Account>(&plain).is_none());
    assert!(cache.unwrap::<String>(&wrapper).is_none());

    let other_cache = IdentityWrapperCache::new();
    assert!(other_cache.unwrap::<Account>(&wrapper).is_none());
}

#[test]
fn dead_owners_are_not_resolved_and_purge() {
    let fixture = Fixture::new();
    let customer = fixture.record_type("Customer");
    let cache = IdentityWrapperCache::new();
    let owner = account(9, "Gone");
    let wrapper = cache.wrap(&owner, &customer, populate);

    drop(owner);

    assert!(cache.unwrap::<Account>(&wrapper).is_none());
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.purge(), 1);
    assert!(cache.is_empty());

    // the wrapper itself stays usable
    assert_eq!(wrapper.get("id"), Ok(Value::Int(9)));
}

#[test]
fn lookup_does_not_create() {
    let cache = IdentityWrapperCache::new();
    let owner = account(1, "x");

    assert!(cache.lookup(&owner).is_none());
    assert!(cache.is_empty());
}

#[test]
fn concurrent_wraps_agree_on_one_wrapper() {
    let fixture = Fixture::new();
    let customer = fixture.record_type("Customer");
    let cache = IdentityWrapperCache::new();
    let owner = account(11, "Shared");
    let populated = AtomicUsize::new(0);

    let wrappers: Vec<DynamicRecord> = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    cache.wrap(&owner, &customer, |owner, record| {
                        populated.fetch_add(1, Ordering::SeqCst);
                        populate(owner, record);
                    })
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().expect("wrap thread"))
            .collect()
    });

    let first = &wrappers[0];
    assert!(wrappers.iter().all(|w| w.ptr_eq(first)));
    assert!(populated.load(Ordering::SeqCst) >= 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn identity_key_displays_as_hex() {
    let owner = account(1, "x");
    let key = IdentityKey::of(&owner);

    assert!(key.to_string().starts_with("0x"));
}
