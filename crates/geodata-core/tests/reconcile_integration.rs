//! Integration tests for reconciliation properties against a live store.

use geodata_core::store::{MemoryStore, RecordStore, Scope, StorageConfig, StorageEngine};
use geodata_core::{EntityType, NaturalKey, Reconciler};
use geodata_proto::{Record, Value, FIELD_MODIFY_DATE};
use pretty_assertions::assert_eq;

fn scope() -> Scope {
    Scope::new("test").unwrap()
}

fn country(code: &str, name: &str) -> Record {
    Record::new().with("alpha2Code", code).with("name", name)
}

/// Reconcile countries from `source` against whatever the store holds.
fn sync_countries<S: RecordStore>(store: &S, source: Vec<Record>) -> geodata_core::ReconcileCounts {
    let descriptor = EntityType::Country.descriptor();
    let existing = store.query_all(&scope(), EntityType::Country).unwrap();
    Reconciler::new(&descriptor)
        .reconcile(store, &scope(), source, existing)
        .unwrap()
        .counts
}

fn stored_by_code<S: RecordStore>(store: &S, code: &str) -> Record {
    store
        .query_all(&scope(), EntityType::Country)
        .unwrap()
        .into_iter()
        .find(|r| r.get("alpha2Code") == Some(&Value::from(code)))
        .unwrap()
}

#[test]
fn test_second_run_is_a_noop() {
    let store = MemoryStore::new();
    let snapshot = vec![
        country("US", "United States"),
        country("CA", "Canada"),
        country("MX", "Mexico").with("numericCode", 484i64),
    ];

    let first = sync_countries(&store, snapshot.clone());
    assert_eq!(first.inserted, 3);

    let second = sync_countries(&store, snapshot);
    assert_eq!((second.inserted, second.updated, second.deactivated), (0, 0, 0));
    assert_eq!(second.unchanged, 3);
    assert_eq!(store.insert_calls(), 1);
    assert_eq!(store.update_calls(), 0);
}

#[test]
fn test_store_matches_source_after_run() {
    let store = MemoryStore::new();
    sync_countries(&store, vec![country("US", "United States"), country("MX", "Mexico")]);
    sync_countries(&store, vec![country("US", "USA"), country("CA", "Canada")]);

    let descriptor = EntityType::Country.descriptor();
    let all = store.query_all(&scope(), EntityType::Country).unwrap();
    let active: Vec<String> = all
        .iter()
        .filter(|r| r.is_active())
        .map(|r| NaturalKey::build(r, &descriptor.key_fields).to_string())
        .collect();
    assert_eq!(active, vec!["US".to_string(), "CA".to_string()]);

    assert!(!stored_by_code(&store, "MX").is_active());
    assert_eq!(stored_by_code(&store, "US").get("name"), Some(&Value::from("USA")));
}

#[test]
fn test_identifiers_survive_updates() {
    let store = MemoryStore::new();
    sync_countries(&store, vec![country("US", "United States")]);
    let original = stored_by_code(&store, "US").id();

    let counts = sync_countries(&store, vec![country("US", "United States of America")]);
    assert_eq!(counts.updated, 1);
    assert_eq!(stored_by_code(&store, "US").id(), original);
}

#[test]
fn test_exempt_field_change_is_ignored() {
    let store = MemoryStore::new();
    sync_countries(&store, vec![country("US", "United States")]);

    let mut touched = stored_by_code(&store, "US");
    touched.set(FIELD_MODIFY_DATE, Value::Timestamp(42));
    store.put_raw(&scope(), EntityType::Country, touched).unwrap();

    let counts = sync_countries(&store, vec![country("US", "United States")]);
    assert_eq!(counts.updated, 0);
    assert_eq!(counts.unchanged, 1);
}

#[test]
fn test_reappearing_record_is_reactivated() {
    let store = MemoryStore::new();
    sync_countries(&store, vec![country("US", "United States"), country("MX", "Mexico")]);
    let mexico_id = stored_by_code(&store, "MX").id();

    let dropped = sync_countries(&store, vec![country("US", "United States")]);
    assert_eq!(dropped.deactivated, 1);

    // Deactivating an already inactive record is not repeated.
    let again = sync_countries(&store, vec![country("US", "United States")]);
    assert_eq!(again.deactivated, 0);

    let back = sync_countries(&store, vec![country("US", "United States"), country("MX", "Mexico")]);
    assert_eq!((back.inserted, back.updated), (0, 1));

    let mexico = stored_by_code(&store, "MX");
    assert!(mexico.is_active());
    assert_eq!(mexico.id(), mexico_id);
}

#[test]
fn test_worked_examples() {
    let store = MemoryStore::new();
    sync_countries(&store, vec![country("US", "United States"), country("MX", "Mexico")]);

    let descriptor = EntityType::Country.descriptor();
    let existing = store.query_all(&scope(), EntityType::Country).unwrap();
    let mexico_id = stored_by_code(&store, "MX").id().unwrap();

    let classification = Reconciler::new(&descriptor).classify(
        vec![country("US", "United States"), country("CA", "Canada")],
        existing,
    );

    assert_eq!(classification.to_insert, vec![country("CA", "Canada").with("isActive", true)]);
    assert!(classification.to_update.is_empty());
    assert_eq!(classification.to_deactivate.len(), 1);

    let mexico = &classification.to_deactivate[0];
    assert_eq!(mexico.id(), Some(mexico_id));
    assert_eq!(mexico.get("alpha2Code"), Some(&Value::from("MX")));
    assert!(!mexico.is_active());
}

#[test]
fn test_sled_store_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = StorageEngine::open(StorageConfig::new(dir.path())).unwrap();
    let snapshot = vec![
        country("FR", "France").with("numericCode", 250i64),
        country("DE", "Germany"),
    ];

    assert_eq!(sync_countries(&store, snapshot.clone()).inserted, 2);
    let second = sync_countries(&store, snapshot);
    assert_eq!((second.inserted, second.updated, second.deactivated), (0, 0, 0));

    let removed = sync_countries(&store, vec![country("FR", "France")]);
    assert_eq!((removed.updated, removed.deactivated), (1, 1));
    assert_eq!(store.count(&scope(), EntityType::Country).unwrap(), 2);
    assert!(stored_by_code(&store, "FR").get("numericCode").is_none());
}
