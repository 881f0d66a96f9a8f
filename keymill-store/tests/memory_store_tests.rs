use keymill_store::{
    ActivationStore, EventStore, LicenseStore, MemoryStore, QuotaInsert, StoreError,
};
use keymill_types::{Activation, AuditEvent, EventKind, License, LicenseId, LicensedModule};
use std::sync::Arc;

fn make_license(tenant: &str) -> License {
    License::new(
        tenant,
        vec![LicensedModule::CustomPortal],
        chrono::Utc::now() + chrono::Duration::days(30),
        3,
        format!("tok-{}", LicenseId::new()),
        "admin",
    )
}

// ── LicenseStore ─────────────────────────────────────────────────

#[test]
fn insert_and_find() {
    let store = MemoryStore::new();
    let license = make_license("acme");

    store.insert_license(&license).unwrap();
    let found = store.find_license(license.id).unwrap().unwrap();
    assert_eq!(found, license);
}

#[test]
fn find_missing_is_none() {
    let store = MemoryStore::new();
    assert!(store.find_license(LicenseId::new()).unwrap().is_none());
}

#[test]
fn insert_duplicate_id_fails() {
    let store = MemoryStore::new();
    let license = make_license("acme");
    store.insert_license(&license).unwrap();
    let result = store.insert_license(&license);
    assert!(matches!(result, Err(StoreError::Duplicate(_))));
}

#[test]
fn find_by_token_matches_only_current() {
    let store = MemoryStore::new();
    let mut license = make_license("acme");
    let old_token = license.token.clone();
    store.insert_license(&license).unwrap();

    license.token = "tok-replacement".to_string();
    store.update_license(&license).unwrap();

    assert!(store.find_by_token(&old_token).unwrap().is_none());
    assert_eq!(
        store.find_by_token("tok-replacement").unwrap().unwrap().id,
        license.id
    );
}

#[test]
fn update_missing_fails() {
    let store = MemoryStore::new();
    let license = make_license("acme");
    assert!(matches!(
        store.update_license(&license),
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn list_for_tenant_is_newest_first() {
    let store = MemoryStore::new();
    let first = make_license("acme");
    store.insert_license(&first).unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let second = make_license("acme");
    store.insert_license(&second).unwrap();
    store.insert_license(&make_license("globex")).unwrap();

    let listed = store.licenses_for_tenant("acme").unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, second.id);
    assert_eq!(listed[1].id, first.id);
}

// ── ActivationStore ──────────────────────────────────────────────

#[test]
fn quota_insert_admits_in_order() {
    let store = MemoryStore::new();
    let license_id = LicenseId::new();

    for n in 1..=3u32 {
        let activation = Activation::new(license_id, format!("hw-{n}"), None);
        let outcome = store.insert_within_quota(activation, 3).unwrap();
        assert_eq!(outcome, QuotaInsert::Admitted { ordinal: n });
    }
    assert_eq!(store.count_activations(license_id).unwrap(), 3);
}

#[test]
fn quota_insert_exhausted_at_max() {
    let store = MemoryStore::new();
    let license_id = LicenseId::new();

    store
        .insert_within_quota(Activation::new(license_id, "hw-1", None), 1)
        .unwrap();
    let outcome = store
        .insert_within_quota(Activation::new(license_id, "hw-2", None), 1)
        .unwrap();

    assert_eq!(outcome, QuotaInsert::Exhausted { current: 1, max: 1 });
    assert_eq!(store.count_activations(license_id).unwrap(), 1);
}

#[test]
fn duplicate_pair_is_rejected() {
    let store = MemoryStore::new();
    let license_id = LicenseId::new();

    store
        .insert_within_quota(Activation::new(license_id, "hw-1", None), 3)
        .unwrap();
    let result = store.insert_within_quota(Activation::new(license_id, "hw-1", None), 3);
    assert!(matches!(result, Err(StoreError::Duplicate(_))));
    assert_eq!(store.count_activations(license_id).unwrap(), 1);
}

#[test]
fn quota_is_per_license() {
    let store = MemoryStore::new();
    let a = LicenseId::new();
    let b = LicenseId::new();

    store
        .insert_within_quota(Activation::new(a, "hw-1", None), 1)
        .unwrap();
    let outcome = store
        .insert_within_quota(Activation::new(b, "hw-1", None), 1)
        .unwrap();

    assert_eq!(outcome, QuotaInsert::Admitted { ordinal: 1 });
}

#[test]
fn find_and_list_activations() {
    let store = MemoryStore::new();
    let license_id = LicenseId::new();

    store
        .insert_within_quota(
            Activation::new(license_id, "hw-1", Some("10.0.0.7".into())),
            3,
        )
        .unwrap();
    std::thread::sleep(std::time::Duration::from_millis(2));
    store
        .insert_within_quota(Activation::new(license_id, "hw-2", None), 3)
        .unwrap();

    let found = store.find_activation(license_id, "hw-1").unwrap().unwrap();
    assert_eq!(found.source_address.as_deref(), Some("10.0.0.7"));
    assert!(store.find_activation(license_id, "hw-9").unwrap().is_none());

    let listed = store.activations_for_license(license_id).unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].hardware_id, "hw-1"); // oldest first
    assert_eq!(listed[1].hardware_id, "hw-2");
}

// ── Concurrency ──────────────────────────────────────────────────

#[test]
fn concurrent_admissions_never_exceed_quota() {
    let store = Arc::new(MemoryStore::new());
    let license_id = LicenseId::new();
    let max = 4u32;

    let handles: Vec<_> = (0..16)
        .map(|n| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store.insert_within_quota(Activation::new(license_id, format!("hw-{n}"), None), max)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let admitted = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(QuotaInsert::Admitted { .. })))
        .count();

    assert_eq!(admitted as u32, max);
    assert_eq!(store.count_activations(license_id).unwrap(), max);
}

#[test]
fn concurrent_same_hardware_collides_safely() {
    let store = Arc::new(MemoryStore::new());
    let license_id = LicenseId::new();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                store.insert_within_quota(Activation::new(license_id, "hw-1", None), 4)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let admitted = outcomes
        .iter()
        .filter(|o| matches!(o, Ok(QuotaInsert::Admitted { .. })))
        .count();
    let duplicates = outcomes
        .iter()
        .filter(|o| matches!(o, Err(StoreError::Duplicate(_))))
        .count();

    assert_eq!(admitted, 1);
    assert_eq!(duplicates, 7);
    assert_eq!(store.count_activations(license_id).unwrap(), 1);
}

// ── EventStore ───────────────────────────────────────────────────

#[test]
fn events_list_most_recent_first() {
    let store = MemoryStore::new();
    let license_id = LicenseId::new();

    for message in ["first", "second", "third"] {
        store
            .append_event(&AuditEvent::new(
                license_id,
                EventKind::Validated,
                message,
                "system",
            ))
            .unwrap();
    }

    let events = store.events_for_license(license_id).unwrap();
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].message, "third");
    assert_eq!(events[2].message, "first");
}

#[test]
fn events_are_scoped_per_license() {
    let store = MemoryStore::new();
    let a = LicenseId::new();
    let b = LicenseId::new();

    store
        .append_event(&AuditEvent::new(a, EventKind::Created, "issued", "admin"))
        .unwrap();
    store
        .append_event(&AuditEvent::new(b, EventKind::Created, "issued", "admin"))
        .unwrap();

    assert_eq!(store.events_for_license(a).unwrap().len(), 1);
    assert_eq!(store.events_for_license(b).unwrap().len(), 1);
}

#[test]
fn events_for_unknown_license_is_empty() {
    let store = MemoryStore::new();
    assert!(store.events_for_license(LicenseId::new()).unwrap().is_empty());
}
