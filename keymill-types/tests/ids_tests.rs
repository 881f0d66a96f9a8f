use keymill_types::{EventId, LicenseId};
use std::str::FromStr;

#[test]
fn license_id_display_parse_roundtrip() {
    let id = LicenseId::new();
    let parsed = LicenseId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn license_id_from_str() {
    let id = LicenseId::new();
    let parsed = LicenseId::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn license_id_rejects_garbage() {
    assert!(LicenseId::parse("not-a-uuid").is_err());
}

#[test]
fn license_ids_are_unique() {
    assert_ne!(LicenseId::new(), LicenseId::new());
}

#[test]
fn license_id_serde_transparent() {
    let id = LicenseId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let back: LicenseId = serde_json::from_str(&json).unwrap();
    assert_eq!(id, back);
}

#[test]
fn event_id_display_parse_roundtrip() {
    let id = EventId::new();
    let parsed = EventId::from_str(&id.to_string()).unwrap();
    assert_eq!(id, parsed);
}

#[test]
fn uuid_v7_ids_are_time_ordered() {
    // v7 embeds a millisecond timestamp; ids minted in sequence sort.
    let a = LicenseId::new();
    std::thread::sleep(std::time::Duration::from_millis(2));
    let b = LicenseId::new();
    assert!(a.as_uuid() < b.as_uuid());
}
