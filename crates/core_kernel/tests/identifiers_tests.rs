//! Tests for strongly-typed identifiers

use core_kernel::{CreditId, LineItemId, ScheduleId};
use std::collections::HashSet;
use std::str::FromStr;
use uuid::Uuid;

#[test]
fn test_display_carries_prefix() {
    let id = CreditId::new();
    assert!(id.to_string().starts_with("CRD-"));
    assert!(ScheduleId::new().to_string().starts_with("SCH-"));
    assert!(LineItemId::new().to_string().starts_with("LNI-"));
}

#[test]
fn test_parse_prefixed_and_bare() {
    let id = LineItemId::new_v7();

    assert_eq!(LineItemId::from_str(&id.to_string()).unwrap(), id);
    assert_eq!(LineItemId::from_str(&id.as_uuid().to_string()).unwrap(), id);
}

#[test]
fn test_parse_rejects_garbage() {
    assert!(CreditId::from_str("CRD-not-a-uuid").is_err());
}

#[test]
fn test_uuid_conversions() {
    let uuid = Uuid::new_v4();
    let id = ScheduleId::from(uuid);

    assert_eq!(*id.as_uuid(), uuid);
    assert_eq!(Uuid::from(id), uuid);
}

#[test]
fn test_generated_ids_are_unique() {
    let ids: HashSet<LineItemId> = (0..1000).map(|_| LineItemId::new_v7()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn test_serializes_as_bare_uuid() {
    let id = CreditId::new();
    let json = serde_json::to_string(&id).unwrap();

    assert_eq!(json, format!("\"{}\"", id.as_uuid()));
}
