use crate::{SyncDirection, SyncFrequency};

use std::str::FromStr;

#[test]
fn test_sync_direction_as_str() {
    assert_eq!(SyncDirection::ToLocal.as_str(), "to-local");
    assert_eq!(SyncDirection::ToRemote.as_str(), "to-remote");
    assert_eq!(SyncDirection::Bidirectional.as_str(), "bidirectional");
}

#[test]
fn test_sync_direction_from_str_accepts_legacy_names() {
    assert_eq!(
        SyncDirection::from_str("to-django").unwrap(),
        SyncDirection::ToLocal
    );
    assert_eq!(
        SyncDirection::from_str("to-supabase").unwrap(),
        SyncDirection::ToRemote
    );
    assert_eq!(
        SyncDirection::from_str("BOTH").unwrap(),
        SyncDirection::Bidirectional
    );
    assert!(SyncDirection::from_str("sideways").is_err());
}

#[test]
fn test_sync_direction_phases() {
    assert!(SyncDirection::Bidirectional.includes_local());
    assert!(SyncDirection::Bidirectional.includes_remote());
    assert!(!SyncDirection::ToLocal.includes_remote());
    assert!(!SyncDirection::ToRemote.includes_local());
}

#[test]
fn test_sync_direction_serde_uses_kebab_case() {
    let json = serde_json::to_string(&SyncDirection::ToRemote).unwrap();
    assert_eq!(json, "\"to-remote\"");

    let parsed: SyncDirection = serde_json::from_str("\"to-django\"").unwrap();
    assert_eq!(parsed, SyncDirection::ToLocal);
}

#[test]
fn test_sync_frequency_round_trip_through_str() {
    for frequency in [
        SyncFrequency::Hourly,
        SyncFrequency::Daily,
        SyncFrequency::Weekly,
    ] {
        assert_eq!(SyncFrequency::from_str(frequency.as_str()).unwrap(), frequency);
    }
    assert!(SyncFrequency::from_str("monthly").is_err());
}
