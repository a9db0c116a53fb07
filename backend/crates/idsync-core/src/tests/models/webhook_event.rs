use crate::{WebhookAction, WebhookEvent};

use chrono::Utc;
use googletest::prelude::*;

#[test]
fn given_prefixed_created_type_when_decoded_then_created_action() {
    // Given
    let body = br#"{"type":"user.created","record":{"id":"ext-1","email":"New@X.com"}}"#;

    // When
    let event = WebhookEvent::from_slice(body, Utc::now()).unwrap();

    // Then
    assert_that!(event.action.kind(), eq("created"));
    assert_that!(event.subject_key(), some(eq("new@x.com")));
}

#[test]
fn given_created_without_email_when_decoded_then_malformed() {
    // Given
    let body = br#"{"type":"created","record":{"id":"ext-1"}}"#;

    // When
    let result = WebhookEvent::from_slice(body, Utc::now());

    // Then
    assert_that!(result, err(anything()));
}

#[test]
fn given_deleted_with_old_record_when_decoded_then_user_ref_from_old_record() {
    // Given
    let body = br#"{"type":"deleted","record":null,"old_record":{"id":"ext-9"}}"#;

    // When
    let event = WebhookEvent::from_slice(body, Utc::now()).unwrap();

    // Then
    match &event.action {
        WebhookAction::Deleted(user_ref) => {
            assert_that!(user_ref.external_id, some(eq("ext-9")));
            assert_that!(user_ref.email, none());
        }
        other => panic!("unexpected action {:?}", other),
    }
    assert_that!(event.subject_key(), some(eq("ext:ext-9")));
}

#[test]
fn given_unknown_type_when_decoded_then_unknown_action() {
    // Given
    let body = br#"{"type":"user.signed_in","record":{}}"#;

    // When
    let event = WebhookEvent::from_slice(body, Utc::now()).unwrap();

    // Then
    assert_that!(event.action, eq(&WebhookAction::Unknown("signed_in".to_string())));
    assert_that!(event.subject_key(), none());
}

#[test]
fn given_invalid_json_when_decoded_then_error() {
    assert_that!(WebhookEvent::from_slice(b"{not json", Utc::now()), err(anything()));
}
