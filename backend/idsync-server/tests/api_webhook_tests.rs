mod common;

use common::{WEBHOOK_SECRET, create_test_app, create_test_app_with, read_json, test_config};

use idsync_server::{LEGACY_SIGNATURE_HEADER, REQUEST_ID_HEADER, SIGNATURE_HEADER, build_router};
use idsync_sync::compute_signature;

use axum::body::Body;
use googletest::prelude::*;
use http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::MockServer;

const CREATED: &str = r#"{
    "type": "user.created",
    "record": {
        "id": "ext-http-1",
        "email": "Hana@Example.com",
        "email_confirmed_at": "2024-01-01T00:00:00Z"
    }
}"#;

fn webhook_request(body: &str, header: Option<(&str, String)>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/identity")
        .header("content-type", "application/json")
        .header(REQUEST_ID_HEADER, "req-http-1");

    if let Some((name, value)) = header {
        builder = builder.header(name, value);
    }

    builder.body(Body::from(body.to_string())).unwrap()
}

fn sign(body: &str) -> String {
    compute_signature(WEBHOOK_SECRET, body.as_bytes()).unwrap()
}

#[tokio::test]
async fn given_signed_created_event_when_posted_then_local_user_created() {
    // Given
    let test = create_test_app().await;
    let app = build_router(test.state.clone());

    // When
    let response = app
        .oneshot(webhook_request(CREATED, Some((SIGNATURE_HEADER, sign(CREATED)))))
        .await
        .unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::OK));
    let json = read_json(response).await;
    assert_that!(json["status"].as_str(), some(eq("success")));

    let user = test
        .users
        .find_active_by_email("hana@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_that!(user.external_id, some(eq("ext-http-1")));
    assert_that!(user.verified, eq(true));
}

#[tokio::test]
async fn given_legacy_signature_header_when_posted_then_accepted() {
    // Given
    let test = create_test_app().await;
    let app = build_router(test.state.clone());

    // When
    let response = app
        .oneshot(webhook_request(
            CREATED,
            Some((LEGACY_SIGNATURE_HEADER, sign(CREATED))),
        ))
        .await
        .unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::OK));
}

#[tokio::test]
async fn given_same_event_twice_when_posted_then_one_user_and_both_succeed() {
    // Given
    let test = create_test_app().await;

    // When
    let first = build_router(test.state.clone())
        .oneshot(webhook_request(CREATED, Some((SIGNATURE_HEADER, sign(CREATED)))))
        .await
        .unwrap();
    let second = build_router(test.state.clone())
        .oneshot(webhook_request(CREATED, Some((SIGNATURE_HEADER, sign(CREATED)))))
        .await
        .unwrap();

    // Then
    assert_that!(first.status(), eq(StatusCode::OK));
    assert_that!(second.status(), eq(StatusCode::OK));
    assert_that!(test.users.count_active().await.unwrap(), eq(1));
}

#[tokio::test]
async fn given_wrong_signature_when_posted_then_400_and_nothing_written() {
    // Given
    let test = create_test_app().await;
    let app = build_router(test.state.clone());

    // When
    let response = app
        .oneshot(webhook_request(
            CREATED,
            Some((SIGNATURE_HEADER, "deadbeef".to_string())),
        ))
        .await
        .unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::BAD_REQUEST));
    let json = read_json(response).await;
    assert_that!(json["error"]["code"].as_str(), some(eq("INVALID_SIGNATURE")));
    assert_that!(test.users.count_active().await.unwrap(), eq(0));
}

#[tokio::test]
async fn given_missing_signature_when_secret_configured_then_400() {
    // Given
    let test = create_test_app().await;
    let app = build_router(test.state.clone());

    // When
    let response = app.oneshot(webhook_request(CREATED, None)).await.unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::BAD_REQUEST));
}

#[tokio::test]
async fn given_malformed_json_when_posted_then_400_malformed_payload() {
    // Given
    let test = create_test_app().await;
    let app = build_router(test.state.clone());
    let body = r#"{"type": "user.created", "record": "#;

    // When
    let response = app
        .oneshot(webhook_request(body, Some((SIGNATURE_HEADER, sign(body)))))
        .await
        .unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::BAD_REQUEST));
    let json = read_json(response).await;
    assert_that!(json["error"]["code"].as_str(), some(eq("MALFORMED_PAYLOAD")));
}

#[tokio::test]
async fn given_sync_disabled_when_posted_then_skipped() {
    // Given
    let provider = MockServer::start().await;
    let mut config = test_config(&provider.uri());
    config.webhook.sync_enabled = false;
    let test = create_test_app_with(provider, config).await;
    let app = build_router(test.state.clone());

    // When
    let response = app
        .oneshot(webhook_request(CREATED, Some((SIGNATURE_HEADER, sign(CREATED)))))
        .await
        .unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::OK));
    let json = read_json(response).await;
    assert_that!(json["status"].as_str(), some(eq("skipped")));
    assert_that!(test.users.count_active().await.unwrap(), eq(0));
}

#[tokio::test]
async fn given_no_secret_when_unsigned_event_posted_then_processed() {
    // Given
    let provider = MockServer::start().await;
    let mut config = test_config(&provider.uri());
    config.webhook.secret = None;
    let test = create_test_app_with(provider, config).await;
    let app = build_router(test.state.clone());

    // When
    let response = app.oneshot(webhook_request(CREATED, None)).await.unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::OK));
    assert_that!(test.users.count_active().await.unwrap(), eq(1));
}

#[tokio::test]
async fn given_unhandled_event_type_when_posted_then_ignored_with_200() {
    // Given
    let test = create_test_app().await;
    let app = build_router(test.state.clone());
    let body = r#"{"type": "user.signed_in", "record": {"id": "ext-9", "email": "z@x.com"}}"#;

    // When
    let response = app
        .oneshot(webhook_request(body, Some((SIGNATURE_HEADER, sign(body)))))
        .await
        .unwrap();

    // Then
    assert_that!(response.status(), eq(StatusCode::OK));
    assert_that!(test.users.count_active().await.unwrap(), eq(0));
}
