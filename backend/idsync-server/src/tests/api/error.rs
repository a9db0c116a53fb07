use crate::ApiError;

use idsync_provider::ProviderError;
use idsync_sync::SyncError;

use std::panic::Location;

use axum::response::IntoResponse;
use error_location::ErrorLocation;
use googletest::prelude::*;
use http::StatusCode;
use http_body_util::BodyExt;

async fn body_json(error: ApiError) -> (StatusCode, serde_json::Value) {
    let response = error.into_response();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn given_not_found_when_rendered_then_404_with_code() {
    // Given
    let error = ApiError::NotFound {
        message: "Schedule abc not found".into(),
        location: ErrorLocation::from(Location::caller()),
    };

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::NOT_FOUND));
    assert_that!(json["error"]["code"].as_str(), some(eq("NOT_FOUND")));
    assert_that!(json["error"]["message"].as_str(), some(eq("Schedule abc not found")));
    assert_that!(json["error"].get("field").is_none(), eq(true));
}

#[tokio::test]
async fn given_validation_with_field_when_rendered_then_field_included() {
    // Given
    let error = ApiError::Validation {
        message: "Invalid UUID format".into(),
        field: Some("id".into()),
        location: ErrorLocation::from(Location::caller()),
    };

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_that!(json["error"]["code"].as_str(), some(eq("VALIDATION_ERROR")));
    assert_that!(json["error"]["field"].as_str(), some(eq("id")));
}

#[tokio::test]
async fn given_bad_signature_when_converted_then_400_invalid_signature() {
    // Given
    let error: ApiError = SyncError::signature("Signature mismatch").into();

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_that!(json["error"]["code"].as_str(), some(eq("INVALID_SIGNATURE")));
    assert_that!(json["error"]["message"].as_str(), some(eq("Signature mismatch")));
}

#[tokio::test]
async fn given_malformed_payload_when_converted_then_400_malformed() {
    // Given
    let error: ApiError = SyncError::malformed("missing record.id").into();

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_that!(json["error"]["code"].as_str(), some(eq("MALFORMED_PAYLOAD")));
}

#[tokio::test]
async fn given_provider_outage_when_converted_then_500_without_details() {
    // Given
    let error: ApiError = SyncError::from(ProviderError::from_response(
        503,
        r#"{"msg":"upstream db at 10.0.0.7 unavailable"}"#,
    ))
    .into();

    // When
    let (status, json) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::INTERNAL_SERVER_ERROR));
    assert_that!(json["error"]["code"].as_str(), some(eq("INTERNAL_ERROR")));
    let message = json["error"]["message"].as_str().unwrap_or_default().to_string();
    assert_that!(message.contains("10.0.0.7"), eq(false));
}

#[tokio::test]
async fn given_sync_not_found_when_converted_then_404() {
    // Given
    let error: ApiError = SyncError::not_found("Schedule 42 not found").into();

    // When
    let (status, _) = body_json(error).await;

    // Then
    assert_that!(status, eq(StatusCode::NOT_FOUND));
}

#[tokio::test]
async fn given_bad_uuid_when_converted_then_validation_on_id() {
    // Given
    let parse_error = uuid::Uuid::parse_str("not-a-uuid").unwrap_err();

    // When
    let (status, json) = body_json(ApiError::from(parse_error)).await;

    // Then
    assert_that!(status, eq(StatusCode::BAD_REQUEST));
    assert_that!(json["error"]["field"].as_str(), some(eq("id")));
}
