use crate::{ApiResult, AppState};

use idsync_sync::{WebhookDelivery, WebhookOutcome};

use axum::{Json, extract::State, http::HeaderMap};
use bytes::Bytes;

/// HMAC-SHA256 hex digest of the raw body
pub const SIGNATURE_HEADER: &str = "x-signature";
/// Older deliveries carry the digest under the provider's own header name
pub const LEGACY_SIGNATURE_HEADER: &str = "x-supabase-signature";
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// POST /webhooks/identity
///
/// The body is taken as raw bytes so the signature is checked against
/// exactly what was sent.
pub async fn receive_identity_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<WebhookOutcome>> {
    let signature =
        header_value(&headers, SIGNATURE_HEADER).or_else(|| header_value(&headers, LEGACY_SIGNATURE_HEADER));
    let request_id = header_value(&headers, REQUEST_ID_HEADER);

    let outcome = state
        .services
        .webhooks
        .receive(WebhookDelivery {
            body: &body,
            signature,
            request_id,
        })
        .await?;

    Ok(Json(outcome))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}
