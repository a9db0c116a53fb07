//! Single-user change event pushed by the identity provider.
//!
//! The body is decoded once, at the boundary, into a [`WebhookAction`].
//! Expected envelope: `{"type": "user.created", "record": {...}}`; deleted
//! events may carry the user under `old_record` instead.

use crate::{CoreError, RemoteUser, Result as CoreErrorResult, normalize_email};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub external_id: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WebhookAction {
    Created(RemoteUser),
    Updated(RemoteUser),
    Deleted(UserRef),
    /// Acknowledged, never processed
    Unknown(String),
}

impl WebhookAction {
    pub fn kind(&self) -> &str {
        match self {
            Self::Created(_) => "created",
            Self::Updated(_) => "updated",
            Self::Deleted(_) => "deleted",
            Self::Unknown(kind) => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebhookEvent {
    pub action: WebhookAction,
    pub raw_payload: Value,
    pub received_at: DateTime<Utc>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    record: Option<Value>,
    #[serde(default)]
    old_record: Option<Value>,
}

impl WebhookEvent {
    /// Decode a raw webhook body
    pub fn from_slice(body: &[u8], received_at: DateTime<Utc>) -> CoreErrorResult<Self> {
        let raw_payload: Value = serde_json::from_slice(body)?;
        let envelope = Envelope::deserialize(&raw_payload)?;

        let kind = envelope
            .kind
            .ok_or_else(|| CoreError::malformed("missing event type"))?;
        let kind = kind.trim().to_ascii_lowercase();
        let kind = kind.strip_prefix("user.").unwrap_or(&kind).to_string();

        let action = match kind.as_str() {
            "created" => {
                let user = decode_user(envelope.record)?;
                if user.normalized_email().is_none() {
                    return Err(CoreError::malformed("created event without email"));
                }
                WebhookAction::Created(user)
            }
            "updated" => WebhookAction::Updated(decode_user(envelope.record)?),
            "deleted" => {
                let record = envelope
                    .record
                    .filter(|r| !r.is_null())
                    .or(envelope.old_record)
                    .ok_or_else(|| CoreError::malformed("deleted event without record"))?;
                let user_ref = UserRef {
                    external_id: non_empty_str(&record, "id"),
                    email: non_empty_str(&record, "email").map(|e| normalize_email(&e)),
                };
                if user_ref.external_id.is_none() && user_ref.email.is_none() {
                    return Err(CoreError::malformed("deleted event without id or email"));
                }
                WebhookAction::Deleted(user_ref)
            }
            _ => WebhookAction::Unknown(kind),
        };

        Ok(Self {
            action,
            raw_payload,
            received_at,
        })
    }

    /// Key used to serialize work on the same user: the case-folded email,
    /// else `ext:<id>`
    pub fn subject_key(&self) -> Option<String> {
        match &self.action {
            WebhookAction::Created(user) | WebhookAction::Updated(user) => {
                user.normalized_email().or_else(|| Some(format!("ext:{}", user.id)))
            }
            WebhookAction::Deleted(user_ref) => user_ref
                .email
                .clone()
                .or_else(|| user_ref.external_id.as_ref().map(|id| format!("ext:{}", id))),
            WebhookAction::Unknown(_) => None,
        }
    }
}

fn decode_user(record: Option<Value>) -> CoreErrorResult<RemoteUser> {
    let record = record
        .filter(|r| r.is_object())
        .ok_or_else(|| CoreError::malformed("missing record"))?;

    if non_empty_str(&record, "id").is_none() {
        return Err(CoreError::malformed("record without id"));
    }

    Ok(serde_json::from_value(record)?)
}

fn non_empty_str(value: &Value, field: &str) -> Option<String> {
    value
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
