//! Read-only projection of an account held by the remote identity provider.

use crate::normalize_email;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteUser {
    /// Provider-side id (the local record's `external_id`)
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub banned_until: Option<DateTime<Utc>>,
    #[serde(default, alias = "raw_user_meta_data", deserialize_with = "lenient_map")]
    pub user_metadata: Map<String, Value>,
    #[serde(default, alias = "raw_app_meta_data", deserialize_with = "lenient_map")]
    pub app_metadata: Map<String, Value>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl RemoteUser {
    pub fn new(id: impl Into<String>, email: &str) -> Self {
        Self {
            id: id.into(),
            email: Some(normalize_email(email)),
            email_confirmed_at: None,
            confirmed_at: None,
            banned_until: None,
            user_metadata: Map::new(),
            app_metadata: Map::new(),
            created_at: None,
        }
    }

    /// Case-folded email, if the provider returned a usable one
    pub fn normalized_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(normalize_email)
            .filter(|email| !email.is_empty())
    }

    /// Confirmed by timestamp or by an explicit `email_verified` metadata flag
    pub fn is_confirmed(&self) -> bool {
        self.email_confirmed_at.is_some()
            || self.confirmed_at.is_some()
            || self.user_metadata.get("email_verified") == Some(&Value::Bool(true))
    }

    pub fn is_banned(&self, now: DateTime<Utc>) -> bool {
        self.banned_until.is_some_and(|until| until > now)
            || self.app_metadata.get("disabled") == Some(&Value::Bool(true))
    }

    /// Username carried in the provider metadata, if any
    pub fn username_hint(&self) -> Option<&str> {
        self.user_metadata
            .get("username")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Accepts RFC 3339 and `YYYY-MM-DD HH:MM:SS[.f]` values. Anything else,
/// including the provider's `"none"` marker, decodes to `None`.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(Value::as_str)
        .and_then(parse_timestamp))
}

fn lenient_map<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => Ok(map),
        _ => Ok(Map::new()),
    }
}

pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    // Postgres text form, e.g. "2024-05-01 10:00:00.123+00"
    if let Ok(parsed) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
