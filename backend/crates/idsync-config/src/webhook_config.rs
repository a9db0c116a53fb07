use serde::Deserialize;

/// Value shipped in sample env files; treated as "no secret configured"
pub const PLACEHOLDER_WEBHOOK_SECRET: &str = "your-webhook-secret-key";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    /// HMAC-SHA256 shared secret. Never logged.
    pub secret: Option<String>,
    /// When false every event is acknowledged without processing
    pub sync_enabled: bool,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            secret: None,
            sync_enabled: true,
        }
    }
}

impl WebhookConfig {
    /// The secret to verify against, or `None` when verification is off
    pub fn verification_secret(&self) -> Option<&str> {
        self.secret
            .as_deref()
            .map(str::trim)
            .filter(|secret| !secret.is_empty() && *secret != PLACEHOLDER_WEBHOOK_SECRET)
    }
}
