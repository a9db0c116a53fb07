//! HMAC-SHA256 webhook signatures (hex encoded).

use crate::{Result as SyncResult, SyncError};

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex HMAC-SHA256 of `body` under `secret`
pub fn compute_signature(secret: &str, body: &[u8]) -> SyncResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SyncError::validation(format!("unusable webhook secret: {}", e)))?;
    mac.update(body);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Check a presented signature in constant time. A `sha256=` prefix on the
/// header value is tolerated.
pub fn verify_signature(secret: &str, body: &[u8], presented: Option<&str>) -> SyncResult<()> {
    let presented = presented
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SyncError::signature("missing signature header"))?;
    let presented = presented.strip_prefix("sha256=").unwrap_or(presented);

    let expected = hex::decode(presented)
        .map_err(|_| SyncError::signature("signature is not valid hex"))?;

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SyncError::validation(format!("unusable webhook secret: {}", e)))?;
    mac.update(body);
    mac.verify_slice(&expected)
        .map_err(|_| SyncError::signature("signature mismatch"))
}
