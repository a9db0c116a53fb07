use crate::Result as SyncResult;

use idsync_db::LocalUserRepository;

use rand::Rng;
use rand::distr::Alphanumeric;

const MAX_USERNAME_LEN: usize = 30;
const MAX_NUMERIC_SUFFIX: u32 = 999;
const FALLBACK_USERNAME: &str = "user";

/// Prefix that marks a stored credential as unusable for login
const UNUSABLE_CREDENTIAL_PREFIX: &str = "!";

const GENERATED_PASSWORD_LEN: usize = 24;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Password for a provider-side account the user never chose; they reset it
pub fn generate_password() -> String {
    random_alphanumeric(GENERATED_PASSWORD_LEN)
}

/// Credential stored on sync-created local accounts
pub fn placeholder_credential() -> String {
    format!("{}{}", UNUSABLE_CREDENTIAL_PREFIX, random_alphanumeric(40))
}

/// Reduce a name hint to the allowed username alphabet
pub fn sanitize_username(hint: &str) -> String {
    let cleaned: String = hint
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .take(MAX_USERNAME_LEN)
        .collect();

    if cleaned.is_empty() {
        FALLBACK_USERNAME.to_string()
    } else {
        cleaned
    }
}

/// First free username among `base`, `base1`, `base2`, ...
pub async fn unique_username(users: &LocalUserRepository, hint: &str) -> SyncResult<String> {
    let base = sanitize_username(hint);

    if !users.username_exists(&base).await? {
        return Ok(base);
    }

    for suffix in 1..=MAX_NUMERIC_SUFFIX {
        let candidate = format!("{}{}", base, suffix);
        if !users.username_exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Ok(format!("{}_{}", base, random_alphanumeric(6).to_lowercase()))
}
