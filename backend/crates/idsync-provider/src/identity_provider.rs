use crate::Result as ProviderResult;

use idsync_core::RemoteUser;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

/// Payload for creating a remote account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRemoteUser {
    pub email: String,
    pub password: String,
    /// Create the account already confirmed
    pub email_confirm: bool,
    pub user_metadata: Map<String, Value>,
}

impl NewRemoteUser {
    pub fn new(email: &str, password: String, email_confirm: bool, username: &str) -> Self {
        let mut user_metadata = Map::new();
        user_metadata.insert("username".to_string(), Value::String(username.to_string()));
        user_metadata.insert(
            "created_via".to_string(),
            Value::String("idsync".to_string()),
        );
        if email_confirm {
            user_metadata.insert("email_verified".to_string(), Value::Bool(true));
        }

        Self {
            email: email.to_string(),
            password,
            email_confirm,
            user_metadata,
        }
    }
}

/// Admin surface of the remote identity provider.
///
/// Implementations are constructed once at startup and shared as
/// `Arc<dyn IdentityProvider>`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// One page of users. `page` is 1-based; a short or empty page is the last.
    async fn list_users_page(&self, page: u32, per_page: u32) -> ProviderResult<Vec<RemoteUser>>;

    /// `Ok(None)` when the provider does not know the id
    async fn get_user(&self, id: &str) -> ProviderResult<Option<RemoteUser>>;

    async fn create_user(&self, user: &NewRemoteUser) -> ProviderResult<RemoteUser>;

    /// Mark the email confirmed without touching credentials
    async fn confirm_email(&self, id: &str) -> ProviderResult<()>;

    async fn delete_user(&self, id: &str) -> ProviderResult<()>;

    /// Compensating action when hard delete is not permitted: ban the
    /// account and strip its confirmation
    async fn disable_user(&self, id: &str) -> ProviderResult<()>;

    fn page_size(&self) -> u32;
}
