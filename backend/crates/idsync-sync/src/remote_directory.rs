use crate::{Result as SyncResult, RetryPolicy, SyncError, execute_with_retry};

use idsync_core::{RemoteUser, normalize_email};
use idsync_provider::{IdentityProvider, ProviderError};

use std::sync::Arc;

/// Upper bound on listing pages, in case a provider ignores `page`
const MAX_PAGES: u32 = 10_000;

/// Paginated, retried reads of the remote user list
#[derive(Clone)]
pub struct RemoteDirectory {
    provider: Arc<dyn IdentityProvider>,
    retry: RetryPolicy,
}

impl RemoteDirectory {
    pub fn new(provider: Arc<dyn IdentityProvider>, retry: RetryPolicy) -> Self {
        Self { provider, retry }
    }

    pub fn provider(&self) -> &Arc<dyn IdentityProvider> {
        &self.provider
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    async fn page(&self, page: u32, per_page: u32) -> SyncResult<Vec<RemoteUser>> {
        let users = execute_with_retry(&self.retry, "list remote users", || {
            self.provider.list_users_page(page, per_page)
        })
        .await?;
        Ok(users)
    }

    /// Walk pages sequentially until `visit` returns true or the listing ends
    async fn walk<F>(&self, mut visit: F) -> SyncResult<()>
    where
        F: FnMut(RemoteUser) -> bool,
    {
        let per_page = self.provider.page_size().max(1);

        for page in 1..=MAX_PAGES {
            let users = self.page(page, per_page).await?;
            let count = users.len();

            for user in users {
                if visit(user) {
                    return Ok(());
                }
            }

            if count < per_page as usize {
                return Ok(());
            }
        }

        log::warn!("Remote listing stopped after {} pages", MAX_PAGES);
        Ok(())
    }

    /// Every remote user, optionally only those with `email_filter`
    pub async fn list_all(&self, email_filter: Option<&str>) -> SyncResult<Vec<RemoteUser>> {
        let filter = email_filter.map(normalize_email);
        let mut users = Vec::new();

        self.walk(|user| {
            let keep = match &filter {
                Some(email) => user.normalized_email().as_deref() == Some(email.as_str()),
                None => true,
            };
            if keep {
                users.push(user);
            }
            false
        })
        .await?;

        Ok(users)
    }

    /// Case-insensitive search of the full listing
    pub async fn find_by_email(&self, email: &str) -> SyncResult<Option<RemoteUser>> {
        let wanted = normalize_email(email);
        let mut found = None;

        self.walk(|user| {
            if user.normalized_email().as_deref() == Some(wanted.as_str()) {
                found = Some(user);
                true
            } else {
                false
            }
        })
        .await?;

        Ok(found)
    }

    pub async fn get(&self, external_id: &str) -> SyncResult<Option<RemoteUser>> {
        let result = execute_with_retry(&self.retry, "get remote user", || {
            self.provider.get_user(external_id)
        })
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(SyncError::from(e)),
        }
    }

    /// Run one provider call under the retry policy
    pub async fn call<T, F, Fut>(&self, operation: &str, f: F) -> Result<T, ProviderError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProviderError>>,
    {
        execute_with_retry(&self.retry, operation, f).await
    }
}
