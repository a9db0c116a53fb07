//! Per-user async mutex registry.
//!
//! Webhook handlers and the reconciliation engine both take the lock for a
//! user before touching its row, so their writes to the same user never
//! interleave. Keys are case-folded emails, or `ext:<id>` when no email is
//! known.

use idsync_core::normalize_email;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<String, Weak<AsyncMutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock key for a user: the email when known, else the external id
    pub fn key_for(email: Option<&str>, external_id: Option<&str>) -> Option<String> {
        email
            .map(normalize_email)
            .filter(|email| !email.is_empty())
            .or_else(|| external_id.map(|id| format!("ext:{}", id)))
    }

    /// Wait for exclusive access to `key`. Released when the guard drops.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = self.entry(key);
        mutex.lock_owned().await
    }

    fn entry(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());

        if let Some(existing) = map.get(key).and_then(Weak::upgrade) {
            return existing;
        }

        // Entries whose guards have all dropped
        map.retain(|_, weak| weak.strong_count() > 0);

        let mutex = Arc::new(AsyncMutex::new(()));
        map.insert(key.to_string(), Arc::downgrade(&mutex));
        mutex
    }

    /// Keys currently held or awaited
    pub fn active_count(&self) -> usize {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.values().filter(|weak| weak.strong_count() > 0).count()
    }
}
