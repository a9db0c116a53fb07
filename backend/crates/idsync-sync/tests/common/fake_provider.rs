//! In-memory identity provider with scripted failures.

use idsync_core::RemoteUser;
use idsync_provider::{IdentityProvider, NewRemoteUser, ProviderError, Result as ProviderResult};

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderOp {
    List,
    Get,
    Create,
    Confirm,
    Delete,
    Disable,
}

#[derive(Default)]
struct FakeState {
    users: Vec<RemoteUser>,
    next_id: u32,
    calls: Vec<(ProviderOp, String)>,
    /// Consumed one per call
    scripted: HashMap<ProviderOp, VecDeque<(u16, String)>>,
    /// Every call fails with this status
    always: HashMap<ProviderOp, (u16, String)>,
}

pub struct FakeProvider {
    state: Mutex<FakeState>,
    page_size: u32,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::with_page_size(50)
    }

    pub fn with_page_size(page_size: u32) -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            page_size,
        }
    }

    /// Add an existing remote account
    pub fn insert(&self, user: RemoteUser) {
        self.state.lock().unwrap().users.push(user);
    }

    pub fn insert_user(&self, id: &str, email: &str, confirmed: bool) -> RemoteUser {
        let mut user = RemoteUser::new(id, email);
        if confirmed {
            user.email_confirmed_at = Some(Utc::now() - Duration::days(1));
        }
        self.insert(user.clone());
        user
    }

    pub fn users(&self) -> Vec<RemoteUser> {
        self.state.lock().unwrap().users.clone()
    }

    pub fn user_by_email(&self, email: &str) -> Option<RemoteUser> {
        self.users()
            .into_iter()
            .find(|u| u.normalized_email().as_deref() == Some(email))
    }

    /// Fail the next call to `op` with an HTTP-style status and body
    pub fn fail_next(&self, op: ProviderOp, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .scripted
            .entry(op)
            .or_default()
            .push_back((status, body.to_string()));
    }

    pub fn fail_always(&self, op: ProviderOp, status: u16, body: &str) {
        self.state
            .lock()
            .unwrap()
            .always
            .insert(op, (status, body.to_string()));
    }

    pub fn calls(&self, op: ProviderOp) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(o, _)| *o == op)
            .map(|(_, arg)| arg.clone())
            .collect()
    }

    pub fn call_count(&self, op: ProviderOp) -> usize {
        self.calls(op).len()
    }

    fn enter(&self, op: ProviderOp, arg: &str) -> ProviderResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((op, arg.to_string()));

        if let Some((status, body)) = state.scripted.get_mut(&op).and_then(VecDeque::pop_front) {
            return Err(ProviderError::from_response(status, &body));
        }
        if let Some((status, body)) = state.always.get(&op) {
            return Err(ProviderError::from_response(*status, body));
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn list_users_page(&self, page: u32, per_page: u32) -> ProviderResult<Vec<RemoteUser>> {
        self.enter(ProviderOp::List, &page.to_string())?;

        let state = self.state.lock().unwrap();
        let start = ((page.max(1) - 1) * per_page) as usize;
        Ok(state
            .users
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect())
    }

    async fn get_user(&self, id: &str) -> ProviderResult<Option<RemoteUser>> {
        self.enter(ProviderOp::Get, id)?;

        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_user(&self, user: &NewRemoteUser) -> ProviderResult<RemoteUser> {
        self.enter(ProviderOp::Create, &user.email)?;

        let mut state = self.state.lock().unwrap();
        if state
            .users
            .iter()
            .any(|u| u.normalized_email().as_deref() == Some(user.email.as_str()))
        {
            return Err(ProviderError::from_response(
                422,
                r#"{"msg":"A user with this email address has already been registered"}"#,
            ));
        }

        state.next_id += 1;
        let mut created = RemoteUser::new(format!("remote-{}", state.next_id), &user.email);
        created.user_metadata = user.user_metadata.clone();
        created.created_at = Some(Utc::now());
        if user.email_confirm {
            created.email_confirmed_at = Some(Utc::now());
        }
        state.users.push(created.clone());
        Ok(created)
    }

    async fn confirm_email(&self, id: &str) -> ProviderResult<()> {
        self.enter(ProviderOp::Confirm, id)?;

        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ProviderError::from_response(404, "User not found"))?;
        user.email_confirmed_at = Some(Utc::now());
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> ProviderResult<()> {
        self.enter(ProviderOp::Delete, id)?;

        let mut state = self.state.lock().unwrap();
        let before = state.users.len();
        state.users.retain(|u| u.id != id);
        if state.users.len() == before {
            return Err(ProviderError::from_response(404, "User not found"));
        }
        Ok(())
    }

    async fn disable_user(&self, id: &str) -> ProviderResult<()> {
        self.enter(ProviderOp::Disable, id)?;

        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| ProviderError::from_response(404, "User not found"))?;
        user.banned_until = Some(Utc::now() + Duration::days(365 * 100));
        user.email_confirmed_at = None;
        user.app_metadata
            .insert("disabled".to_string(), Value::Bool(true));
        Ok(())
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}
