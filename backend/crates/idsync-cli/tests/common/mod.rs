#![allow(dead_code)]

//! Test infrastructure for idsync CLI command tests

use idsync_cli::{CliResult, CommandContext, Confirmation};
use idsync_config::Config;
use idsync_core::LocalUser;
use idsync_db::LocalUserRepository;
use idsync_provider::{HttpIdentityProvider, IdentityProvider};
use idsync_sync::{ShutdownCoordinator, SyncServices};

use std::sync::Arc;

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERS_PATH: &str = "/auth/v1/admin/users";

pub struct TestCli {
    pub ctx: CommandContext,
    pub provider: MockServer,
    pub users: LocalUserRepository,
}

pub async fn create_test_cli() -> TestCli {
    let provider = MockServer::start().await;

    let mut config = Config::default();
    config.provider.base_url = provider.uri();
    config.provider.service_key = Some("test-service-key".to_string());
    config.provider.max_requests_per_second = 0;
    config.retry.max_retries = 1;
    config.retry.base_delay_ms = 1;
    config.retry.jitter = false;
    config.registrar.rate_limit_delay_secs = 0;

    let pool = idsync_db::connect_in_memory()
        .await
        .expect("Failed to create test database");
    let client: Arc<dyn IdentityProvider> =
        Arc::new(HttpIdentityProvider::new(&config.provider).expect("provider config"));
    let services = SyncServices::new(pool.clone(), client, &config);

    TestCli {
        ctx: CommandContext::new(services, ShutdownCoordinator::new()),
        provider,
        users: LocalUserRepository::new(pool),
    }
}

/// Serve `users` on every listing page request
pub async fn mount_listing(server: &MockServer, users: Value) {
    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": users })))
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(USERS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "users": [] })))
        .mount(server)
        .await;
}

pub async fn seed_local(users: &LocalUserRepository, email: &str, age_hours: i64) -> LocalUser {
    let username = email.split('@').next().unwrap_or("user").to_string();
    let mut user = LocalUser::new(email, username);
    user.created_at = chrono::Utc::now() - chrono::Duration::hours(age_hours);
    user.updated_at = user.created_at;
    users.create(&user).await.unwrap();
    user
}

/// Scripted answer for the cleanup gate; records every prompt
pub struct ScriptedConfirmation {
    pub answer: bool,
    pub prompts: Vec<String>,
}

impl ScriptedConfirmation {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: Vec::new(),
        }
    }
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&mut self, prompt: &str) -> CliResult<bool> {
        self.prompts.push(prompt.to_string());
        Ok(self.answer)
    }
}
