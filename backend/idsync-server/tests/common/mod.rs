#![allow(dead_code)]

//! Test infrastructure for idsync-server API tests

use idsync_config::Config;
use idsync_db::LocalUserRepository;
use idsync_provider::{HttpIdentityProvider, IdentityProvider};
use idsync_server::AppState;
use idsync_sync::{ShutdownCoordinator, SyncServices};

use std::sync::Arc;

use axum::body::Body;
use http::Request;
use http_body_util::BodyExt;
use serde_json::Value;
use wiremock::MockServer;

pub const WEBHOOK_SECRET: &str = "server-test-secret";

/// Fast retries, signed webhooks, provider pointed at `provider_uri`
pub fn test_config(provider_uri: &str) -> Config {
    let mut config = Config::default();
    config.provider.base_url = provider_uri.to_string();
    config.provider.service_key = Some("test-service-key".to_string());
    config.provider.max_requests_per_second = 0;
    config.webhook.secret = Some(WEBHOOK_SECRET.to_string());
    config.retry.max_retries = 1;
    config.retry.base_delay_ms = 1;
    config.retry.max_delay_secs = 1;
    config.retry.jitter = false;
    config
}

pub struct TestApp {
    pub state: AppState,
    pub provider: MockServer,
    pub users: LocalUserRepository,
}

pub async fn create_test_app() -> TestApp {
    let provider = MockServer::start().await;
    let config = test_config(&provider.uri());
    create_test_app_with(provider, config).await
}

pub async fn create_test_app_with(provider: MockServer, config: Config) -> TestApp {
    let pool = idsync_db::connect_in_memory()
        .await
        .expect("Failed to create test database");

    let client: Arc<dyn IdentityProvider> =
        Arc::new(HttpIdentityProvider::new(&config.provider).expect("provider config"));
    let services = SyncServices::new(pool.clone(), client, &config);

    let state = AppState {
        pool: pool.clone(),
        services,
        shutdown: ShutdownCoordinator::new(),
        metrics_handle: None,
    };

    TestApp {
        state,
        provider,
        users: LocalUserRepository::new(pool),
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

pub async fn read_text(response: axum::response::Response) -> String {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(body.to_vec()).unwrap()
}
