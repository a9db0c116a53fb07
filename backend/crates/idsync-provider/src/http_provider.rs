use crate::{
    IdentityProvider, NewRemoteUser, ProviderError, RequestThrottle, Result as ProviderResult,
};

use idsync_config::ProviderConfig;
use idsync_core::RemoteUser;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};

const ADMIN_USERS_PATH: &str = "/auth/v1/admin/users";

/// Effectively permanent ban applied by `disable_user`
const DISABLE_BAN_DURATION: &str = "876000h";

/// Listing responses come either wrapped or as a bare array
#[derive(Deserialize)]
#[serde(untagged)]
enum UserPage {
    Wrapped { users: Vec<RemoteUser> },
    Bare(Vec<RemoteUser>),
}

impl UserPage {
    fn into_users(self) -> Vec<RemoteUser> {
        match self {
            Self::Wrapped { users } | Self::Bare(users) => users,
        }
    }
}

/// Admin-API client authenticated with the service-role key
pub struct HttpIdentityProvider {
    base_url: String,
    service_key: String,
    page_size: u32,
    client: ReqwestClient,
    throttle: Option<RequestThrottle>,
}

impl HttpIdentityProvider {
    pub fn new(config: &ProviderConfig) -> ProviderResult<Self> {
        let service_key = config
            .service_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::configuration("provider.service_key is not set"))?
            .to_string();

        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::configuration(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            service_key,
            page_size: config.page_size,
            client,
            throttle: RequestThrottle::per_second(config.max_requests_per_second),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .request(method, &url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn send(&self, req: RequestBuilder) -> ProviderResult<Response> {
        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        Ok(req.send().await?)
    }

    /// Turn a non-success response into a classified error
    async fn reject(response: Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        ProviderError::from_response(status, &body)
    }

    async fn read_user(response: Response) -> ProviderResult<RemoteUser> {
        let body: Value = response.json().await?;
        // Some deployments wrap the record as {"user": {...}}
        let record = match body.get("user") {
            Some(user) if user.is_object() => user.clone(),
            _ => body,
        };
        serde_json::from_value(record).map_err(|e| ProviderError::decode(e.to_string()))
    }

    async fn update_user(&self, id: &str, body: Value) -> ProviderResult<()> {
        let req = self
            .request(Method::PUT, &format!("{}/{}", ADMIN_USERS_PATH, id))
            .json(&body);
        let response = self.send(req).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::reject(response).await)
        }
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn list_users_page(&self, page: u32, per_page: u32) -> ProviderResult<Vec<RemoteUser>> {
        let path = format!("{}?page={}&per_page={}", ADMIN_USERS_PATH, page, per_page);
        let response = self.send(self.request(Method::GET, &path)).await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        let page: UserPage = response.json().await?;
        Ok(page.into_users())
    }

    async fn get_user(&self, id: &str) -> ProviderResult<Option<RemoteUser>> {
        let path = format!("{}/{}", ADMIN_USERS_PATH, id);
        let response = self.send(self.request(Method::GET, &path)).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        Self::read_user(response).await.map(Some)
    }

    async fn create_user(&self, user: &NewRemoteUser) -> ProviderResult<RemoteUser> {
        let req = self.request(Method::POST, ADMIN_USERS_PATH).json(user);
        let response = self.send(req).await?;

        if !response.status().is_success() {
            return Err(Self::reject(response).await);
        }

        Self::read_user(response).await
    }

    async fn confirm_email(&self, id: &str) -> ProviderResult<()> {
        self.update_user(
            id,
            json!({
                "email_confirm": true,
                "user_metadata": { "email_verified": true }
            }),
        )
        .await
    }

    async fn delete_user(&self, id: &str) -> ProviderResult<()> {
        let path = format!("{}/{}", ADMIN_USERS_PATH, id);
        let response = self.send(self.request(Method::DELETE, &path)).await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::reject(response).await)
        }
    }

    async fn disable_user(&self, id: &str) -> ProviderResult<()> {
        self.update_user(
            id,
            json!({
                "ban_duration": DISABLE_BAN_DURATION,
                "email_confirm": false,
                "app_metadata": { "disabled": true, "deleted": true }
            }),
        )
        .await
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }
}
