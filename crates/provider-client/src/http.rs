//! HTTP implementation of the provider API.

use crate::{
    AttributeEntry, Credentials, ProviderApi, ProviderError, ProviderResult, RegisteredAccount,
    TokenGrant,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};

/// HTTP client for a hosted user-pool identity provider.
///
/// Every request carries the client identifier as the `apikey` header
/// and the pool identifier as `x-pool-id`; authenticated calls add a
/// bearer token.
#[derive(Clone)]
pub struct HttpProvider {
    http_client: Client,
    api_url: String,
    pool_id: String,
    client_id: String,
}

#[derive(Debug, Serialize)]
struct SignupRequest<'a> {
    email: &'a str,
    password: &'a str,
    attributes: &'a [AttributeEntry],
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Serialize)]
struct ChangePasswordRequest<'a> {
    current_password: &'a str,
    new_password: &'a str,
}

#[derive(Debug, serde::Deserialize)]
struct ChangePasswordResponse {
    message: String,
}

impl HttpProvider {
    /// Create a new provider client.
    ///
    /// # Arguments
    /// * `api_url` - The provider base URL (e.g., `https://auth.example.com`)
    /// * `pool_id` - User pool identifier
    /// * `client_id` - Client (application) identifier
    pub fn new(
        api_url: impl Into<String>,
        pool_id: impl Into<String>,
        client_id: impl Into<String>,
    ) -> Self {
        Self {
            http_client: Client::new(),
            api_url: api_url.into(),
            pool_id: pool_id.into(),
            client_id: client_id.into(),
        }
    }

    /// Build the API URL for an auth endpoint.
    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.api_url, path)
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", &self.client_id)
            .header("x-pool-id", &self.pool_id)
            .header("Accept", "application/json")
    }

    /// Convert a non-success response into a `ProviderError::Request`
    /// carrying the provider's message.
    async fn error_from_response(response: reqwest::Response) -> ProviderError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(&body);
        warn!(status, message = %message, "Provider request failed");
        ProviderError::Request { status, message }
    }
}

/// Pull the human-readable message out of a provider error body.
///
/// The provider reports errors as JSON with a `message` (sometimes
/// `error_description`) field; anything else falls back to the raw body.
fn extract_error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error_description", "msg"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
    }
    if body.trim().is_empty() {
        "Unknown provider error".to_string()
    } else {
        body.trim().to_string()
    }
}

#[async_trait]
impl ProviderApi for HttpProvider {
    async fn register(
        &self,
        email: &str,
        password: &str,
        attributes: &[AttributeEntry],
    ) -> ProviderResult<RegisteredAccount> {
        let url = self.auth_url("signup");
        debug!(url = %url, email = %email, "Registering account");

        let response = self
            .request(self.http_client.post(&url))
            .json(&SignupRequest {
                email,
                password,
                attributes,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let account: RegisteredAccount = response.json().await?;
        debug!(user_id = %account.user_id, "Account registered");
        Ok(account)
    }

    async fn authenticate(&self, credentials: &Credentials) -> ProviderResult<TokenGrant> {
        let url = self.auth_url("token?grant_type=password");
        debug!(url = %url, username = %credentials.username, "Authenticating");

        let response = self
            .request(self.http_client.post(&url))
            .json(credentials)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let grant: TokenGrant = response.json().await?;
        debug!(user_id = %grant.user.id, "Authentication succeeded");
        Ok(grant)
    }

    async fn refresh_session(&self, refresh_token: &str) -> ProviderResult<TokenGrant> {
        let url = self.auth_url("token?grant_type=refresh_token");
        debug!(url = %url, "Refreshing session");

        let response = self
            .request(self.http_client.post(&url))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let grant: TokenGrant = response.json().await?;
        debug!(user_id = %grant.user.id, "Session refreshed");
        Ok(grant)
    }

    async fn fetch_attributes(&self, access_token: &str) -> ProviderResult<Vec<AttributeEntry>> {
        let url = self.auth_url("user/attributes");
        debug!(url = %url, "Fetching profile attributes");

        let response = self
            .request(self.http_client.get(&url))
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let attributes: Vec<AttributeEntry> = response.json().await?;
        debug!(count = attributes.len(), "Fetched profile attributes");
        Ok(attributes)
    }

    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> ProviderResult<String> {
        let url = self.auth_url("user/password");
        debug!(url = %url, "Changing password");

        let response = self
            .request(self.http_client.put(&url))
            .bearer_auth(access_token)
            .json(&ChangePasswordRequest {
                current_password,
                new_password,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let result: ChangePasswordResponse = response.json().await?;
        Ok(result.message)
    }
}
