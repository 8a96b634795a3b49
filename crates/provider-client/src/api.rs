//! Provider API trait boundary.

use crate::{AttributeEntry, Credentials, ProviderResult, RegisteredAccount, TokenGrant};
use async_trait::async_trait;

/// Async interface to the remote identity provider.
///
/// The session engine only talks to the provider through this trait, so
/// tests can substitute an in-process fake and count round trips.
#[async_trait]
pub trait ProviderApi: Send + Sync {
    /// Register a new account with signup-time attributes.
    async fn register(
        &self,
        email: &str,
        password: &str,
        attributes: &[AttributeEntry],
    ) -> ProviderResult<RegisteredAccount>;

    /// Exchange credentials for a token grant.
    async fn authenticate(&self, credentials: &Credentials) -> ProviderResult<TokenGrant>;

    /// Exchange a refresh token for a fresh token grant.
    async fn refresh_session(&self, refresh_token: &str) -> ProviderResult<TokenGrant>;

    /// Fetch the profile attributes of the authenticated user.
    async fn fetch_attributes(&self, access_token: &str) -> ProviderResult<Vec<AttributeEntry>>;

    /// Change the authenticated user's password. Returns the provider's
    /// confirmation message.
    async fn change_password(
        &self,
        access_token: &str,
        current_password: &str,
        new_password: &str,
    ) -> ProviderResult<String>;
}
