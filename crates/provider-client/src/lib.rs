//! Typed async client for the remote identity provider.
//!
//! The provider exposes a hosted user-pool REST API
//! (`{api_url}/auth/v1/...`): registration, password authentication,
//! token refresh, profile attribute retrieval, and password change.
//! [`ProviderApi`] is the trait boundary the session engine programs
//! against; [`HttpProvider`] is the production implementation.

mod api;
mod error;
mod http;
mod types;

pub use api::ProviderApi;
pub use error::{ProviderError, ProviderResult};
pub use http::HttpProvider;
pub use types::{AttributeEntry, Credentials, GrantUser, RegisteredAccount, TokenGrant};
