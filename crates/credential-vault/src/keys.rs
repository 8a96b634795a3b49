//! Storage key constants.

/// Storage keys used by the vault.
pub struct StorageKeys;

impl StorageKeys {
    /// Provider access token
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Provider refresh token
    pub const REFRESH_TOKEN: &'static str = "refresh_token";

    /// Session metadata (JSON)
    pub const SESSION_META: &'static str = "session_meta";
}
