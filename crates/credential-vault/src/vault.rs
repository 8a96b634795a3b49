//! High-level API for persisted session material.

use crate::{StorageKeys, VaultError, VaultResult, VaultStorage};
use serde::{Deserialize, Serialize};

/// Session metadata persisted alongside the tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionMeta {
    /// User ID assigned by the provider
    pub user_id: String,
    /// Username the session was established for
    pub username: String,
    /// User email, when the provider reports one
    #[serde(default)]
    pub email: Option<String>,
    /// When the access token expires (RFC3339 timestamp)
    pub expires_at: String,
}

/// High-level API for storing and retrieving persisted session material.
pub struct CredentialVault {
    storage: Box<dyn VaultStorage>,
}

impl CredentialVault {
    /// Create a new vault with the given storage backend.
    pub fn new(storage: Box<dyn VaultStorage>) -> Self {
        Self { storage }
    }

    /// Store a complete session (both tokens plus metadata).
    pub fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
        meta: &SessionMeta,
    ) -> VaultResult<()> {
        self.set_access_token(access_token)?;
        self.set_refresh_token(refresh_token)?;
        self.set_session_meta(meta)
    }

    /// Store the access token.
    pub fn set_access_token(&self, token: &str) -> VaultResult<()> {
        self.storage.set(StorageKeys::ACCESS_TOKEN, token)
    }

    /// Retrieve the access token.
    pub fn get_access_token(&self) -> VaultResult<Option<String>> {
        self.storage.get(StorageKeys::ACCESS_TOKEN)
    }

    /// Store the refresh token.
    pub fn set_refresh_token(&self, token: &str) -> VaultResult<()> {
        self.storage.set(StorageKeys::REFRESH_TOKEN, token)
    }

    /// Retrieve the refresh token.
    pub fn get_refresh_token(&self) -> VaultResult<Option<String>> {
        self.storage.get(StorageKeys::REFRESH_TOKEN)
    }

    /// Store the session metadata.
    pub fn set_session_meta(&self, meta: &SessionMeta) -> VaultResult<()> {
        let json = serde_json::to_string(meta).map_err(|e| VaultError::Encoding(e.to_string()))?;
        self.storage.set(StorageKeys::SESSION_META, &json)
    }

    /// Retrieve the session metadata.
    pub fn get_session_meta(&self) -> VaultResult<Option<SessionMeta>> {
        match self.storage.get(StorageKeys::SESSION_META)? {
            Some(json) => {
                let meta =
                    serde_json::from_str(&json).map_err(|e| VaultError::Encoding(e.to_string()))?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    /// Check whether a persisted session exists (tokens and metadata).
    pub fn has_session(&self) -> VaultResult<bool> {
        Ok(self.storage.has(StorageKeys::ACCESS_TOKEN)?
            && self.storage.has(StorageKeys::REFRESH_TOKEN)?
            && self.storage.has(StorageKeys::SESSION_META)?)
    }

    /// Check whether the persisted session's access token has expired.
    ///
    /// Missing or unparseable metadata counts as expired.
    pub fn is_session_expired(&self) -> VaultResult<bool> {
        let meta = match self.get_session_meta()? {
            Some(meta) => meta,
            None => return Ok(true),
        };

        match chrono::DateTime::parse_from_rfc3339(&meta.expires_at) {
            Ok(expires_at) => Ok(expires_at <= chrono::Utc::now()),
            Err(e) => {
                tracing::warn!(
                    expires_at = %meta.expires_at,
                    "Unparseable session expiry, treating as expired: {}",
                    e
                );
                Ok(true)
            }
        }
    }

    /// Remove all persisted session material.
    pub fn clear_session(&self) -> VaultResult<()> {
        self.storage.delete(StorageKeys::ACCESS_TOKEN)?;
        self.storage.delete(StorageKeys::REFRESH_TOKEN)?;
        self.storage.delete(StorageKeys::SESSION_META)?;
        Ok(())
    }
}
