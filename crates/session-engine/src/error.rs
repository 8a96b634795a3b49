//! Session engine error types.

use provider_client::ProviderError;
use thiserror::Error;

/// Error type for session operations.
///
/// One policy everywhere: operations that cannot proceed return a typed
/// error. Provider failures are additionally surfaced to the UI as
/// outcome notifications, but the caller still gets the `Err`.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No current or restorable identity
    #[error("Not signed in")]
    NotSignedIn,

    /// The provider rejected the submitted credentials
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// Provider request failure (registration, attributes, password change)
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Session refresh failed
    #[error("Session refresh failed: {0}")]
    SessionRefresh(String),

    /// Refresh retries exhausted
    #[error("Session refresh failed after {0} attempts")]
    RefreshExhausted(u32),

    /// Invalid transition in the session state machine
    #[error("Invalid session state transition: {0}")]
    InvalidStateTransition(String),

    /// Credential vault error
    #[error("Vault error: {0}")]
    Vault(#[from] credential_vault::VaultError),
}

impl AuthError {
    /// Returns true if the underlying failure is transient and the
    /// operation can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Provider(e) => e.is_transient(),
            _ => false,
        }
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_signed_in_is_not_transient() {
        assert!(!AuthError::NotSignedIn.is_transient());
    }

    #[test]
    fn test_transient_provider_error_passes_through() {
        let err = AuthError::Provider(ProviderError::Request {
            status: 502,
            message: "bad gateway".to_string(),
        });
        assert!(err.is_transient());
    }

    #[test]
    fn test_invalid_credentials_is_not_transient() {
        assert!(!AuthError::InvalidCredentials("bad password".to_string()).is_transient());
    }
}
